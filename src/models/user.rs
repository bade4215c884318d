//! User and profile data models.
//!
//! `User` is the one versioned profile schema: every profile extension is
//! optional so older accounts still decode. The password is write-only and is
//! never read back from the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::institution::{InstitutionId, InstitutionRef};

/// Identifier of a user
pub type UserId = i64;

/// Full record of the logged-in user, as returned by `GET /autorizacoes/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "cargo", default)]
    pub role: Option<String>,
    #[serde(rename = "instituicaoId", default)]
    pub current_institution: Option<InstitutionId>,
    #[serde(rename = "instituicoesDestino", default)]
    pub desired_institutions: Vec<InstitutionId>,
    #[serde(rename = "aceitaProximas", default)]
    pub accepts_nearby: bool,
    #[serde(rename = "fotoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of the user listing and the embedded party of a swap request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "cargo", default)]
    pub role: Option<String>,
    #[serde(rename = "fotoUrl", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "instituicao", default)]
    pub institution: Option<InstitutionRef>,
}

impl UserSummary {
    /// Role for display, with a placeholder when the user never set one
    pub fn role_label(&self) -> &str {
        self.role
            .as_deref()
            .filter(|role| !role.is_empty())
            .unwrap_or("Not informed")
    }

    pub fn institution_name(&self) -> Option<&str> {
        self.institution.as_ref().map(|i| i.name.as_str())
    }
}

/// Partial update payload for `PUT /usuarios/{id}`; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "senha", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "cargo", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "instituicaoId", skip_serializing_if = "Option::is_none")]
    pub current_institution: Option<InstitutionId>,
    #[serde(rename = "instituicoesDestino", skip_serializing_if = "Option::is_none")]
    pub desired_institutions: Option<Vec<InstitutionId>>,
    #[serde(rename = "aceitaProximas", skip_serializing_if = "Option::is_none")]
    pub accepts_nearby: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
