//! Swap request models.

use serde::{Deserialize, Serialize};

use super::user::{UserId, UserSummary};

/// Identifier of a swap request
pub type RequestId = i64;

/// Lifecycle of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Aceita")]
    Accepted,
    #[serde(rename = "Rejeitada")]
    Rejected,
}

/// A swap request as listed by the server
///
/// The pending listing only embeds the requester; the contact listing embeds
/// both parties together with their ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: RequestId,
    #[serde(rename = "usuarioSolicitante")]
    pub requester: UserSummary,
    #[serde(rename = "usuarioAlvo", default)]
    pub target: Option<UserSummary>,
    #[serde(rename = "usuarioId_solicitante", default)]
    pub requester_id: Option<UserId>,
    #[serde(rename = "usuarioId_alvo", default)]
    pub target_id: Option<UserId>,
    #[serde(default)]
    pub status: RequestStatus,
}

impl SwapRequest {
    /// The other party of a confirmed contact, seen from `me`
    pub fn counterpart(&self, me: UserId) -> Option<&UserSummary> {
        let target_id = self
            .target_id
            .or_else(|| self.target.as_ref().map(|t| t.id));
        if target_id == Some(me) {
            Some(&self.requester)
        } else {
            self.target.as_ref()
        }
    }
}

/// Payload for `POST /solicitacoes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwapRequest {
    #[serde(rename = "usuarioId_solicitante")]
    pub requester_id: UserId,
    #[serde(rename = "usuarioId_alvo")]
    pub target_id: UserId,
}

/// Payload for `PUT /solicitacoes/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}
