//! Authentication-related data models.

use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Role assigned to every self-registered account
pub const DEFAULT_ROLE: &str = "usuario";

/// Request model for user login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Response model for a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub id: UserId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Request model for account registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "cargo")]
    pub role: String,
}

impl RegisterRequest {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password,
            role: DEFAULT_ROLE.to_string(),
        }
    }
}
