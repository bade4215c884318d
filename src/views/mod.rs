//! View-state machines for each screen of the client.
//!
//! Every view owns its in-memory state, talks to the API only through the
//! gateway traits, and reports failures as notices instead of errors. State is
//! merged back from responses; views never share mutable state with each
//! other.

pub mod auth_form;
pub mod contacts;
pub mod notice;
pub mod notifications;
pub mod profile;
pub mod requests;
pub mod scope;
pub mod users;

pub use auth_form::*;
pub use contacts::*;
pub use notice::*;
pub use notifications::*;
pub use profile::*;
pub use requests::*;
pub use scope::*;
pub use users::*;

use crate::services::api_client::ApiError;

/// Loading status of a list view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
    /// The session is gone; the caller should navigate to the login screen
    LoginRequired,
}

impl LoadState {
    pub(crate) fn from_error(err: &ApiError, message: &str) -> Self {
        if err.requires_login() {
            LoadState::LoginRequired
        } else {
            LoadState::Failed(message.to_string())
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
