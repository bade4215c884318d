//! Permuta client - headless client for the teacher job-swap matching API
//!
//! This crate drives the swap-matching service on behalf of one user:
//! - Persisted session token with bearer authentication
//! - Typed gateways for every REST endpoint the client uses
//! - View-state machines for the auth form, profile, and list screens
//! - Client-side search and pagination of fetched lists
//! - Avatar loading with default-image fallback
//! - Structured logging and optional Prometheus metrics
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Wire schema of the remote API
//! - `services/` - HTTP transport, gateways, session and avatars
//! - `views/` - Per-screen state machines written against the gateway traits
//! - `utils/` - Validation rules and list filtering helpers
//! - `config/` - Configuration structures and environment loading
//! - `telemetry` - Logging setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use permuta_client::{ApiClient, AuthField, AuthForm, ClientConfig, FileTokenStore, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env();
//!     let session = Session::restore(FileTokenStore::new(&config.token_file));
//!     let api = ApiClient::new(config, session.clone(), None)?;
//!
//!     let mut form = AuthForm::new();
//!     form.set_field(AuthField::Email, "ana@escola.br");
//!     form.set_field(AuthField::Password, "segredo123");
//!     if let Some(outcome) = form.submit(&api, &session).await {
//!         println!("{outcome:?}");
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod utils;
pub mod version;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types and functions for convenience
pub use config::ClientConfig;
pub use models::{
    Institution, LoginRequest, LoginResponse, NewSwapRequest, RegisterRequest, RequestStatus,
    SwapRequest, User, UserId, UserSummary, UserUpdate,
};
pub use services::{
    ApiClient, ApiError, Avatar, AvatarCache, ClientMetrics, FileTokenStore, ObjectUrlRegistry,
    Session,
};
pub use telemetry::{LogConfig, LogFormat, init_tracing};
pub use version::VersionInfo;
pub use views::{
    AuthField, AuthForm, AuthMode, AuthOutcome, ContactListView, LoadState, NoticeBoard,
    NotificationsView, ProfileState, ProfileView, RequestListView, UserListView, ViewScope,
};
