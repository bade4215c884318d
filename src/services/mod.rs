//! API access and client-side services.
//!
//! This module contains the HTTP transport, the gateway traits the views are
//! written against and their implementations on [`ApiClient`], the persisted
//! session token, avatar handling, and request metrics.

pub mod api_client;
pub mod auth;
pub mod avatar;
pub mod gateway;
pub mod matching;
pub mod metrics;
pub mod session;
pub mod users;

pub use api_client::{ApiClient, ApiError, CONNECTION_ERROR_MESSAGE, REQUEST_ID_HEADER};
pub use avatar::*;
pub use gateway::*;
pub use metrics::*;
pub use session::*;
