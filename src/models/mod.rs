//! Data models for the swap-matching API.
//!
//! This module contains the wire schema exchanged with the remote API,
//! including user records, institutions, swap requests and auth payloads.
//! Server responses are decoded into these types at the boundary; nothing
//! downstream handles untyped JSON.

pub mod auth;
pub mod error;
pub mod institution;
pub mod notification;
pub mod request;
pub mod user;

pub use auth::*;
pub use error::*;
pub use institution::*;
pub use notification::*;
pub use request::*;
pub use user::*;
