//! Utility functions and helper modules.
//!
//! This module contains the local form validation rules and the client-side
//! filtering and pagination helpers shared by the list views.

pub mod filter;
pub mod validation;

pub use filter::*;
pub use validation::*;
