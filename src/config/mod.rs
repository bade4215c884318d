//! Configuration structures and loading utilities.
//!
//! This module contains the client configuration, including environment
//! variable loading and default values.

pub mod client;

pub use client::*;
