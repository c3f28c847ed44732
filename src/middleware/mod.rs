//! HTTP middleware components.

/// Bearer API key authentication
pub mod auth;
