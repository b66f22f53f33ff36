//! HTTP machinery for the webhook action
//!
//! This module provides the request pipeline:
//! - Request construction from invocation parameters (URL composition,
//!   header/body/status-code normalization)
//! - Authorization resolution across four mechanisms with fixed precedence
//! - Single-shot dispatch with defensive response reading

pub mod auth;
pub mod builder;
pub mod client;

pub use auth::AuthMethod;
pub use builder::{compose_url, RequestPlan};
pub use client::{HttpExecutor, ResponseSummary};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
