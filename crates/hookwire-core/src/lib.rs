//! Hookwire Core - configurable HTTP request action for job pipelines
//!
//! This crate implements the webhook action consumed by the hosting job
//! framework: it resolves a target URL, authentication, headers, and body
//! from declarative parameters and environment/secret context, issues one
//! outbound HTTP request, and reports a normalized result or a classified
//! error back to the caller.
//!
//! # Main Components
//!
//! - **Error Handling**: error taxonomy with retry/fatal disposition,
//!   using `thiserror`
//! - **Core Types**: parameter, context, and result envelopes shared with
//!   the job framework
//! - **HTTP Pipeline**: URL composition, request normalization,
//!   authorization resolution, and single-shot dispatch
//! - **Action Entry Points**: `run`, `on_error`, and `halt`
//!
//! # Example
//!
//! ```no_run
//! use hookwire_core::{run, InvocationContext, WebhookParams};
//!
//! # async fn example() -> hookwire_core::Result<()> {
//! let params = WebhookParams {
//!     method: "GET".to_string(),
//!     address: Some("https://api.example.com/health".to_string()),
//!     ..Default::default()
//! };
//! let output = run(&params, &InvocationContext::default()).await?;
//! println!("endpoint answered {}", output.data.status_code);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod error;
pub mod http;
pub mod types;

// Re-export main types for convenience
pub use action::{halt, on_error, run};
pub use error::{classify_message, Disposition, Error, Result};
pub use types::{
    ErrorHandlerOutput, HaltOutput, InvocationContext, RunOutput, WebhookParams, WebhookResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
