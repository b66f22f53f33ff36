//! Error types for the hookwire core library
//!
//! Defines the error taxonomy for a webhook invocation and the retry/fatal
//! disposition consumed by the job framework's error handler. Classification
//! is kind-based internally; free-text substring matching is only applied to
//! opaque messages crossing the transport boundary.

use thiserror::Error;

/// Main error type for webhook action operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed invocation parameters
    #[error("{message}")]
    Validation { message: String },

    /// No base address available from parameters or environment
    #[error("No URL specified")]
    NoUrl,

    /// A suffix was supplied without any base address to append it to
    #[error("addressSuffix provided but no base address available")]
    SuffixWithoutBase,

    /// The requestHeaders parameter could not be resolved to a header map
    #[error("Failed to parse requestHeaders: {message}")]
    HeaderParse { message: String },

    /// The acceptedStatusCodes parameter could not be resolved to a code list
    #[error("Failed to parse acceptedStatusCodes: {message}")]
    AcceptedStatusCodesParse { message: String },

    /// No authentication secrets are present; swallowed by the caller
    #[error("no authentication configured")]
    AuthNotConfigured,

    /// The OAuth2 client-credentials flow is missing environment config
    #[error("OAuth2 client credentials configuration incomplete: {message}")]
    OAuth2Config { message: String },

    /// The token endpoint answered outside the success range
    #[error("OAuth2 token request failed with status {status}: {message}")]
    OAuth2TokenRequest { status: u16, message: String },

    /// The token endpoint answered successfully but without an access token
    #[error("OAuth2 token response did not contain an access token")]
    OAuth2NoAccessToken,

    /// The remote endpoint answered outside the success and accepted sets
    #[error("Request failed with status code: {status}. Response body: {body}.")]
    RemoteRequestFailed { status: u16, body: String },

    /// Transport-level failure from the HTTP layer
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// What the caller should do with a failed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Attempt the invocation again later
    Retry,
    /// Surface the error to the user; retrying cannot help
    Fatal,
}

impl Disposition {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Disposition::Retry)
    }
}

/// Message fragments that mark a transport failure as transient
const RETRYABLE_MARKERS: &[&str] = &[
    "econnrefused",
    "connection refused",
    "timed out",
    "timeout",
    "enotfound",
    "dns error",
    "failed to lookup",
    "fetch failed",
    "network",
];

/// Message fragments that mark an error as a client-side validation problem
const FATAL_MARKERS: &[&str] = &[
    "is required",
    "failed to parse",
    "no url specified",
    "addresssuffix provided but no base address available",
];

impl Error {
    /// Decide retry vs fatal for this error.
    ///
    /// Validation, parse, and configuration failures are fatal: the same
    /// inputs will fail the same way on every attempt. Remote status
    /// failures and transport errors are retryable. Anything unmatched
    /// fails open toward retry.
    pub fn disposition(&self) -> Disposition {
        match self {
            Error::Validation { .. }
            | Error::NoUrl
            | Error::SuffixWithoutBase
            | Error::HeaderParse { .. }
            | Error::AcceptedStatusCodesParse { .. }
            | Error::AuthNotConfigured
            | Error::OAuth2Config { .. }
            | Error::OAuth2TokenRequest { .. }
            | Error::OAuth2NoAccessToken => Disposition::Fatal,
            Error::RemoteRequestFailed { .. } => Disposition::Retry,
            Error::Transport { message, .. } => classify_message(message),
        }
    }
}

/// Classify a free-text error message from an external boundary.
///
/// The transport layer and the hosting framework hand us plain error
/// objects with no structured kind, so this is the one place where message
/// text drives branching.
pub fn classify_message(message: &str) -> Disposition {
    let lower = message.to_lowercase();
    if RETRYABLE_MARKERS.iter().any(|m| lower.contains(m)) {
        return Disposition::Retry;
    }
    if FATAL_MARKERS.iter().any(|m| lower.contains(m)) {
        return Disposition::Fatal;
    }
    Disposition::Retry
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }
}
