//! Core types for webhook invocations
//!
//! Defines the parameter and context shapes handed over by the hosting job
//! framework, and the result envelopes handed back. Boundary types carry
//! camelCase keys so the framework's JSON round-trips verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Environment key holding the default base address
pub const ENV_BASE_URL: &str = "WEBHOOK_BASE_URL";

/// Environment key for the OAuth2 client-credentials token endpoint
pub const ENV_OAUTH2_TOKEN_URL: &str = "OAUTH2_TOKEN_URL";

/// Environment key for the OAuth2 client id
pub const ENV_OAUTH2_CLIENT_ID: &str = "OAUTH2_CLIENT_ID";

/// Environment key for the optional OAuth2 scope
pub const ENV_OAUTH2_SCOPE: &str = "OAUTH2_SCOPE";

/// Environment key for the optional OAuth2 audience
pub const ENV_OAUTH2_AUDIENCE: &str = "OAUTH2_AUDIENCE";

/// Environment key selecting how the client authenticates to the token
/// endpoint; see [`AUTH_STYLE_IN_PARAMS`]
pub const ENV_OAUTH2_AUTH_STYLE: &str = "OAUTH2_AUTH_STYLE";

/// Auth-style value that embeds client_id/client_secret in the form body
/// instead of the default HTTP Basic header
pub const AUTH_STYLE_IN_PARAMS: &str = "in_params";

/// Secret key holding a static bearer token
pub const SECRET_BEARER_TOKEN: &str = "BEARER_TOKEN";

/// Secret key holding the basic-auth username
pub const SECRET_BASIC_USERNAME: &str = "BASIC_AUTH_USERNAME";

/// Secret key holding the basic-auth password
pub const SECRET_BASIC_PASSWORD: &str = "BASIC_AUTH_PASSWORD";

/// Secret key holding a pre-issued OAuth2 access token
pub const SECRET_OAUTH2_ACCESS_TOKEN: &str = "OAUTH2_ACCESS_TOKEN";

/// Secret key holding the OAuth2 client-credentials client secret
pub const SECRET_OAUTH2_CLIENT_SECRET: &str = "OAUTH2_CLIENT_SECRET";

/// Declarative parameters for one webhook invocation
///
/// `request_headers`, `request_body`, and `accepted_status_codes` accept
/// either a JSON-encoded string or an already-structured value; both shapes
/// are resolved once at the request-normalization boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookParams {
    /// HTTP method, case-insensitive
    #[serde(default)]
    pub method: String,

    /// Explicit target address; wins over the environment base address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Path appended to the base address with exactly one `/` separator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_suffix: Option<String>,

    /// Request body: a string passed through as-is, or a structured value
    /// serialized to compact JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,

    /// Request headers: a JSON object, or a JSON-encoded string of one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<Value>,

    /// Status codes to treat as success in addition to the 2xx range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_status_codes: Option<Value>,
}

/// Per-invocation environment and secret context
///
/// Immutable for the duration of the invocation and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Non-sensitive configuration, keyed by the `ENV_*` constants
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Credentials, keyed by the `SECRET_*` constants
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

impl InvocationContext {
    /// Look up an environment entry, treating empty values as absent
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Look up a secret, treating empty values as absent
    pub fn secret(&self, key: &str) -> Option<&str> {
        self.secrets.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Normalized outcome of the dispatched HTTP request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResult {
    /// HTTP status code of the response
    pub status_code: u16,

    /// Response body as text; empty when the body could not be read
    pub body: String,

    /// Whether the status fell in the 2xx range or the accepted set
    pub success: bool,

    /// ISO-8601 UTC timestamp with millisecond precision, captured after
    /// the response body was fully read
    pub executed_at: String,
}

/// Success envelope returned to the job framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub status: String,
    pub data: WebhookResult,
}

impl RunOutput {
    pub fn success(data: WebhookResult) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

/// Envelope returned by the error handler when a retry should be attempted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlerOutput {
    pub status: String,
}

impl ErrorHandlerOutput {
    pub fn retry_requested() -> Self {
        Self {
            status: "retry_requested".to_string(),
        }
    }
}

/// Envelope returned by the halt operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaltOutput {
    pub status: String,
}

impl HaltOutput {
    pub fn halted() -> Self {
        Self {
            status: "halted".to_string(),
        }
    }
}
