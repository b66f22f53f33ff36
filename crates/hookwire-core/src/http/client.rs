//! HTTP dispatch for webhook requests
//!
//! Issues exactly one network request per invocation and reduces the
//! response to a status/body/success summary. Success is a computed flag,
//! never an error: the strict/lenient decision belongs to the layer above.

use reqwest::{Client as ReqwestClient, Method};

use crate::http::builder::RequestPlan;
use crate::{Error, Result};

/// Reduced view of the HTTP response
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    /// HTTP status code
    pub status_code: u16,
    /// Response body as text; empty when the body could not be read
    pub body: String,
    /// Whether the status fell in the 2xx range or the accepted set
    pub success: bool,
}

/// Single-use HTTP executor
///
/// Constructed fresh per invocation; connections, cookies, and any other
/// transport state never outlive the request.
pub struct HttpExecutor {
    client: ReqwestClient,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self {
            client: ReqwestClient::new(),
        }
    }

    /// The underlying client, shared with the OAuth2 token fetch so both
    /// network calls ride the same transport configuration
    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }

    /// Dispatch the plan and summarize the response.
    ///
    /// Never retries and never fails on a non-2xx status; only transport
    /// errors surface as `Err`. A response body that cannot be read (e.g. a
    /// bodyless 204) yields the empty string.
    pub async fn execute(&self, plan: &RequestPlan) -> Result<ResponseSummary> {
        let method = Method::from_bytes(plan.method.as_bytes()).map_err(|_| Error::Validation {
            message: format!("Unsupported HTTP method: {}", plan.method),
        })?;

        let mut request = self.client.request(method, &plan.url);
        for (name, value) in &plan.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &plan.body {
            request = request.body(body.clone());
        }

        log::debug!("dispatching {} {}", plan.method, plan.url);
        let response = request.send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let success = is_success(status_code, &plan.accepted_status_codes);

        log::debug!(
            "{} {} answered {} (success: {})",
            plan.method,
            plan.url,
            status_code,
            success
        );
        Ok(ResponseSummary {
            status_code,
            body,
            success,
        })
    }
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// A status succeeds when it falls in the 2xx range or the accepted set
pub(crate) fn is_success(status_code: u16, accepted: &[u16]) -> bool {
    (200..300).contains(&status_code) || accepted.contains(&status_code)
}
