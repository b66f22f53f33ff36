//! Webhook action entry points consumed by the job framework
//!
//! `run` drives one invocation end to end: validate the method, compose the
//! URL, normalize the request, resolve authorization when the caller did not
//! supply one, dispatch, and classify the outcome. A response outside the
//! success and accepted sets fails the invocation itself (strict policy);
//! the framework then feeds the error to `on_error` to decide retry vs halt.

use chrono::{SecondsFormat, Utc};

use crate::http::{auth, HttpExecutor, RequestPlan};
use crate::types::{
    ErrorHandlerOutput, HaltOutput, InvocationContext, RunOutput, WebhookParams, WebhookResult,
};
use crate::{Disposition, Error, Result};

/// Execute one webhook invocation
pub async fn run(params: &WebhookParams, context: &InvocationContext) -> Result<RunOutput> {
    if params.method.trim().is_empty() {
        return Err(Error::Validation {
            message: "method is required".to_string(),
        });
    }

    let mut plan = RequestPlan::build(params, context)?;
    let executor = HttpExecutor::new();

    // An explicit Authorization header always wins over every automatic
    // mechanism; auth itself is optional.
    if !plan.has_authorization() {
        match auth::resolve(context, executor.client()).await {
            Ok(value) => {
                plan.headers.insert("Authorization".to_string(), value);
            }
            Err(Error::AuthNotConfigured) => {}
            Err(err) => return Err(err),
        }
    }

    let response = executor.execute(&plan).await?;
    if !response.success {
        log::warn!(
            "webhook {} {} failed with status {}",
            plan.method,
            plan.url,
            response.status_code
        );
        return Err(Error::RemoteRequestFailed {
            status: response.status_code,
            body: response.body,
        });
    }

    let executed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    Ok(RunOutput::success(WebhookResult {
        status_code: response.status_code,
        body: response.body,
        success: response.success,
        executed_at,
    }))
}

/// Decide what the framework should do with a failed invocation.
///
/// Returns the retry envelope for transient failures and rethrows the
/// original error unchanged for fatal ones.
pub fn on_error(error: Error) -> Result<ErrorHandlerOutput> {
    match error.disposition() {
        Disposition::Retry => {
            log::warn!("retry requested after error: {}", error);
            Ok(ErrorHandlerOutput::retry_requested())
        }
        Disposition::Fatal => {
            log::error!("fatal error, not retrying: {}", error);
            Err(error)
        }
    }
}

/// Halt the action.
///
/// A no-op: the core holds no resources across the single-request
/// lifecycle, so there is nothing to clean up.
pub fn halt() -> HaltOutput {
    HaltOutput::halted()
}
