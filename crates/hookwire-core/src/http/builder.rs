//! Request construction for webhook invocations
//!
//! Composes the target URL from explicit and environment sources and
//! normalizes the flexible parameter shapes (string-or-structured headers,
//! body, and accepted status codes) into one canonical [`RequestPlan`].

use std::collections::HashMap;

use serde_json::Value;

use crate::types::{InvocationContext, WebhookParams, ENV_BASE_URL};
use crate::{Error, Result};

/// Methods that carry a request body; everything else drops it
const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];

/// Methods accepted by the executor
const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Default User-Agent injected when the caller did not set one
pub(crate) const USER_AGENT: &str = concat!("hookwire/", env!("CARGO_PKG_VERSION"));

/// Canonical, fully-resolved request ready for dispatch
#[derive(Debug, Clone)]
pub struct RequestPlan {
    /// Uppercase HTTP method
    pub method: String,
    /// Absolute target URL
    pub url: String,
    /// Final header map; keys are kept as provided by the caller
    pub headers: HashMap<String, String>,
    /// Body text, present only for body-bearing methods
    pub body: Option<String>,
    /// Status codes accepted as success in addition to the 2xx range
    pub accepted_status_codes: Vec<u16>,
}

impl RequestPlan {
    /// Resolve parameters and context into a dispatchable plan.
    ///
    /// All string-or-structured inputs are resolved here, exactly once;
    /// nothing downstream branches on parameter shape.
    pub fn build(params: &WebhookParams, context: &InvocationContext) -> Result<Self> {
        let method = normalize_method(&params.method)?;
        let url = compose_url(
            params.address.as_deref(),
            context.env(ENV_BASE_URL),
            params.address_suffix.as_deref(),
        )?;
        let mut headers = resolve_headers(params.request_headers.as_ref())?;
        let body = resolve_body(params.request_body.as_ref(), &method);
        let accepted_status_codes = resolve_accepted_codes(params.accepted_status_codes.as_ref())?;

        if body.is_some() && !has_header(&headers, "Content-Type") {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if !has_header(&headers, "User-Agent") {
            headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
        }

        Ok(Self {
            method,
            url,
            headers,
            body,
            accepted_status_codes,
        })
    }

    /// Whether the caller already supplied an Authorization header
    pub fn has_authorization(&self) -> bool {
        has_header(&self.headers, "Authorization")
    }
}

/// Compose the absolute target URL.
///
/// The explicit address wins over the environment base address. Exactly one
/// trailing `/` is stripped from the chosen base, and when a suffix is given
/// the join always uses exactly one `/` separator regardless of the suffix's
/// own leading slashes.
pub fn compose_url(
    explicit: Option<&str>,
    env_address: Option<&str>,
    suffix: Option<&str>,
) -> Result<String> {
    let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());
    let env_address = env_address.map(str::trim).filter(|s| !s.is_empty());
    let suffix = suffix.map(str::trim).filter(|s| !s.is_empty());

    let base = match explicit.or(env_address) {
        Some(base) => base,
        None if suffix.is_some() => return Err(Error::SuffixWithoutBase),
        None => return Err(Error::NoUrl),
    };
    let base = base.strip_suffix('/').unwrap_or(base);

    Ok(match suffix {
        Some(suffix) => format!("{}/{}", base, suffix.trim_start_matches('/')),
        None => base.to_string(),
    })
}

/// Normalize the method to uppercase and reject unsupported verbs
fn normalize_method(method: &str) -> Result<String> {
    let normalized = method.trim().to_uppercase();
    if SUPPORTED_METHODS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(Error::Validation {
            message: format!("Unsupported HTTP method: {}", method),
        })
    }
}

/// Resolve the headers parameter into a fresh map.
///
/// The string form must parse as a JSON object. The structured form is
/// shallow-copied so later computed-header insertion never touches the
/// caller's value.
fn resolve_headers(input: Option<&Value>) -> Result<HashMap<String, String>> {
    let map = match input {
        None => return Ok(HashMap::new()),
        Some(Value::String(raw)) => {
            let parsed: Value = serde_json::from_str(raw).map_err(|e| Error::HeaderParse {
                message: e.to_string(),
            })?;
            match parsed {
                Value::Object(map) => map,
                other => {
                    return Err(Error::HeaderParse {
                        message: format!("expected a JSON object, got {}", type_name(&other)),
                    })
                }
            }
        }
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(Error::HeaderParse {
                message: format!("expected a JSON object, got {}", type_name(other)),
            })
        }
    };

    Ok(map
        .into_iter()
        .map(|(name, value)| (name, header_value(value)))
        .collect())
}

/// Resolve the body parameter: strings pass through unmodified, structured
/// values serialize to compact JSON. Body-less methods drop it entirely.
fn resolve_body(input: Option<&Value>, method: &str) -> Option<String> {
    if !BODY_METHODS.contains(&method) {
        return None;
    }
    match input {
        None => None,
        Some(Value::String(raw)) => Some(raw.clone()),
        Some(structured) => Some(structured.to_string()),
    }
}

/// Resolve the accepted-status-codes parameter into a code list
fn resolve_accepted_codes(input: Option<&Value>) -> Result<Vec<u16>> {
    match input {
        None => Ok(Vec::new()),
        Some(value @ Value::Array(_)) => {
            serde_json::from_value(value.clone()).map_err(|e| Error::AcceptedStatusCodesParse {
                message: e.to_string(),
            })
        }
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).map_err(|e| Error::AcceptedStatusCodesParse {
                message: e.to_string(),
            })
        }
        Some(other) => Err(Error::AcceptedStatusCodesParse {
            message: format!("expected an array of integers, got {}", type_name(other)),
        }),
    }
}

/// Case-insensitive header presence check
pub(crate) fn has_header(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

fn header_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> WebhookParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_explicit_address_wins_over_environment() {
        let url = compose_url(
            Some("https://explicit.example.com"),
            Some("https://env.example.com"),
            None,
        )
        .unwrap();
        assert_eq!(url, "https://explicit.example.com");
    }

    #[test]
    fn test_environment_address_fallback() {
        let url = compose_url(None, Some("https://env.example.com"), Some("/items")).unwrap();
        assert_eq!(url, "https://env.example.com/items");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let url = compose_url(Some("https://api.example.com/"), None, None).unwrap();
        assert_eq!(url, "https://api.example.com");
    }

    #[test]
    fn test_suffix_join_never_doubles_slash() {
        for (base, suffix) in [
            ("https://api.example.com", "/items/123"),
            ("https://api.example.com/", "/items/123"),
            ("https://api.example.com", "items/123"),
            ("https://api.example.com/", "items/123"),
        ] {
            let url = compose_url(Some(base), None, Some(suffix)).unwrap();
            assert_eq!(url, "https://api.example.com/items/123", "base={base} suffix={suffix}");
        }
    }

    #[test]
    fn test_no_url_specified() {
        let err = compose_url(None, None, None).unwrap_err();
        assert!(err.to_string().contains("No URL specified"));
    }

    #[test]
    fn test_suffix_without_base_is_distinct() {
        let err = compose_url(None, None, Some("/items")).unwrap_err();
        assert!(err
            .to_string()
            .contains("addressSuffix provided but no base address available"));
    }

    #[test]
    fn test_headers_from_json_string() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "requestHeaders": "{\"X-Trace\": \"abc\", \"X-Count\": 3}",
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.headers.get("X-Trace").unwrap(), "abc");
        assert_eq!(plan.headers.get("X-Count").unwrap(), "3");
    }

    #[test]
    fn test_headers_bad_json_string() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "requestHeaders": "not json",
        }));
        let err = RequestPlan::build(&p, &InvocationContext::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse requestHeaders"));
    }

    #[test]
    fn test_headers_must_be_an_object() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "requestHeaders": "[1, 2]",
        }));
        let err = RequestPlan::build(&p, &InvocationContext::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse requestHeaders"));
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_structured_headers_do_not_mutate_caller_value() {
        let original = json!({"X-Trace": "abc"});
        let p = WebhookParams {
            method: "POST".to_string(),
            address: Some("https://api.example.com".to_string()),
            request_body: Some(json!({"k": "v"})),
            request_headers: Some(original.clone()),
            ..Default::default()
        };
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert!(plan.headers.contains_key("Content-Type"));
        assert_eq!(p.request_headers.unwrap(), original);
    }

    #[test]
    fn test_structured_body_serializes_compact_in_order() {
        let p = params(json!({
            "method": "POST",
            "address": "https://api.example.com",
            "requestBody": {"zebra": 1, "apple": {"nested": true}},
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.body.as_deref(), Some(r#"{"zebra":1,"apple":{"nested":true}}"#));
    }

    #[test]
    fn test_string_body_passes_through() {
        let p = params(json!({
            "method": "PUT",
            "address": "https://api.example.com",
            "requestBody": "raw payload",
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.body.as_deref(), Some("raw payload"));
    }

    #[test]
    fn test_body_dropped_for_bodyless_methods() {
        for method in ["GET", "HEAD", "OPTIONS"] {
            let p = params(json!({
                "method": method,
                "address": "https://api.example.com",
                "requestBody": {"k": "v"},
            }));
            let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
            assert!(plan.body.is_none(), "{method} must not carry a body");
            assert!(!has_header(&plan.headers, "Content-Type"));
        }
    }

    #[test]
    fn test_accepted_codes_from_array_and_string() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "acceptedStatusCodes": [404, 410],
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.accepted_status_codes, vec![404, 410]);

        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "acceptedStatusCodes": "[301, 302]",
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.accepted_status_codes, vec![301, 302]);
    }

    #[test]
    fn test_accepted_codes_bad_input() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "acceptedStatusCodes": "not a list",
        }));
        let err = RequestPlan::build(&p, &InvocationContext::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse acceptedStatusCodes"));
    }

    #[test]
    fn test_content_type_injected_for_body() {
        let p = params(json!({
            "method": "POST",
            "address": "https://api.example.com",
            "requestBody": {"k": "v"},
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[test]
    fn test_caller_content_type_never_overwritten() {
        let p = params(json!({
            "method": "POST",
            "address": "https://api.example.com",
            "requestBody": {"k": "v"},
            "requestHeaders": {"content-type": "text/plain"},
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.headers.get("content-type").unwrap(), "text/plain");
        assert!(!plan.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_user_agent_injected_but_not_overridden() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.headers.get("User-Agent").unwrap(), USER_AGENT);

        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "requestHeaders": {"user-agent": "custom/1.0"},
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.headers.get("user-agent").unwrap(), "custom/1.0");
        assert!(!plan.headers.contains_key("User-Agent"));
    }

    #[test]
    fn test_method_normalized_to_uppercase() {
        let p = params(json!({
            "method": "post",
            "address": "https://api.example.com",
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert_eq!(plan.method, "POST");
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let p = params(json!({
            "method": "BREW",
            "address": "https://api.example.com",
        }));
        let err = RequestPlan::build(&p, &InvocationContext::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported HTTP method"));
    }

    #[test]
    fn test_authorization_check_is_case_insensitive() {
        let p = params(json!({
            "method": "GET",
            "address": "https://api.example.com",
            "requestHeaders": {"authorization": "Bearer caller-token"},
        }));
        let plan = RequestPlan::build(&p, &InvocationContext::default()).unwrap();
        assert!(plan.has_authorization());
    }

    #[test]
    fn test_base_url_from_environment() {
        let mut ctx = InvocationContext::default();
        ctx.environment
            .insert(ENV_BASE_URL.to_string(), "https://env.example.com/".to_string());
        let p = params(json!({"method": "GET", "addressSuffix": "items"}));
        let plan = RequestPlan::build(&p, &ctx).unwrap();
        assert_eq!(plan.url, "https://env.example.com/items");
    }
}
