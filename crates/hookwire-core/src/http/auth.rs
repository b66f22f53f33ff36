//! Authorization resolution for outbound webhook requests
//!
//! Supports four mechanisms, evaluated in a fixed precedence order:
//! - Bearer token secret
//! - Basic auth username/password secrets
//! - Pre-issued OAuth2 access token secret
//! - OAuth2 client-credentials flow (token fetched per invocation)
//!
//! The chain is an ordered list of detector functions; the first mechanism
//! whose required secrets are present wins, and lower-precedence mechanisms
//! are never consulted. Adding a mechanism is one entry in [`CHAIN`] at its
//! precedence slot.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;

use crate::types::{
    InvocationContext, AUTH_STYLE_IN_PARAMS, ENV_OAUTH2_AUDIENCE, ENV_OAUTH2_AUTH_STYLE,
    ENV_OAUTH2_CLIENT_ID, ENV_OAUTH2_SCOPE, ENV_OAUTH2_TOKEN_URL, SECRET_BASIC_PASSWORD,
    SECRET_BASIC_USERNAME, SECRET_BEARER_TOKEN, SECRET_OAUTH2_ACCESS_TOKEN,
    SECRET_OAUTH2_CLIENT_SECRET,
};
use crate::{Error, Result};

/// A matched authentication mechanism with its credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Static bearer token sent as `Bearer <token>`
    Bearer { token: String },
    /// Username/password pair sent as `Basic <base64(user:pass)>`
    Basic { username: String, password: String },
    /// Access token obtained elsewhere (e.g. an authorization-code flow),
    /// sent with the same Bearer normalization
    PreIssuedToken { token: String },
    /// Client secret for the OAuth2 client-credentials grant; the access
    /// token is fetched from the configured token endpoint
    ClientCredentials { client_secret: String },
}

type Detector = fn(&InvocationContext) -> Option<AuthMethod>;

/// Precedence chain, highest priority first
const CHAIN: &[Detector] = &[
    detect_bearer,
    detect_basic,
    detect_pre_issued,
    detect_client_credentials,
];

fn detect_bearer(context: &InvocationContext) -> Option<AuthMethod> {
    context.secret(SECRET_BEARER_TOKEN).map(|token| AuthMethod::Bearer {
        token: token.to_string(),
    })
}

fn detect_basic(context: &InvocationContext) -> Option<AuthMethod> {
    let username = context.secret(SECRET_BASIC_USERNAME)?;
    let password = context.secret(SECRET_BASIC_PASSWORD)?;
    Some(AuthMethod::Basic {
        username: username.to_string(),
        password: password.to_string(),
    })
}

fn detect_pre_issued(context: &InvocationContext) -> Option<AuthMethod> {
    context
        .secret(SECRET_OAUTH2_ACCESS_TOKEN)
        .map(|token| AuthMethod::PreIssuedToken {
            token: token.to_string(),
        })
}

fn detect_client_credentials(context: &InvocationContext) -> Option<AuthMethod> {
    context
        .secret(SECRET_OAUTH2_CLIENT_SECRET)
        .map(|client_secret| AuthMethod::ClientCredentials {
            client_secret: client_secret.to_string(),
        })
}

/// Pick the highest-precedence mechanism whose secrets are present
pub fn detect(context: &InvocationContext) -> Option<AuthMethod> {
    CHAIN.iter().find_map(|detector| detector(context))
}

/// Resolve the context into a ready-to-use `Authorization` header value.
///
/// Fails with [`Error::AuthNotConfigured`] when no mechanism matches; the
/// caller treats that as "auth is optional" and proceeds unauthenticated.
/// Every other failure is fatal.
pub async fn resolve(context: &InvocationContext, client: &reqwest::Client) -> Result<String> {
    let method = detect(context).ok_or(Error::AuthNotConfigured)?;
    match method {
        AuthMethod::Bearer { token } | AuthMethod::PreIssuedToken { token } => {
            Ok(bearer_value(&token))
        }
        AuthMethod::Basic { username, password } => {
            let encoded = STANDARD.encode(format!("{}:{}", username, password));
            Ok(format!("Basic {}", encoded))
        }
        AuthMethod::ClientCredentials { client_secret } => {
            fetch_client_credentials_token(context, client, &client_secret).await
        }
    }
}

/// Prefix a token with `Bearer ` unless the stored value already carries it
fn bearer_value(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

/// Execute the OAuth2 client-credentials grant and return `Bearer <token>`.
///
/// The token is fetched on every invocation; there is no caching. The client
/// authenticates with an HTTP Basic header by default, or by embedding
/// `client_id`/`client_secret` in the form body when the auth style is
/// `in_params`.
async fn fetch_client_credentials_token(
    context: &InvocationContext,
    client: &reqwest::Client,
    client_secret: &str,
) -> Result<String> {
    let token_url = context.env(ENV_OAUTH2_TOKEN_URL).ok_or_else(|| Error::OAuth2Config {
        message: format!("{} is not set", ENV_OAUTH2_TOKEN_URL),
    })?;
    let client_id = context.env(ENV_OAUTH2_CLIENT_ID).ok_or_else(|| Error::OAuth2Config {
        message: format!("{} is not set", ENV_OAUTH2_CLIENT_ID),
    })?;

    let mut form: Vec<(&str, String)> = vec![("grant_type", "client_credentials".to_string())];
    if let Some(scope) = context.env(ENV_OAUTH2_SCOPE) {
        form.push(("scope", scope.to_string()));
    }
    if let Some(audience) = context.env(ENV_OAUTH2_AUDIENCE) {
        form.push(("audience", audience.to_string()));
    }

    let in_params = context
        .env(ENV_OAUTH2_AUTH_STYLE)
        .map(|style| style.eq_ignore_ascii_case(AUTH_STYLE_IN_PARAMS))
        .unwrap_or(false);

    let mut request = client.post(token_url);
    if in_params {
        form.push(("client_id", client_id.to_string()));
        form.push(("client_secret", client_secret.to_string()));
    } else {
        request = request.basic_auth(client_id, Some(client_secret));
    }

    log::debug!("fetching OAuth2 client-credentials token from {}", token_url);
    let response = request.form(&form).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    if !(200..300).contains(&status) {
        return Err(Error::OAuth2TokenRequest {
            status,
            message: token_error_detail(&body),
        });
    }

    let parsed: Value = serde_json::from_str(&body).map_err(|_| Error::OAuth2NoAccessToken)?;
    match parsed.get("access_token").and_then(Value::as_str) {
        Some(access_token) => Ok(format!("Bearer {}", access_token)),
        None => Err(Error::OAuth2NoAccessToken),
    }
}

/// Extract the most useful error detail from a token endpoint response,
/// preferring structured OAuth2 error fields over the raw body
fn token_error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for field in ["error_description", "error", "message"] {
            if let Some(detail) = parsed.get(field).and_then(Value::as_str) {
                return detail.to_string();
            }
        }
    }
    body.to_string()
}
