use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

use crate::error::ApiError;

/// Credentials pulled from a request; either half may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub access_token: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty() && self.access_token.is_empty()
    }
}

/// Extracts `(apiKey, accessToken)` from the `Authorization` header, falling
/// back to the `apiKey`/`accessToken` cookies. A single header can carry
/// both: `Bearer <apiKey> <accessToken>`.
pub fn extract_credentials(headers: &HeaderMap) -> Result<Credentials, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !authorization.trim().is_empty() {
        let rest = authorization.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::new("401-2", "Authorization header must use the Bearer format.")
        })?;
        let mut parts = rest.splitn(2, ' ');
        return Ok(Credentials {
            api_key: parts.next().unwrap_or("").to_string(),
            access_token: parts.next().unwrap_or("").to_string(),
        });
    }

    Ok(Credentials {
        api_key: cookie_value(headers, "apiKey").unwrap_or_default(),
        access_token: cookie_value(headers, "accessToken").unwrap_or_default(),
    })
}

/// First non-blank value of cookie `name` across all Cookie headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| {
            let mut split = pair.trim().splitn(2, '=');
            let key = split.next()?.trim();
            let value = split.next()?.trim();
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
        .next()
}
