use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::credentials::extract_credentials;
use crate::database::models::member::Member;
use crate::error::ApiError;
use crate::services::member_service::AuthSource;
use crate::state::AppState;

/// API paths that never require authentication.
const EXCLUDED_PATHS: &[&str] = &[
    "/api/v1/members",
    "/api/v1/members/login",
    "/api/v1/members/logout",
];

/// Request-scoped authenticated identity, installed by the filter and read
/// back through the extractor below. Lives only in the request extensions;
/// nothing is shared across requests.
#[derive(Debug, Clone)]
pub struct Actor(pub Member);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| ApiError::new("401-1", "Authentication required."))
    }
}

/// Single per-request authentication gate.
///
/// Non-API and allow-listed paths pass straight through, as do requests
/// carrying no credentials at all - handlers that need an identity reject
/// those via the [`Actor`] extractor. Anything else is resolved against the
/// token codec and the member store; failures short-circuit into a
/// structured error response. When the API key authenticated the request,
/// a fresh access token rides back on the response so the client can take
/// the cheaper token path next time.
pub async fn authentication_filter(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    tracing::debug!(path, "processing request");

    if !path.starts_with("/api/") || EXCLUDED_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let mut request = request;
    let reissued_token = match authenticate(&state, &mut request).await {
        Ok(reissued) => reissued,
        Err(e) => return e.into_response(),
    };

    let mut response = next.run(request).await;
    if let Some(token) = reissued_token {
        attach_access_token(&mut response, &token);
    }
    response
}

/// Resolves the request credentials, installs the actor, and reports the
/// fresh token to surface, if any.
async fn authenticate(state: &AppState, request: &mut Request) -> Result<Option<String>, ApiError> {
    let credentials = extract_credentials(request.headers())?;
    if credentials.is_empty() {
        return Ok(None);
    }

    tracing::debug!(api_key = %credentials.api_key, access_token = %credentials.access_token, "authenticating");

    let resolved = state.members.authenticate(&credentials).await?;
    let reissued = match resolved.source {
        AuthSource::AccessToken => None,
        AuthSource::ApiKey => Some(state.members.gen_access_token(&resolved.member)?),
    };

    request.extensions_mut().insert(Actor(resolved.member));
    Ok(reissued)
}

fn attach_access_token(response: &mut Response, token: &str) {
    if let Ok(value) = HeaderValue::from_str(&auth_cookie("accessToken", token)) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    if let Ok(value) = HeaderValue::from_str(token) {
        response.headers_mut().insert(AUTHORIZATION, value);
    }
}

/// Auth cookie with the attributes clients rely on; an empty value expires
/// the cookie immediately.
pub fn auth_cookie(name: &str, value: &str) -> String {
    let max_age = if value.is_empty() { 0 } else { 60 * 60 * 24 * 365 };
    format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Strict")
}

/// Appends `Set-Cookie: name=value` to an outgoing response.
pub fn set_auth_cookie(response: &mut Response, name: &str, value: &str) {
    if let Ok(header_value) = HeaderValue::from_str(&auth_cookie(name, value)) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
}
