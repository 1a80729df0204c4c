use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validated, AppJson};
use crate::api::RsData;
use crate::database::models::member::{MemberDto, MemberWithUsernameDto};
use crate::error::ApiError;
use crate::middleware::auth::{set_auth_cookie, Actor};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct JoinReqBody {
    #[validate(length(min = 2, max = 30))]
    pub username: String,
    #[validate(length(min = 2, max = 50))]
    pub password: String,
    #[validate(length(min = 2, max = 30))]
    pub nickname: String,
}

/// POST /api/v1/members
pub async fn join(
    State(state): State<AppState>,
    AppJson(body): AppJson<JoinReqBody>,
) -> Result<RsData<MemberDto>, ApiError> {
    validated(&body)?;
    let member = state
        .members
        .join(&body.username, &body.password, &body.nickname, None)
        .await?;
    Ok(RsData::new(
        "201-1",
        format!("Welcome, {}! Your registration is complete.", member.name),
        MemberDto::from(&member),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginReqBody {
    #[validate(length(min = 2, max = 30))]
    pub username: String,
    #[validate(length(min = 2, max = 50))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResBody {
    pub item: MemberDto,
    pub api_key: String,
    pub access_token: String,
}

/// POST /api/v1/members/login - sets both auth cookies on success.
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginReqBody>,
) -> Result<Response, ApiError> {
    validated(&body)?;
    let member = state.members.login(&body.username, &body.password).await?;
    let access_token = state.members.gen_access_token(&member)?;

    let rs = RsData::new(
        "200-1",
        format!("Welcome back, {}.", member.name),
        LoginResBody {
            item: MemberDto::from(&member),
            api_key: member.api_key.clone(),
            access_token: access_token.clone(),
        },
    );

    let mut response = rs.into_response();
    set_auth_cookie(&mut response, "apiKey", &member.api_key);
    set_auth_cookie(&mut response, "accessToken", &access_token);
    Ok(response)
}

/// DELETE /api/v1/members/logout - clears both auth cookies.
pub async fn logout() -> Response {
    let mut response = RsData::of("200-1", "Logged out.").into_response();
    set_auth_cookie(&mut response, "apiKey", "");
    set_auth_cookie(&mut response, "accessToken", "");
    response
}

/// GET /api/v1/members/me
pub async fn me(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<MemberWithUsernameDto>, ApiError> {
    // Token-path actors are claim snapshots; read the store for fresh data
    let member = state.members.find_by_id(actor.id).await?;
    Ok(Json(MemberWithUsernameDto::from(&member)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModifyMeReqBody {
    #[validate(length(min = 2, max = 30))]
    pub nickname: String,
    #[validate(url)]
    pub profile_img_url: Option<String>,
}

/// PUT /api/v1/members/me
pub async fn modify_me(
    State(state): State<AppState>,
    Actor(actor): Actor,
    AppJson(body): AppJson<ModifyMeReqBody>,
) -> Result<RsData<MemberWithUsernameDto>, ApiError> {
    validated(&body)?;
    let member = state
        .members
        .modify(actor.id, &body.nickname, body.profile_img_url)
        .await?;
    Ok(RsData::new(
        "200-1",
        "Profile updated.",
        MemberWithUsernameDto::from(&member),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResBody {
    pub api_key: String,
}

/// PUT /api/v1/members/me/api-key - invalidates the old key.
pub async fn regenerate_api_key(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<RsData<ApiKeyResBody>, ApiError> {
    let member = state.members.regenerate_api_key(actor.id).await?;
    Ok(RsData::new(
        "200-1",
        "API key regenerated.",
        ApiKeyResBody {
            api_key: member.api_key,
        },
    ))
}
