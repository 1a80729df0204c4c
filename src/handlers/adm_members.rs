use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::require_admin;
use crate::api::PageDto;
use crate::database::models::member::MemberWithUsernameDto;
use crate::database::repository::{MemberListFilter, MemberSearchKeywordType};
use crate::error::ApiError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSearchParams {
    #[serde(default)]
    pub search_keyword_type: MemberSearchKeywordType,
    #[serde(default)]
    pub search_keyword: String,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

/// GET /api/v1/adm/members
pub async fn get_items(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<MemberSearchParams>,
) -> Result<Json<PageDto<MemberWithUsernameDto>>, ApiError> {
    require_admin(&actor)?;
    let page = state
        .members
        .list(MemberListFilter {
            keyword_type: params.search_keyword_type,
            keyword: params.search_keyword,
            page_no: params.page,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(PageDto::from_page(&page, |m| {
        MemberWithUsernameDto::from(m)
    })))
}

/// GET /api/v1/adm/members/:id
pub async fn get_item(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> Result<Json<MemberWithUsernameDto>, ApiError> {
    require_admin(&actor)?;
    let member = state.members.find_by_id(id).await?;
    Ok(Json(MemberWithUsernameDto::from(&member)))
}
