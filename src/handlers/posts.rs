use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{validated, AppJson};
use crate::api::{PageDto, RsData};
use crate::database::models::post::{PostDto, PostWithContentDto};
use crate::database::repository::{PostListFilter, PostSearchKeywordType};
use crate::error::ApiError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSearchParams {
    #[serde(default)]
    pub search_keyword_type: PostSearchKeywordType,
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

/// GET /api/v1/posts - public listing; only published, listed posts show up.
pub async fn get_items(
    State(state): State<AppState>,
    Query(params): Query<PostSearchParams>,
) -> Result<Json<PageDto<PostDto>>, ApiError> {
    let page = state
        .posts
        .list(PostListFilter {
            keyword_type: params.search_keyword_type,
            keyword: params.search_keyword,
            author_id: None,
            published: Some(true),
            listed: Some(true),
            page_no: params.page,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(PageDto::from_page(&page, |p| PostDto::from(p))))
}

/// GET /api/v1/posts/mine - everything the actor wrote, drafts included.
pub async fn get_mine(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<PostSearchParams>,
) -> Result<Json<PageDto<PostDto>>, ApiError> {
    let page = state
        .posts
        .list(PostListFilter {
            keyword_type: params.search_keyword_type,
            keyword: params.search_keyword,
            author_id: Some(actor.id),
            published: None,
            listed: None,
            page_no: params.page,
            page_size: params.page_size,
        })
        .await?;
    Ok(Json(PageDto::from_page(&page, |p| PostDto::from(p))))
}

/// GET /api/v1/posts/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithContentDto>, ApiError> {
    let post = state.posts.find_by_id(id).await?;
    Ok(Json(PostWithContentDto::from(&post)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostWriteReqBody {
    #[validate(length(min = 2, max = 100))]
    pub title: String,
    #[validate(length(min = 2, max = 5000))]
    pub content: String,
    pub published: Option<bool>,
    pub listed: Option<bool>,
}

/// POST /api/v1/posts
pub async fn write(
    State(state): State<AppState>,
    Actor(actor): Actor,
    AppJson(body): AppJson<PostWriteReqBody>,
) -> Result<RsData<PostDto>, ApiError> {
    validated(&body)?;
    let post = state
        .posts
        .write(
            &actor,
            &body.title,
            &body.content,
            body.published.unwrap_or(true),
            body.listed.unwrap_or(true),
        )
        .await?;
    Ok(RsData::new(
        "201-1",
        format!("Post {} created.", post.id),
        PostDto::from(&post),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostModifyReqBody {
    #[validate(length(min = 2, max = 100))]
    pub title: String,
    #[validate(length(min = 2, max = 5000))]
    pub content: String,
    pub published: Option<bool>,
    pub listed: Option<bool>,
}

/// PUT /api/v1/posts/:id - author only.
pub async fn modify(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
    AppJson(body): AppJson<PostModifyReqBody>,
) -> Result<RsData<()>, ApiError> {
    validated(&body)?;
    let mut post = state.posts.find_by_id(id).await?;
    post.check_actor_can_modify(&actor)?;

    let published = body.published.unwrap_or(post.published);
    let listed = body.listed.unwrap_or(post.listed);
    state
        .posts
        .modify(&mut post, &body.title, &body.content, published, listed)
        .await?;
    Ok(RsData::of("200-1", format!("Post {id} modified.")))
}

/// DELETE /api/v1/posts/:id - author only; comments go with the post.
pub async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<i64>,
) -> Result<RsData<()>, ApiError> {
    let post = state.posts.find_by_id(id).await?;
    post.check_actor_can_delete(&actor)?;
    state.posts.delete(&post).await?;
    Ok(RsData::of("200-1", format!("Post {id} deleted.")))
}
