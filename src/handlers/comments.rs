use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{validated, AppJson};
use crate::api::RsData;
use crate::database::models::post::PostCommentDto;
use crate::error::ApiError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentReqBody {
    #[validate(length(min = 2, max = 5000))]
    pub content: String,
}

/// GET /api/v1/posts/:post_id/comments
pub async fn get_items(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<PostCommentDto>>, ApiError> {
    let post = state.posts.find_by_id(post_id).await?;
    Ok(Json(post.comments().iter().map(PostCommentDto::from).collect()))
}

/// GET /api/v1/posts/:post_id/comments/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<Json<PostCommentDto>, ApiError> {
    let post = state.posts.find_by_id(post_id).await?;
    let comment = post
        .find_comment(id)
        .ok_or_else(|| ApiError::new("404-2", format!("Comment {id} not found.")))?;
    Ok(Json(PostCommentDto::from(comment)))
}

/// POST /api/v1/posts/:post_id/comments
pub async fn write(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(post_id): Path<i64>,
    AppJson(body): AppJson<CommentReqBody>,
) -> Result<RsData<PostCommentDto>, ApiError> {
    validated(&body)?;
    let mut post = state.posts.find_by_id(post_id).await?;
    let comment = state
        .posts
        .write_comment(&mut post, &actor, &body.content)
        .await?;
    Ok(RsData::new(
        "201-1",
        format!("Comment {} created.", comment.id),
        PostCommentDto::from(&comment),
    ))
}

/// PUT /api/v1/posts/:post_id/comments/:id - author only.
pub async fn modify(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((post_id, id)): Path<(i64, i64)>,
    AppJson(body): AppJson<CommentReqBody>,
) -> Result<RsData<()>, ApiError> {
    validated(&body)?;
    let mut post = state.posts.find_by_id(post_id).await?;
    let comment = post
        .find_comment(id)
        .ok_or_else(|| ApiError::new("404-2", format!("Comment {id} not found.")))?;
    comment.check_actor_can_modify(&actor)?;

    state.posts.modify_comment(&mut post, id, &body.content).await?;
    Ok(RsData::of("200-1", format!("Comment {id} modified.")))
}

/// DELETE /api/v1/posts/:post_id/comments/:id - author only.
pub async fn delete(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((post_id, id)): Path<(i64, i64)>,
) -> Result<RsData<()>, ApiError> {
    let mut post = state.posts.find_by_id(post_id).await?;
    let comment = post
        .find_comment(id)
        .ok_or_else(|| ApiError::new("404-2", format!("Comment {id} not found.")))?;
    comment.check_actor_can_delete(&actor)?;

    state.posts.delete_comment(&mut post, id).await?;
    Ok(RsData::of("200-1", format!("Comment {id} deleted.")))
}
