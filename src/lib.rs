pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod oauth;
pub mod services;
pub mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // API
        .merge(member_routes())
        .merge(adm_member_routes())
        .merge(post_routes())
        // Global middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authentication_filter,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn member_routes() -> Router<AppState> {
    use handlers::members;

    Router::new()
        .route("/api/v1/members", post(members::join))
        .route("/api/v1/members/login", post(members::login))
        .route("/api/v1/members/logout", delete(members::logout))
        .route(
            "/api/v1/members/me",
            get(members::me).put(members::modify_me),
        )
        .route(
            "/api/v1/members/me/api-key",
            put(members::regenerate_api_key),
        )
}

fn adm_member_routes() -> Router<AppState> {
    use handlers::adm_members;

    Router::new()
        .route("/api/v1/adm/members", get(adm_members::get_items))
        .route("/api/v1/adm/members/:id", get(adm_members::get_item))
}

fn post_routes() -> Router<AppState> {
    use handlers::{comments, posts};

    Router::new()
        .route("/api/v1/posts", get(posts::get_items).post(posts::write))
        .route("/api/v1/posts/mine", get(posts::get_mine))
        .route(
            "/api/v1/posts/:post_id",
            get(posts::get_item)
                .put(posts::modify)
                .delete(posts::delete),
        )
        .route(
            "/api/v1/posts/:post_id/comments",
            get(comments::get_items).post(comments::write),
        )
        .route(
            "/api/v1/posts/:post_id/comments/:id",
            get(comments::get_item)
                .put(comments::modify)
                .delete(comments::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Quill API",
        "version": version,
        "endpoints": {
            "members": "/api/v1/members (join, login, logout, me)",
            "posts": "/api/v1/posts[/:id] and /api/v1/posts/:postId/comments[/:id]",
            "adm": "/api/v1/adm/members (admin only)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    match state.members.ping().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({ "status": "ok" })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::response::Json(json!({ "status": "degraded" })),
            )
        }
    }
}
