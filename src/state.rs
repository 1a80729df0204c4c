use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::auth::AuthTokenService;
use crate::config;
use crate::database::memory::{MemoryMemberStore, MemoryPostStore};
use crate::database::postgres::{PgMemberStore, PgPostStore};
use crate::database::repository::{MemberStore, PostStore};
use crate::services::member_service::MemberService;
use crate::services::post_service::PostService;

/// Shared per-process context handed to every handler and to the
/// authentication filter. Everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub members: MemberService,
    pub posts: PostService,
}

impl AppState {
    pub fn new(
        member_store: Arc<dyn MemberStore>,
        post_store: Arc<dyn PostStore>,
        auth_tokens: AuthTokenService,
    ) -> Self {
        Self {
            members: MemberService::new(member_store, Arc::new(auth_tokens)),
            posts: PostService::new(post_store),
        }
    }

    /// In-memory stores; the default for development and tests.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryMemberStore::new()),
            Arc::new(MemoryPostStore::new()),
            AuthTokenService::from_config(),
        )
    }

    /// Postgres-backed stores when `DATABASE_URL` is configured, otherwise
    /// the in-memory ones.
    pub async fn from_config() -> anyhow::Result<Self> {
        let config = config::config();
        match &config.database.url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .connect(url)
                    .await?;
                tracing::info!("connected to postgres");
                Ok(Self::new(
                    Arc::new(PgMemberStore::new(pool.clone())),
                    Arc::new(PgPostStore::new(pool)),
                    AuthTokenService::from_config(),
                ))
            }
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory stores");
                Ok(Self::in_memory())
            }
        }
    }
}
