use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde_json::Value;

use crate::auth::credentials::Credentials;
use crate::auth::AuthTokenService;
use crate::database::models::member::Member;
use crate::database::repository::{MemberListFilter, MemberStore, Page};
use crate::error::ApiError;
use crate::oauth::{self, OAuthProvider};

/// Which credential ultimately authenticated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    AccessToken,
    ApiKey,
}

#[derive(Debug, Clone)]
pub struct AuthenticatedMember {
    pub member: Member,
    pub source: AuthSource,
}

#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn MemberStore>,
    auth_tokens: Arc<AuthTokenService>,
}

impl MemberService {
    pub fn new(store: Arc<dyn MemberStore>, auth_tokens: Arc<AuthTokenService>) -> Self {
        Self { store, auth_tokens }
    }

    pub async fn join(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        profile_img_url: Option<String>,
    ) -> Result<Member, ApiError> {
        if self.store.find_by_username(username).await?.is_some() {
            return Err(ApiError::new("409-1", "That username is already in use."));
        }
        let member = Member::new(username, &hash_password(password)?, nickname, profile_img_url);
        Ok(self.store.create(member).await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Member, ApiError> {
        let member = self
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::new("401-1", "Invalid username or password."))?;
        // OAuth2-only accounts carry no password and cannot log in this way
        if member.password.is_empty() || !verify_password(password, &member.password) {
            return Err(ApiError::new("401-1", "Invalid username or password."));
        }
        Ok(member)
    }

    /// Resolves extracted credentials to a member identity. The access token
    /// wins when both are present; the API key is the fallback. Token-path
    /// identities are rebuilt from claims without touching the store.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedMember, ApiError> {
        if !credentials.access_token.is_empty() {
            if let Some(payload) = self.auth_tokens.payload(&credentials.access_token) {
                let id = payload
                    .get("id")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| ApiError::new("401-4", "Invalid access token."))?;
                let username = payload
                    .get("username")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let name = payload.get("name").and_then(Value::as_str).unwrap_or_default();
                return Ok(AuthenticatedMember {
                    member: Member::from_claims(id, username, name),
                    source: AuthSource::AccessToken,
                });
            }
        }

        if !credentials.api_key.is_empty() {
            let member = self
                .store
                .find_by_api_key(&credentials.api_key)
                .await?
                .ok_or_else(|| ApiError::new("401-3", "Invalid API key."))?;
            return Ok(AuthenticatedMember {
                member,
                source: AuthSource::ApiKey,
            });
        }

        Err(ApiError::new("401-5", "No credentials provided."))
    }

    pub fn gen_access_token(&self, member: &Member) -> Result<String, ApiError> {
        self.auth_tokens.gen_access_token(member)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Member, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::new("404-1", format!("Member {id} not found.")))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Member>, ApiError> {
        Ok(self.store.find_by_username(username).await?)
    }

    pub async fn modify(
        &self,
        id: i64,
        nickname: &str,
        profile_img_url: Option<String>,
    ) -> Result<Member, ApiError> {
        let mut member = self.find_by_id(id).await?;
        member.modify(nickname, profile_img_url);
        self.store.update(member.clone()).await?;
        Ok(member)
    }

    pub async fn regenerate_api_key(&self, id: i64) -> Result<Member, ApiError> {
        let mut member = self.find_by_id(id).await?;
        member.regenerate_api_key();
        self.store.update(member.clone()).await?;
        Ok(member)
    }

    /// Upsert used by OAuth2 logins: refresh the profile of a returning
    /// member, register a new one otherwise.
    pub async fn modify_or_join(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        profile_img_url: Option<String>,
    ) -> Result<Member, ApiError> {
        match self.store.find_by_username(username).await? {
            Some(mut member) => {
                member.modify(nickname, profile_img_url);
                self.store.update(member.clone()).await?;
                Ok(member)
            }
            None => self.join(username, password, nickname, profile_img_url).await,
        }
    }

    /// Provider callback payload to local member, via the uniform field
    /// extraction in [`crate::oauth`].
    pub async fn login_with_oauth(
        &self,
        provider: OAuthProvider,
        subject_id: &str,
        attributes: &Value,
    ) -> Result<Member, ApiError> {
        let info = oauth::extract_user_info(provider, subject_id, attributes)?;
        let username = info.username_for(provider);
        self.modify_or_join(
            &username,
            "",
            info.nickname.as_deref().unwrap_or(&username),
            info.profile_img_url,
        )
        .await
    }

    pub async fn list(&self, filter: MemberListFilter) -> Result<Page<Member>, ApiError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn ping(&self) -> Result<(), ApiError> {
        Ok(self.store.ping().await?)
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    if password.is_empty() {
        return Ok(String::new());
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::new("500-1", "Failed to process credentials.")
        })
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
