pub mod credentials;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config;
use crate::database::models::member::Member;
use crate::error::ApiError;

/// Member snapshot embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub id: i64,
    pub username: String,
    pub name: String,
}

impl AuthClaims {
    pub fn of(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            name: member.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    auth: AuthClaims,
    iat: i64,
    exp: i64,
}

/// Issues and verifies the signed access tokens. Verification is a pure
/// computation: no store access, and no error ever escapes `payload` -
/// callers branch on `Option`, not on exceptions.
#[derive(Debug, Clone)]
pub struct AuthTokenService {
    secret: String,
    expiration_seconds: i64,
}

impl AuthTokenService {
    pub fn new(secret: impl Into<String>, expiration_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_seconds,
        }
    }

    pub fn from_config() -> Self {
        let security = &config::config().security;
        Self::new(
            security.jwt_secret.clone(),
            security.access_token_expiration_seconds,
        )
    }

    /// Sign `claims` into a token expiring `ttl_seconds` from now.
    pub fn issue(&self, claims: &AuthClaims, ttl_seconds: i64) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let token_claims = TokenClaims {
            auth: claims.clone(),
            iat: now,
            exp: now + ttl_seconds,
        };
        encode(
            &Header::default(),
            &token_claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("failed to sign access token: {}", e);
            ApiError::new("500-1", "Failed to issue access token.")
        })
    }

    pub fn gen_access_token(&self, member: &Member) -> Result<String, ApiError> {
        self.issue(&AuthClaims::of(member), self.expiration_seconds)
    }

    /// Claim payload of `access_token`, or `None` for anything malformed,
    /// tampered with, or expired.
    pub fn payload(&self, access_token: &str) -> Option<Map<String, Value>> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Map<String, Value>>(
            access_token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .ok()
    }
}
