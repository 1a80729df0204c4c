use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Usernames with implicit admin rights. Not a stored role.
pub const ADMIN_USERNAMES: &[&str] = &["system", "admin"];

pub const DEFAULT_PROFILE_IMG_URL: &str = "https://placehold.co/600x600?text=U_U";

/// A registered account. Identities reconstructed from access-token claims
/// carry no timestamps, password hash or API key.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: i64,
    pub create_date: Option<DateTime<Utc>>,
    pub modify_date: Option<DateTime<Utc>>,
    pub username: String,
    /// Argon2 hash; empty for OAuth2-only accounts.
    pub password: String,
    pub name: String,
    pub api_key: String,
    pub profile_img_url: Option<String>,
}

impl Member {
    /// Fresh member ahead of id assignment by the store.
    pub fn new(
        username: &str,
        password_hash: &str,
        name: &str,
        profile_img_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            create_date: Some(now),
            modify_date: Some(now),
            username: username.to_string(),
            password: password_hash.to_string(),
            name: name.to_string(),
            api_key: Uuid::new_v4().to_string(),
            profile_img_url,
        }
    }

    /// Lightweight identity rebuilt from verified token claims; never persisted.
    pub fn from_claims(id: i64, username: &str, name: &str) -> Self {
        Self {
            id,
            create_date: None,
            modify_date: None,
            username: username.to_string(),
            password: String::new(),
            name: name.to_string(),
            api_key: String::new(),
            profile_img_url: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        ADMIN_USERNAMES.contains(&self.username.as_str())
    }

    pub fn modify(&mut self, name: &str, profile_img_url: Option<String>) {
        self.name = name.to_string();
        self.profile_img_url = profile_img_url;
        self.modify_date = Some(Utc::now());
    }

    pub fn regenerate_api_key(&mut self) {
        self.api_key = Uuid::new_v4().to_string();
        self.modify_date = Some(Utc::now());
    }

    pub fn profile_img_url_or_default(&self) -> String {
        self.profile_img_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE_IMG_URL.to_string())
    }
}

/// Public member projection; leaves the username out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub is_admin: bool,
    pub name: String,
    pub profile_image_url: String,
}

impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            create_date: member.create_date.unwrap_or_else(Utc::now),
            modify_date: member.modify_date.unwrap_or_else(Utc::now),
            is_admin: member.is_admin(),
            name: member.name.clone(),
            profile_image_url: member.profile_img_url_or_default(),
        }
    }
}

/// Member projection for the account owner and admin views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWithUsernameDto {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub modify_date: DateTime<Utc>,
    pub is_admin: bool,
    pub username: String,
    pub name: String,
    pub profile_image_url: String,
}

impl From<&Member> for MemberWithUsernameDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            create_date: member.create_date.unwrap_or_else(Utc::now),
            modify_date: member.modify_date.unwrap_or_else(Utc::now),
            is_admin: member.is_admin(),
            username: member.username.clone(),
            name: member.name.clone(),
            profile_image_url: member.profile_img_url_or_default(),
        }
    }
}
