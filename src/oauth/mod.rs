use serde_json::Value;

use crate::error::ApiError;

/// Supported third-party login providers. Each provider reports profile
/// fields in its own attribute shape; `extract_user_info` flattens them into
/// one uniform struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Kakao,
    Google,
    Naver,
}

impl OAuthProvider {
    pub fn parse(registration_id: &str) -> Result<Self, ApiError> {
        match registration_id.to_ascii_uppercase().as_str() {
            "KAKAO" => Ok(Self::Kakao),
            "GOOGLE" => Ok(Self::Google),
            "NAVER" => Ok(Self::Naver),
            other => Err(ApiError::new(
                "400-3",
                format!("Unsupported OAuth provider: {other}."),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kakao => "KAKAO",
            Self::Google => "GOOGLE",
            Self::Naver => "NAVER",
        }
    }
}

/// Uniform profile fields extracted from a provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthUserInfo {
    pub oauth_user_id: String,
    pub nickname: Option<String>,
    pub profile_img_url: Option<String>,
}

impl OAuthUserInfo {
    /// Local username for this provider identity, e.g. `KAKAO__12345`.
    pub fn username_for(&self, provider: OAuthProvider) -> String {
        format!("{}__{}", provider.as_str(), self.oauth_user_id)
    }
}

/// `subject_id` is the provider-reported subject; `attributes` the raw
/// user-info payload.
pub fn extract_user_info(
    provider: OAuthProvider,
    subject_id: &str,
    attributes: &Value,
) -> Result<OAuthUserInfo, ApiError> {
    match provider {
        OAuthProvider::Kakao => {
            let properties = attributes
                .get("properties")
                .and_then(Value::as_object)
                .ok_or_else(|| ApiError::new("401-6", "Kakao profile attributes missing."))?;
            Ok(OAuthUserInfo {
                oauth_user_id: subject_id.to_string(),
                nickname: str_field(properties.get("nickname")),
                profile_img_url: str_field(properties.get("profile_image")),
            })
        }
        OAuthProvider::Google => Ok(OAuthUserInfo {
            oauth_user_id: subject_id.to_string(),
            nickname: str_field(attributes.get("name")),
            profile_img_url: str_field(attributes.get("picture")),
        }),
        OAuthProvider::Naver => {
            let response = attributes
                .get("response")
                .and_then(Value::as_object)
                .ok_or_else(|| ApiError::new("401-6", "Naver profile attributes missing."))?;
            Ok(OAuthUserInfo {
                oauth_user_id: str_field(response.get("id"))
                    .unwrap_or_else(|| subject_id.to_string()),
                nickname: str_field(response.get("nickname")),
                profile_img_url: str_field(response.get("profile_image")),
            })
        }
    }
}

fn str_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
