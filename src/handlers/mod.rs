pub mod adm_members;
pub mod comments;
pub mod members;
pub mod posts;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::database::models::member::Member;
use crate::error::ApiError;

/// JSON body extractor whose rejections use the standard error envelope
/// instead of axum's plain-text default.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::new("400-2", rejection.body_text())),
        }
    }
}

/// Runs the derive-based validation rules on a request body.
pub(crate) fn validated(body: &impl Validate) -> Result<(), ApiError> {
    body.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        ApiError::new(
            "400-1",
            format!("Invalid request: {}.", fields.join(", ")),
        )
    })
}

pub(crate) fn require_admin(actor: &Member) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::new("403-1", "Admin privileges required."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Body {
        #[validate(length(min = 2, max = 10))]
        title: String,
    }

    #[test]
    fn validation_failures_become_400_1() {
        let err = validated(&Body { title: "x".into() }).unwrap_err();
        assert_eq!(err.result_code, "400-1");
        assert!(err.msg.contains("title"));

        assert!(validated(&Body { title: "ok".into() }).is_ok());
    }

    #[test]
    fn admin_gate() {
        let admin = Member::new("admin", "", "Admin", None);
        let alice = Member::new("alice", "", "Alice", None);
        assert!(require_admin(&admin).is_ok());
        assert_eq!(require_admin(&alice).unwrap_err().result_code, "403-1");
    }
}
