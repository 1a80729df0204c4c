use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::database::repository::Page;

/// Standard response envelope: a `"<httpStatus>-<subcode>"` result code, a
/// human-readable message, and an optional payload. The numeric prefix of the
/// result code is also used as the transport status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsData<T> {
    pub result_code: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl RsData<()> {
    /// Envelope with no payload.
    pub fn of(result_code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            result_code: result_code.into(),
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> RsData<T> {
    pub fn new(result_code: impl Into<String>, msg: impl Into<String>, data: T) -> Self {
        Self {
            result_code: result_code.into(),
            msg: msg.into(),
            data: Some(data),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.result_code
            .split('-')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200)
    }
}

impl<T: Serialize> IntoResponse for RsData<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Wire shape for paginated listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page_no: u64,
    pub page_size: u64,
}

impl<T> PageDto<T> {
    pub fn from_page<U>(page: &Page<U>, f: impl Fn(&U) -> T) -> Self {
        Self {
            items: page.items.iter().map(f).collect(),
            total_items: page.total_items,
            total_pages: page.total_pages(),
            current_page_no: page.page_no,
            page_size: page.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_comes_from_result_code() {
        assert_eq!(RsData::of("201-1", "created").status_code(), 201);
        assert_eq!(RsData::of("200-1", "ok").status_code(), 200);
    }

    #[test]
    fn envelope_omits_missing_data() {
        let body = serde_json::to_value(RsData::of("200-1", "ok")).unwrap();
        assert_eq!(body["resultCode"], "200-1");
        assert_eq!(body["msg"], "ok");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn page_dto_maps_items() {
        let page = Page {
            items: vec![1, 2, 3],
            total_items: 7,
            page_no: 1,
            page_size: 3,
        };
        let dto = PageDto::from_page(&page, |n| n * 10);
        assert_eq!(dto.items, vec![10, 20, 30]);
        assert_eq!(dto.total_pages, 3);
    }
}
