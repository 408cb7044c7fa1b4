//! Uniform response envelope and pagination plumbing.
//!
//! Every endpoint answers `{success, message, data?, meta?}`; paginated
//! lists additionally carry `{page, limit, total, totalPages}` in `meta`.

use axum::http::StatusCode;
use axum::Json;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Meta {
    pub page: u64,
    pub limit: i64,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    with_status(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    with_status(StatusCode::CREATED, message, data)
}

pub fn message_only(message: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::OK,
        Json(ApiResponse { success: true, message: message.to_string(), data: None, meta: None }),
    )
}

pub fn with_status<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        status,
        Json(ApiResponse { success: true, message: message.to_string(), data: Some(data), meta: None }),
    )
}

pub fn paginated<T: Serialize>(
    message: &str,
    data: Vec<T>,
    pagination: &Pagination,
    total: u64,
) -> (StatusCode, Json<ApiResponse<Vec<T>>>) {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            data: Some(data),
            meta: Some(pagination.meta(total)),
        }),
    )
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Normalized pagination parameters: page is 1-based, limit clamped to
/// 1..=100, sort defaults to newest first.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u64,
    pub limit: i64,
    pub sort_by: String,
    pub order: SortOrder,
}

impl Pagination {
    pub fn new(
        page: Option<u64>,
        limit: Option<i64>,
        sort_by: Option<String>,
        order: Option<SortOrder>,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort_by: sort_by.unwrap_or_else(|| "created_at".to_string()),
            order: order.unwrap_or_default(),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit as u64
    }

    pub fn sort(&self) -> Document {
        let mut sort = Document::new();
        sort.insert(self.sort_by.clone(), self.order.direction());
        sort
    }

    pub fn meta(&self, total: u64) -> Meta {
        Meta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(self.limit as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn pagination_defaults_and_clamps() {
        let pg = Pagination::new(None, None, None, None);
        assert_eq!(pg.page, 1);
        assert_eq!(pg.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(pg.sort_by, "created_at");
        assert_eq!(pg.order, SortOrder::Desc);

        let pg = Pagination::new(Some(0), Some(500), None, None);
        assert_eq!(pg.page, 1);
        assert_eq!(pg.limit, MAX_PAGE_SIZE);

        let pg = Pagination::new(Some(3), Some(10), Some("name".into()), Some(SortOrder::Asc));
        assert_eq!(pg.skip(), 20);
        assert_eq!(pg.sort(), doc! {"name": 1});
    }

    #[test]
    fn meta_rounds_total_pages_up() {
        let pg = Pagination::new(Some(2), Some(20), None, None);
        let meta = pg.meta(41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.page, 2);
        assert_eq!(pg.meta(0).total_pages, 0);
        assert_eq!(pg.meta(40).total_pages, 2);
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let body = serde_json::to_value(ApiResponse::<()> {
            success: true,
            message: "Success".into(),
            data: None,
            meta: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "message": "Success"}));
    }

    #[test]
    fn envelope_includes_meta_when_present() {
        let pg = Pagination::new(Some(1), Some(2), None, None);
        let (status, Json(body)) = paginated("Data retrieved successfully", vec![1, 2], &pg, 5);
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["meta"]["totalPages"], 3);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
