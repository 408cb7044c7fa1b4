//! Request extractors that route rejections through [`ApiError`].
//!
//! The stock `Json`/`Query` extractors answer malformed input with axum's
//! own plain-text rejections (422 for bodies). These wrappers convert the
//! rejection instead, so bad payloads come back as a 400 wearing the same
//! `{success: false, message}` envelope as every other error.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};

    use crate::models::order::UpdateOrderStatus;
    use crate::models::product::ProductQuery;

    #[tokio::test]
    async fn unknown_status_in_body_is_a_bad_request() {
        let request = Request::builder()
            .method("PUT")
            .uri("/orders/order_1_a/status")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"status": "bogus"}"#))
            .unwrap();

        let err = ApiJson::<UpdateOrderStatus>::from_request(request, &())
            .await
            .err()
            .expect("unknown status must be rejected");
        assert!(matches!(err, ApiError::JsonBody(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_required_fields_are_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "Asha"}"#))
            .unwrap();

        let err = ApiJson::<crate::models::order::CreateOrder>::from_request(request, &())
            .await
            .err()
            .expect("incomplete order must be rejected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_query_string_is_a_bad_request() {
        let request = Request::builder()
            .uri("/products?limit=plenty")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let err = ApiQuery::<ProductQuery>::from_request_parts(&mut parts, &())
            .await
            .err()
            .expect("non-numeric limit must be rejected");
        assert!(matches!(err, ApiError::QueryString(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
