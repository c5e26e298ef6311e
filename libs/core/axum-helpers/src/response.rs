//! Success envelopes shared by every endpoint.
//!
//! ```json
//! { "error": false, "message": "success get user data", "data": { ... } }
//! ```

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success body carrying a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub error: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Success body with nothing but a message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub error: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// One page of a listing plus the paging metadata the client asked for.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub error: bool,
    pub message: String,
    pub data: Vec<T>,
    /// Number of matching rows across all pages
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(message: impl Into<String>, data: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
            total,
            page,
            per_page,
        }
    }
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_response_shape() {
        let body = serde_json::to_value(ApiResponse::new("success get user data", json!({"id": 1})))
            .unwrap();
        assert_eq!(
            body,
            json!({"error": false, "message": "success get user data", "data": {"id": 1}})
        );
    }

    #[test]
    fn test_paginated_response_shape() {
        let body =
            serde_json::to_value(PaginatedResponse::new("success get users data", vec![1, 2], 12, 2, 2))
                .unwrap();
        assert_eq!(body["data"], json!([1, 2]));
        assert_eq!(body["total"], 12);
        assert_eq!(body["page"], 2);
        assert_eq!(body["per_page"], 2);
        assert_eq!(body["error"], false);
    }
}
