//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::ShardError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub ShardError);

impl From<ShardError> for AppError {
    fn from(err: ShardError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // 内部詳細はログのみに残し、レスポンスにはexternal_message()を使う
        let status = match &self.0 {
            ShardError::InvalidIdentifier => StatusCode::BAD_REQUEST,
            ShardError::ShardNotFound(_) => StatusCode::NOT_FOUND,
            ShardError::Database(_) | ShardError::MalformedHistory(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let payload = json!({
            "success": false,
            "cause": self.0.external_message(),
        });

        (status, Json(payload)).into_response()
    }
}
