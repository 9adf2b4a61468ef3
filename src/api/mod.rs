//! REST APIハンドラー

/// エラーレスポンス型
pub mod error;

/// シャードCRUD・ハートビート受信
pub mod shards;

/// ステータス表示・ping
pub mod status;

use crate::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを構築
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(status::ping))
        .route(
            "/shard/:id",
            post(shards::update_shard)
                .get(shards::get_shard)
                .delete(shards::delete_shard),
        )
        .route("/shards", post(shards::update_shards))
        .route("/status", get(status::status_page))
        .route("/status/summary", get(status::status_summary))
        .route("/reset", delete(shards::reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
