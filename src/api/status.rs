//! ステータス表示・pingハンドラー

use crate::api::error::AppError;
use crate::status::{render_summary, timeline};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

/// デフォルトの観測期間（秒）＝24時間
const DEFAULT_PERIOD_SECS: i64 = 24 * 60 * 60;

/// 観測期間の上限（秒）＝1年。ミリ秒換算がi64に収まる範囲に抑える
const MAX_PERIOD_SECS: i64 = 365 * 24 * 60 * 60;

/// GET /status のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// 観測期間（秒）
    #[serde(default = "default_period")]
    pub period: i64,
}

fn default_period() -> i64 {
    DEFAULT_PERIOD_SECS
}

/// GET /ping - 死活確認
///
/// 監視側のキャッシュを防ぐためno-storeヘッダを付ける。
pub async fn ping() -> impl IntoResponse {
    (
        [
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate",
            ),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(json!({ "timestamp": Utc::now().timestamp_millis() })),
    )
}

/// GET /status - タイムラインページ
pub async fn status_page(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Html<String>, AppError> {
    let period = query.period.clamp(1, MAX_PERIOD_SECS);
    let shards = state.registry.list().await?;
    let now = Utc::now().timestamp_millis();

    Ok(Html(timeline::render_timeline_page(&shards, period, now)))
}

/// GET /status/summary - シャードごとのサマリー行
pub async fn status_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let shards = state.registry.list().await?;
    let now = Utc::now().timestamp_millis();

    Ok(Json(render_summary(&shards, now)))
}
