//! シャードCRUD・ハートビート受信ハンドラー

use crate::api::error::AppError;
use crate::types::{Heartbeat, ShardRecord};
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

/// POST /shard/:id - ハートビートを適用
pub async fn update_shard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut heartbeat): Json<Heartbeat>,
) -> Result<Json<Value>, AppError> {
    // ボディのidよりルートパラメータを優先する
    heartbeat.id = id;

    state.registry.try_ingest(&heartbeat).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /shards - ハートビートを一括適用
///
/// 各要素は独立に適用され、検証失敗のある要素は黙ってスキップされる。
pub async fn update_shards(
    State(state): State<AppState>,
    Json(heartbeats): Json<Vec<Heartbeat>>,
) -> Result<Json<Value>, AppError> {
    if state.registry.ingest_batch(&heartbeats).await {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(crate::common::error::ShardError::Database(
            "batch ingest failed".to_string(),
        )
        .into())
    }
}

/// GET /shard/:id - シャードレコードを取得
pub async fn get_shard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShardRecord>, AppError> {
    let record = state
        .registry
        .get(&id)
        .await?
        .ok_or(crate::common::error::ShardError::ShardNotFound(id))?;

    Ok(Json(record))
}

/// DELETE /shard/:id - シャードを履歴ごと削除
pub async fn delete_shard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if state.registry.delete(&id).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(crate::common::error::ShardError::ShardNotFound(id).into())
    }
}

/// DELETE /reset - 全シャードを削除
pub async fn reset(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.registry.reset().await?;
    Ok(Json(json!({ "success": true })))
}
