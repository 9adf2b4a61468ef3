//! シャードデータベース操作
//!
//! すべての操作はパラメータ化クエリで行い、1回の呼び出しは
//! 完全に適用されるか失敗するかのどちらかになる。

use crate::types::{EventSample, HistoryLog, PingSample, ShardRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

/// shardsテーブルの1行
#[derive(Debug, sqlx::FromRow)]
struct ShardRow {
    id: String,
    status: String,
    ping: Option<i64>,
    uptime_since: Option<i64>,
    last_update_time: Option<i64>,
    ping_history: String,
    event_history: String,
    server: Option<String>,
    version: Option<String>,
}

impl From<ShardRow> for ShardRecord {
    fn from(row: ShardRow) -> Self {
        let ping_history = parse_history(&row.id, "ping_history", &row.ping_history);
        let event_history = parse_history(&row.id, "event_history", &row.event_history);

        ShardRecord {
            status: row.status.parse().unwrap_or_default(),
            ping: row.ping.and_then(|v| u32::try_from(v).ok()),
            uptime_since: row.uptime_since,
            last_update_time: row.last_update_time,
            ping_history,
            event_history,
            server: row.server,
            version: row.version,
            id: row.id,
        }
    }
}

/// 保存済み履歴JSONをパースする
///
/// パース失敗は当該シャードに隔離し、空履歴として扱う。
/// 呼び出し全体は中断しない。
fn parse_history<S: DeserializeOwned>(id: &str, column: &str, raw: &str) -> HistoryLog<S> {
    match serde_json::from_str(raw) {
        Ok(log) => log,
        Err(e) => {
            warn!(
                shard_id = %id,
                column = column,
                error = %e,
                "Malformed stored history, treating as empty"
            );
            HistoryLog::new()
        }
    }
}

fn history_json<S: Serialize>(log: &HistoryLog<S>) -> String {
    serde_json::to_string(log).unwrap_or_else(|_| "[]".to_string())
}

/// IDでシャードを取得
pub async fn get_shard(pool: &SqlitePool, id: &str) -> Result<Option<ShardRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, ShardRow>(
        r#"
        SELECT id, status, ping, uptime_since, last_update_time,
               ping_history, event_history, server, version
        FROM shards
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// シャード一覧を識別子の昇順で取得
pub async fn list_shards(pool: &SqlitePool) -> Result<Vec<ShardRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ShardRow>(
        r#"
        SELECT id, status, ping, uptime_since, last_update_time,
               ping_history, event_history, server, version
        FROM shards
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// シャードレコードを新規登録
pub async fn insert_shard(pool: &SqlitePool, record: &ShardRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO shards (
            id, status, ping, uptime_since, last_update_time,
            ping_history, event_history, server, version
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(record.status.as_str())
    .bind(record.ping.map(|v| v as i64))
    .bind(record.uptime_since)
    .bind(record.last_update_time)
    .bind(history_json(&record.ping_history))
    .bind(history_json(&record.event_history))
    .bind(&record.server)
    .bind(&record.version)
    .execute(pool)
    .await?;

    Ok(())
}

/// シャードレコードを上書き更新
pub async fn update_shard(pool: &SqlitePool, record: &ShardRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE shards SET
            status = ?, ping = ?, uptime_since = ?, last_update_time = ?,
            ping_history = ?, event_history = ?, server = ?, version = ?
        WHERE id = ?
        "#,
    )
    .bind(record.status.as_str())
    .bind(record.ping.map(|v| v as i64))
    .bind(record.uptime_since)
    .bind(record.last_update_time)
    .bind(history_json(&record.ping_history))
    .bind(history_json(&record.event_history))
    .bind(&record.server)
    .bind(&record.version)
    .bind(&record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// シャードを削除
pub async fn delete_shard(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shards WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 全シャードを削除（フルリセット）
pub async fn clear_shards(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM shards").execute(pool).await?;
    Ok(())
}

/// 無応答シャードを一括でdownへ降格
///
/// `last_update_time`が非NULLかつ閾値より古いシャードを対象に、
/// ステータスクリアとdownイベント追記を単一のUPDATE文で行う。
/// 並行読み取りから部分的な掃引結果が見えることはない。
/// 壊れた履歴JSONを持つ行は空履歴として扱い、掃引全体を失敗させない。
pub async fn sweep_stale(
    pool: &SqlitePool,
    now_ms: i64,
    threshold_ms: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE shards
        SET status = 'down',
            ping = NULL,
            uptime_since = NULL,
            last_update_time = NULL,
            event_history = json_insert(
                CASE WHEN json_valid(event_history) THEN event_history ELSE '[]' END,
                '$[#]', json_object('t', ?1, 'event', 'down'))
        WHERE last_update_time IS NOT NULL
          AND (?1 - last_update_time) > ?2
        "#,
    )
    .bind(now_ms)
    .bind(threshold_ms)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// 全シャードの履歴を保持期限で刈り込む
///
/// `cutoff_ms`以上のタイムスタンプを持つエントリのみ残し（境界含む）、
/// 変化のあった行だけを書き戻す。読み取りと書き戻しは同一
/// トランザクション内で行い、並行する追記を古いコピーで潰さない。
/// ステータス系カラムには触れない。
pub async fn compact_history(pool: &SqlitePool, cutoff_ms: i64) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id, ping_history, event_history FROM shards",
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut compacted = 0u64;

    for (id, pings_raw, events_raw) in rows {
        let mut pings: HistoryLog<PingSample> = parse_history(&id, "ping_history", &pings_raw);
        let mut events: HistoryLog<EventSample> = parse_history(&id, "event_history", &events_raw);

        let before = (pings.len(), events.len());
        pings.retain_since(cutoff_ms);
        events.retain_since(cutoff_ms);

        if (pings.len(), events.len()) == before {
            continue;
        }

        sqlx::query("UPDATE shards SET ping_history = ?, event_history = ? WHERE id = ?")
            .bind(history_json(&pings))
            .bind(history_json(&events))
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        compacted += 1;
    }

    tx.commit().await?;

    Ok(compacted)
}
