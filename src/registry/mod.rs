//! シャード登録管理
//!
//! ハートビートの取り込みとシャードレコードのCRUDをまとめた
//! ファサード。状態遷移の読み出し→判定→書き込みはシャード単位の
//! ロックで直列化し、同一idへの同時更新による履歴喪失を防ぐ。

use crate::common::error::ShardError;
use crate::db::shards as db;
use crate::types::{EventSample, Heartbeat, HistoryLog, PingSample, ShardRecord, ShardStatus};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// シャードレジストリ
#[derive(Clone)]
pub struct ShardRegistry {
    /// データベースプール
    pool: SqlitePool,
    /// シャードidごとの更新ロック
    update_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ShardRegistry {
    /// SQLiteプールからレジストリを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            update_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// データベースプールへの参照
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.update_locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// ハートビートを適用する
    ///
    /// 障害は呼び出し元へ伝播させず、ログに残して`false`を返す。
    pub async fn ingest(&self, heartbeat: &Heartbeat) -> bool {
        match self.try_ingest(heartbeat).await {
            Ok(()) => true,
            Err(e) => {
                error!(shard_id = %heartbeat.id, error = %e, "Failed to apply heartbeat");
                false
            }
        }
    }

    /// ハートビートを適用する（エラー詳細付き）
    pub async fn try_ingest(&self, heartbeat: &Heartbeat) -> Result<(), ShardError> {
        if heartbeat.id.is_empty() {
            return Err(ShardError::InvalidIdentifier);
        }

        let lock = self.lock_for(&heartbeat.id).await;
        let _guard = lock.lock().await;

        let now = Utc::now().timestamp_millis();
        self.apply(heartbeat, now).await
    }

    /// ハートビート列を適用する
    ///
    /// 各要素は独立に適用され、1件の不正があっても残りは処理される。
    /// id欠落などの検証失敗は許容し、ストア層の障害があった場合のみ
    /// `false`を返す。
    pub async fn ingest_batch(&self, heartbeats: &[Heartbeat]) -> bool {
        let mut store_ok = true;

        for heartbeat in heartbeats {
            match self.try_ingest(heartbeat).await {
                Ok(()) => {}
                Err(ShardError::InvalidIdentifier) => {
                    warn!("Skipping batch heartbeat without id");
                }
                Err(e) => {
                    error!(shard_id = %heartbeat.id, error = %e, "Batch heartbeat failed");
                    store_ok = false;
                }
            }
        }

        store_ok
    }

    /// ハートビートを指定時刻で適用（状態遷移の本体）
    async fn apply(&self, heartbeat: &Heartbeat, now: i64) -> Result<(), ShardError> {
        let status = heartbeat.status.unwrap_or_default();

        match db::get_shard(&self.pool, &heartbeat.id).await? {
            None => {
                let record = Self::build_new_record(heartbeat, status, now);
                db::insert_shard(&self.pool, &record).await?;
                debug!(shard_id = %record.id, status = %record.status, "Shard record created");
            }
            Some(mut record) => {
                if status == ShardStatus::Up {
                    record.status = ShardStatus::Up;
                    record.ping = heartbeat.ping;
                    record.ping_history.push(PingSample {
                        t: now,
                        ping: heartbeat.ping,
                    });
                    record.event_history.push(EventSample {
                        t: now,
                        event: ShardStatus::Up,
                    });
                    // 連続稼働の開始時刻は維持し、down→up遷移時のみ設定
                    if record.uptime_since.is_none() {
                        record.uptime_since = Some(now);
                    }
                    record.last_update_time = Some(now);
                } else {
                    record.status = ShardStatus::Down;
                    record.ping = None;
                    record.uptime_since = None;
                    record.last_update_time = None;
                    record.event_history.push(EventSample {
                        t: now,
                        event: ShardStatus::Down,
                    });
                }

                if let Some(server) = &heartbeat.server {
                    record.server = Some(server.clone());
                }
                if let Some(version) = &heartbeat.version {
                    record.version = Some(version.clone());
                }

                db::update_shard(&self.pool, &record).await?;
                debug!(shard_id = %record.id, status = %record.status, "Shard record updated");
            }
        }

        Ok(())
    }

    fn build_new_record(heartbeat: &Heartbeat, status: ShardStatus, now: i64) -> ShardRecord {
        let up = status == ShardStatus::Up;

        let ping_history = match &heartbeat.ping_history {
            Some(seed) => HistoryLog::from_samples(seed.clone()),
            None if up => HistoryLog::from_samples(vec![PingSample {
                t: now,
                ping: heartbeat.ping,
            }]),
            None => HistoryLog::new(),
        };

        let event_history = match &heartbeat.event_history {
            Some(seed) => HistoryLog::from_samples(seed.clone()),
            None => HistoryLog::from_samples(vec![EventSample {
                t: now,
                event: status,
            }]),
        };

        ShardRecord {
            id: heartbeat.id.clone(),
            status,
            ping: if up { heartbeat.ping } else { None },
            uptime_since: up.then_some(now),
            last_update_time: up.then_some(now),
            ping_history,
            event_history,
            server: heartbeat.server.clone(),
            version: heartbeat.version.clone(),
        }
    }

    /// シャードを取得
    pub async fn get(&self, id: &str) -> Result<Option<ShardRecord>, ShardError> {
        Ok(db::get_shard(&self.pool, id).await?)
    }

    /// 全シャードを識別子の昇順で取得
    pub async fn list(&self) -> Result<Vec<ShardRecord>, ShardError> {
        Ok(db::list_shards(&self.pool).await?)
    }

    /// シャードを履歴ごと削除。存在した場合にtrue
    ///
    /// 当該idの更新ロックも破棄し、ロックマップが削除済みidで
    /// 際限なく膨らまないようにする。
    pub async fn delete(&self, id: &str) -> Result<bool, ShardError> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let deleted = db::delete_shard(&self.pool, id).await?;
        self.update_locks.lock().await.remove(id);
        Ok(deleted)
    }

    /// 全シャードを削除。更新ロックもすべて破棄する
    pub async fn reset(&self) -> Result<(), ShardError> {
        db::clear_shards(&self.pool).await?;
        self.update_locks.lock().await.clear();
        Ok(())
    }
}
