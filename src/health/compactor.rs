//! 履歴コンパクション
//!
//! 24時間の保持ウィンドウから外れたping/イベント履歴を定期的に
//! 刈り込む。保持衛生のみが目的で、ステータスには一切触れない。

use crate::db::shards as db;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

/// デフォルトの実行間隔（秒）
const DEFAULT_COMPACT_INTERVAL_SECS: u64 = 60 * 60;

/// 履歴の保持ウィンドウ（ミリ秒）
pub const RETENTION_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// 履歴コンパクションタスク
#[derive(Clone)]
pub struct HistoryCompactor {
    /// データベースプール
    pool: SqlitePool,
    /// 実行間隔（秒）
    interval_secs: u64,
}

impl HistoryCompactor {
    /// 新しいコンパクションタスクを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            interval_secs: DEFAULT_COMPACT_INTERVAL_SECS,
        }
    }

    /// 実行間隔を設定
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// バックグラウンドでコンパクションループを開始
    pub fn start(self) {
        tokio::spawn(async move {
            self.monitor_loop().await;
        });
    }

    async fn monitor_loop(&self) {
        let mut timer = interval(Duration::from_secs(self.interval_secs));

        info!(
            interval_secs = self.interval_secs,
            "History compactor started"
        );

        loop {
            timer.tick().await;

            match self.compact_once().await {
                Ok(compacted) if compacted > 0 => {
                    info!(compacted, "Compacted shard histories");
                }
                Ok(_) => {
                    debug!("History compaction found nothing to prune");
                }
                Err(e) => {
                    error!(error = %e, "History compaction failed");
                }
            }
        }
    }

    /// コンパクションを1回実行し、書き換えた行数を返す
    pub async fn compact_once(&self) -> Result<u64, sqlx::Error> {
        let cutoff = chrono::Utc::now().timestamp_millis() - RETENTION_WINDOW_MS;
        db::compact_history(&self.pool, cutoff).await
    }
}
