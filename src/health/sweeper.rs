//! 無応答シャード監視
//!
//! 一定周期でハートビートが途絶えたシャードを一括でdownへ降格する。

use crate::db::shards as db;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

/// デフォルトの掃引周期（秒）。閾値も同じ値を使う
const DEFAULT_SWEEP_PERIOD_SECS: u64 = 60;

/// 無応答シャード掃引タスク
///
/// 周期Pごとに1回、`last_update_time`がP*1000ミリ秒より古い
/// シャードを単一のUPDATE文でdownへ降格する。
#[derive(Clone)]
pub struct StalenessSweeper {
    /// データベースプール
    pool: SqlitePool,
    /// 掃引周期（秒）＝無応答判定の閾値
    period_secs: u64,
}

impl StalenessSweeper {
    /// 新しい掃引タスクを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            period_secs: DEFAULT_SWEEP_PERIOD_SECS,
        }
    }

    /// 掃引周期を設定
    pub fn with_period(mut self, period_secs: u64) -> Self {
        self.period_secs = period_secs;
        self
    }

    /// バックグラウンドで掃引ループを開始
    pub fn start(self) {
        tokio::spawn(async move {
            self.monitor_loop().await;
        });
    }

    /// 掃引ループ
    ///
    /// tick失敗は致命傷にせず、ログに残して次のtickで再試行する。
    async fn monitor_loop(&self) {
        let mut timer = interval(Duration::from_secs(self.period_secs));

        info!(period_secs = self.period_secs, "Staleness sweeper started");

        loop {
            timer.tick().await;

            match self.sweep_once().await {
                Ok(demoted) if demoted > 0 => {
                    info!(demoted, "Demoted silent shards to down");
                }
                Ok(_) => {
                    debug!("Staleness sweep found no silent shards");
                }
                Err(e) => {
                    error!(error = %e, "Staleness sweep failed");
                }
            }
        }
    }

    /// 掃引を1回実行し、降格したシャード数を返す
    pub async fn sweep_once(&self) -> Result<u64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();
        let threshold_ms = (self.period_secs as i64) * 1000;
        db::sweep_stale(&self.pool, now, threshold_ms).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;
    use crate::types::{EventSample, HistoryLog, PingSample, ShardRecord, ShardStatus};

    fn stale_record(id: &str, last_update: i64) -> ShardRecord {
        ShardRecord {
            id: id.to_string(),
            status: ShardStatus::Up,
            ping: Some(10),
            uptime_since: Some(last_update),
            last_update_time: Some(last_update),
            ping_history: HistoryLog::from_samples(vec![PingSample {
                t: last_update,
                ping: Some(10),
            }]),
            event_history: HistoryLog::from_samples(vec![EventSample {
                t: last_update,
                event: ShardStatus::Up,
            }]),
            server: None,
            version: None,
        }
    }

    #[tokio::test]
    async fn test_sweeper_defaults() {
        let sweeper = StalenessSweeper::new(test_db_pool().await);
        assert_eq!(sweeper.period_secs, DEFAULT_SWEEP_PERIOD_SECS);
    }

    #[tokio::test]
    async fn test_sweeper_with_period() {
        let sweeper = StalenessSweeper::new(test_db_pool().await).with_period(5);
        assert_eq!(sweeper.period_secs, 5);
    }

    #[tokio::test]
    async fn test_sweep_once_demotes_stale_shard() {
        let pool = test_db_pool().await;
        let now = chrono::Utc::now().timestamp_millis();

        // 61秒前のハートビート → 周期60秒で降格対象
        db::insert_shard(&pool, &stale_record("stale", now - 61_000))
            .await
            .unwrap();
        db::insert_shard(&pool, &stale_record("fresh", now))
            .await
            .unwrap();

        let sweeper = StalenessSweeper::new(pool.clone()).with_period(60);
        let demoted = sweeper.sweep_once().await.unwrap();
        assert_eq!(demoted, 1);

        let stale = db::get_shard(&pool, "stale").await.unwrap().unwrap();
        assert_eq!(stale.status, ShardStatus::Down);
        assert_eq!(
            stale.event_history.as_slice().last().unwrap().event,
            ShardStatus::Down
        );

        let fresh = db::get_shard(&pool, "fresh").await.unwrap().unwrap();
        assert_eq!(fresh.status, ShardStatus::Up);
    }
}
