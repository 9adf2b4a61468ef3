//! 型定義

/// 履歴ログ型
pub mod history;

/// シャードレコード型
pub mod shard;

pub use history::{EventSample, HistoryLog, PingSample, Timestamped};
pub use shard::{Heartbeat, ShardRecord, ShardStatus};
