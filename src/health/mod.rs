//! バックグラウンド健全性タスク

/// 無応答シャードの定期降格
pub mod sweeper;

/// 履歴の定期コンパクション
pub mod compactor;

pub use compactor::HistoryCompactor;
pub use sweeper::StalenessSweeper;
