//! エラー型定義
//!
//! 統一エラー型（thiserror使用）。コアの公開操作は例外でクラッシュせず、
//! 必ず明示的な成功/失敗シグナルを返す。

use thiserror::Error;

/// shardmon統一エラー型
#[derive(Debug, Error)]
pub enum ShardError {
    /// ハートビートのid欠落・空文字
    #[error("Shard identifier is missing or empty")]
    InvalidIdentifier,

    /// 指定idのシャードが存在しない
    #[error("Shard not found: {0}")]
    ShardNotFound(String),

    /// 永続化層の障害
    #[error("Database error: {0}")]
    Database(String),

    /// 保存済み履歴のパース失敗（対象シャードのみに隔離される）
    #[error("Malformed history for shard {0}")]
    MalformedHistory(String),
}

impl ShardError {
    /// 外部クライアント向けの安全なエラーメッセージを返す
    ///
    /// 内部障害の詳細（SQL・ファイルパス等）は露出させず、
    /// ログ側にのみ残す。
    pub fn external_message(&self) -> String {
        match self {
            Self::InvalidIdentifier | Self::ShardNotFound(_) => self.to_string(),
            Self::Database(_) | Self::MalformedHistory(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<sqlx::Error> for ShardError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
