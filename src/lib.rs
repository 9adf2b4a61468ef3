//! シャード死活監視サービス
//!
//! Discordボットなどの分散シャードからハートビートを受け取り、
//! 稼働状態・ping・24時間分の履歴をSQLiteで管理するHTTPサービス。

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// 共通型・エラー定義
pub mod common;

/// 環境変数による設定管理
pub mod config;

/// データベースアクセス層
pub mod db;

/// バックグラウンド監視タスク
pub mod health;

/// ロギング初期化
pub mod logging;

/// シャード登録管理
pub mod registry;

/// HTTPサーバー起動
pub mod server;

/// ステータス表示の生成
pub mod status;

/// ドメイン型定義
pub mod types;

use registry::ShardRegistry;
use sqlx::SqlitePool;

/// アプリケーション全体の共有状態
#[derive(Clone)]
pub struct AppState {
    /// シャードレジストリ
    pub registry: ShardRegistry,
    /// データベース接続プール
    pub db_pool: SqlitePool,
}
