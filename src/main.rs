//! Shard monitor server entry point

use clap::Parser;
use shardmon::config::{self, MonitorConfig, ServerConfig};
use shardmon::health::{HistoryCompactor, StalenessSweeper};
use shardmon::registry::ShardRegistry;
use shardmon::{db, logging, server, AppState};
use tracing::info;

/// コマンドライン引数
///
/// 未指定の項目は環境変数（およびデフォルト値）にフォールバックする。
#[derive(Debug, Parser)]
#[command(name = "shardmon", version, about = "Shard liveness monitoring service")]
struct Cli {
    /// バインドするホスト
    #[arg(long)]
    host: Option<String>,

    /// バインドするポート
    #[arg(long)]
    port: Option<u16>,

    /// SQLiteデータベースファイルのパス
    #[arg(long)]
    database: Option<String>,

    /// 沈黙判定の応答期間（秒）
    #[arg(long)]
    period: Option<u64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init().expect("failed to initialize logging");

    info!("Shard monitor v{}", env!("CARGO_PKG_VERSION"));

    let mut server_config = ServerConfig::from_env();
    if let Some(host) = cli.host {
        server_config.host = host;
    }
    if let Some(port) = cli.port {
        server_config.port = port;
    }

    let mut monitor_config = MonitorConfig::from_env();
    if let Some(period) = cli.period {
        monitor_config.sweep_period_secs = period;
    }

    let database_url = cli
        .database
        .map(|path| format!("sqlite:{}", path))
        .unwrap_or_else(config::database_url);

    let db_pool = db::migrations::initialize_database(&database_url)
        .await
        .expect("Failed to initialize database");

    let registry = ShardRegistry::new(db_pool.clone());

    // 沈黙シャードの一括降格とハートビート履歴の定期削減をバックグラウンドで開始
    StalenessSweeper::new(db_pool.clone())
        .with_period(monitor_config.sweep_period_secs)
        .start();
    HistoryCompactor::new(db_pool.clone())
        .with_interval(monitor_config.compact_interval_secs)
        .start();

    let state = AppState { registry, db_pool };

    server::run(state, &server_config.bind_addr())
        .await
        .expect("Server error");
}
