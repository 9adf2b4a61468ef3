//! ロギング初期化
//!
//! `RUST_LOG` による上書きを許しつつ、デフォルトでは `shardmon=info` で
//! tracing-subscriberを初期化する。

use tracing_subscriber::EnvFilter;

/// グローバルのtracingサブスクライバーを初期化する
///
/// 二重初期化はエラーとして返す。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shardmon=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()?;

    Ok(())
}
