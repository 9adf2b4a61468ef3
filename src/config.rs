//! 環境変数による設定管理
//!
//! 旧名称の環境変数へのフォールバックと非推奨警告ログを提供する。

/// 環境変数を旧名称フォールバック付きで取得する
///
/// 新名称が設定されていればその値を返す。
/// 旧名称のみが設定されている場合はその値を返し、非推奨警告をログに出す。
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// 環境変数をフォールバック・デフォルト値付きで取得する
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// 環境変数をフォールバック付きで取得し、指定した型にパースする
///
/// 未設定またはパース失敗時はデフォルト値を返す。
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// HTTPサーバーの待ち受け設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// バインドするホスト
    pub host: String,
    /// バインドするポート
    pub port: u16,
}

impl ServerConfig {
    /// 環境変数から待ち受け設定を読み込む
    pub fn from_env() -> Self {
        // ホストには旧名称が存在しないため単純参照
        let host = std::env::var("SHARDMON_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = get_env_with_fallback_parse("SHARDMON_PORT", "API_PORT", 6071u16);
        Self { host, port }
    }

    /// バインドアドレス文字列を返す
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// バックグラウンド監視タスクの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// 沈黙判定の応答期間（秒）
    pub sweep_period_secs: u64,
    /// 履歴コンパクションの実行間隔（秒）
    pub compact_interval_secs: u64,
}

impl MonitorConfig {
    /// 環境変数から監視設定を読み込む
    pub fn from_env() -> Self {
        let sweep_period_secs =
            get_env_with_fallback_parse("SHARDMON_RESPONSE_PERIOD", "RESPONSE_PERIOD", 60u64);
        // コンパクション間隔には旧名称が存在しないため単純参照
        let compact_interval_secs = std::env::var("SHARDMON_COMPACT_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600u64);
        Self {
            sweep_period_secs,
            compact_interval_secs,
        }
    }
}

/// データベース接続URLを取得する
///
/// 環境変数 `SHARDMON_DATABASE_PATH`（旧: `DATABASE_PATH`）のパスから
/// `sqlite:` 形式のURLを組み立てる。未設定時は `shards.db` を使う。
pub fn database_url() -> String {
    let path = get_env_with_fallback_or("SHARDMON_DATABASE_PATH", "DATABASE_PATH", "shards.db");
    format!("sqlite:{}", path)
}
