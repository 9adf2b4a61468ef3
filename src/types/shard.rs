//! シャードレコード型定義

use crate::types::history::{EventSample, HistoryLog, PingSample};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// シャードの状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShardStatus {
    /// 稼働中
    Up,
    /// 停止中
    #[default]
    Down,
}

impl ShardStatus {
    /// ShardStatusを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// ステータス表示用の絵文字
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Up => "🟢",
            Self::Down => "❌",
        }
    }
}

impl FromStr for ShardStatus {
    type Err = std::convert::Infallible;

    // "up"以外はすべてdown扱い
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "up" => Self::Up,
            _ => Self::Down,
        })
    }
}

impl std::fmt::Display for ShardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// シャード1台分のレコード
///
/// ステータスがdownのとき、`ping`・`uptime_since`・`last_update_time`は
/// すべて`None`になる（不変条件）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShardRecord {
    /// シャード識別子（主キー、作成後は不変）
    pub id: String,
    /// 現在のステータス
    pub status: ShardStatus,
    /// 最新のping（ミリ秒）
    pub ping: Option<u32>,
    /// 直近の連続up期間の開始時刻（epochミリ秒）
    pub uptime_since: Option<i64>,
    /// 最後に受理した更新の時刻（epochミリ秒）。Sweeperが参照する
    pub last_update_time: Option<i64>,
    /// 直近24時間のping履歴
    pub ping_history: HistoryLog<PingSample>,
    /// 直近24時間のステータスイベント履歴
    pub event_history: HistoryLog<EventSample>,
    /// 報告元サーバー名（任意メタデータ、last-write-wins）
    pub server: Option<String>,
    /// 報告元バージョン（任意メタデータ、last-write-wins）
    pub version: Option<String>,
}

/// 受信ハートビート
///
/// `id`はルートパラメータから補完される。履歴シード配列は
/// 旧ワイヤ名（`last24hpings`/`last24hevents`）も受け付ける。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Heartbeat {
    /// シャード識別子（空はInvalidIdentifier）
    #[serde(default)]
    pub id: String,
    /// 報告ステータス。未知の文字列はdown扱い
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ShardStatus>,
    /// ping（ミリ秒）。明示的な0は0として保持
    #[serde(default)]
    pub ping: Option<u32>,
    /// サーバー名メタデータ
    #[serde(default)]
    pub server: Option<String>,
    /// バージョンメタデータ
    #[serde(default)]
    pub version: Option<String>,
    /// 作成時に使うping履歴シード
    #[serde(default, alias = "last24hpings")]
    pub ping_history: Option<Vec<PingSample>>,
    /// 作成時に使うイベント履歴シード
    #[serde(default, alias = "last24hevents")]
    pub event_history: Option<Vec<EventSample>>,
}

// 未知のステータス文字列は拒否せず、すべてdownへ畳み込む。
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ShardStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| s.parse().unwrap_or_default()))
}
