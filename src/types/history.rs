//! 履歴ログ型定義
//!
//! ping/イベント履歴を保持する追記専用ログ。
//! ディスク上の表現（JSON配列）とは独立した型として扱う。

use crate::types::shard::ShardStatus;
use serde::{Deserialize, Serialize};

/// タイムスタンプを持つ履歴サンプル
pub trait Timestamped {
    /// サンプルの記録時刻（epochミリ秒）
    fn timestamp(&self) -> i64;
}

/// ping履歴の1サンプル
///
/// ワイヤ形式は `{"t": <ms>, "ping": <ms|null>}`。
/// up更新時にpingが省略された場合は`ping: null`として記録される。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingSample {
    /// 記録時刻（epochミリ秒）
    pub t: i64,
    /// ping値（ミリ秒）。明示的な0は保持される
    pub ping: Option<u32>,
}

/// イベント履歴の1サンプル
///
/// ワイヤ形式は `{"t": <ms>, "event": "up"|"down"}`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSample {
    /// 記録時刻（epochミリ秒）
    pub t: i64,
    /// 遷移後のステータス
    pub event: ShardStatus,
}

impl Timestamped for PingSample {
    fn timestamp(&self) -> i64 {
        self.t
    }
}

impl Timestamped for EventSample {
    fn timestamp(&self) -> i64 {
        self.t
    }
}

/// 時刻順の追記専用履歴ログ
///
/// 末尾への追記と先頭からの期限切れ削除のみを許可し、
/// エントリの並べ替えは行わない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HistoryLog<S> {
    samples: Vec<S>,
}

impl<S> Default for HistoryLog<S> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<S> HistoryLog<S> {
    /// 空のログを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のサンプル列からログを作成（呼び出し側提供のシード用）
    pub fn from_samples(samples: Vec<S>) -> Self {
        Self { samples }
    }

    /// サンプルを末尾に追記
    pub fn push(&mut self, sample: S) {
        self.samples.push(sample);
    }

    /// サンプル数
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// ログが空かどうか
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// サンプルを時刻順にイテレート
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.samples.iter()
    }

    /// サンプル列への参照
    pub fn as_slice(&self) -> &[S] {
        &self.samples
    }
}

impl<S: Timestamped> HistoryLog<S> {
    /// `cutoff`より古いサンプルを先頭から削除（境界は保持）
    pub fn retain_since(&mut self, cutoff: i64) {
        self.samples.retain(|s| s.timestamp() >= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(t: i64, event: ShardStatus) -> EventSample {
        EventSample { t, event }
    }

    #[test]
    fn test_retain_since_keeps_boundary_entry() {
        let mut log = HistoryLog::from_samples(vec![
            event(100, ShardStatus::Up),
            event(200, ShardStatus::Down),
            event(300, ShardStatus::Up),
        ]);

        log.retain_since(200);

        assert_eq!(log.len(), 2);
        assert_eq!(log.as_slice()[0].t, 200);
        assert_eq!(log.as_slice()[1].t, 300);
    }

    #[test]
    fn test_retain_since_noop_when_all_recent() {
        let mut log = HistoryLog::from_samples(vec![event(500, ShardStatus::Up)]);
        log.retain_since(100);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_push_preserves_order() {
        let mut log = HistoryLog::new();
        log.push(event(1, ShardStatus::Up));
        log.push(event(2, ShardStatus::Down));

        let times: Vec<i64> = log.iter().map(|s| s.t).collect();
        assert_eq!(times, vec![1, 2]);
    }

    #[test]
    fn test_event_sample_wire_format() {
        let json = serde_json::to_string(&event(42, ShardStatus::Down)).unwrap();
        assert_eq!(json, r#"{"t":42,"event":"down"}"#);
    }

    #[test]
    fn test_ping_sample_wire_format() {
        let sample = PingSample {
            t: 42,
            ping: Some(0),
        };
        assert_eq!(serde_json::to_string(&sample).unwrap(), r#"{"t":42,"ping":0}"#);

        let absent = PingSample { t: 42, ping: None };
        assert_eq!(
            serde_json::to_string(&absent).unwrap(),
            r#"{"t":42,"ping":null}"#
        );
    }

    #[test]
    fn test_history_log_serializes_as_plain_array() {
        let log = HistoryLog::from_samples(vec![event(1, ShardStatus::Up)]);
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"[{"t":1,"event":"up"}]"#);

        let parsed: HistoryLog<EventSample> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log);
    }
}
