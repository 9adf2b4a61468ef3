//! ステータスレンダリング
//!
//! シャードレコードから人間可読のサマリー行とタイムラインページを
//! 生成する読み取り専用ロジック。

/// タイムラインページ生成
pub mod timeline;

use crate::types::{ShardRecord, ShardStatus};

/// シャード未登録時のメッセージ
pub const NO_SHARDS_MESSAGE: &str =
    "No shards listed... Start sending data to the api via the /shard endpoint!";

/// ping値の平均（床関数）。空なら0
pub fn average(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    (sum / values.len() as u64) as u32
}

/// 稼働秒数を `"<days>d <hours>h <minutes>m <seconds>s"` 形式に整形
pub fn format_uptime(mut seconds: i64) -> String {
    if seconds < 0 {
        seconds = 0;
    }
    let days = seconds / 86_400;
    seconds %= 86_400;
    let hours = seconds / 3_600;
    seconds %= 3_600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

/// 全シャードのサマリー行を生成
///
/// シャードが1台だけの場合は単独表示名（"Bot Status"）になる。
pub fn render_summary(shards: &[ShardRecord], now_ms: i64) -> Vec<String> {
    if shards.is_empty() {
        return vec![NO_SHARDS_MESSAGE.to_string()];
    }

    if let [only] = shards {
        return vec![shard_line(only, true, now_ms)];
    }

    shards
        .iter()
        .map(|shard| shard_line(shard, false, now_ms))
        .collect()
}

/// 1シャード分のサマリー行
///
/// up時のみ稼働時間・ping・24h平均pingの詳細を付加する。
fn shard_line(shard: &ShardRecord, solo: bool, now_ms: i64) -> String {
    let name = if solo {
        "Bot Status".to_string()
    } else {
        format!("Shard {}", shard.id)
    };
    let version = shard.version.as_deref().unwrap_or("unknown");

    let mut line = format!(
        "`v{}` - {} &nbsp; **status:** {}",
        version,
        name,
        shard.status.emoji()
    );

    if shard.status == ShardStatus::Up {
        let uptime = match shard.uptime_since {
            Some(since) => format_uptime((now_ms - since) / 1000),
            None => "none".to_string(),
        };
        // 未報告のpingを0msと混同させない
        let ping = match shard.ping {
            Some(p) => format!("{}ms", p),
            None => "unknown".to_string(),
        };
        let pings: Vec<u32> = shard.ping_history.iter().filter_map(|s| s.ping).collect();
        line.push_str(&format!(
            " **up:** `{}` **ping:** `{}` **24h average ping:** `{}ms`",
            uptime,
            ping,
            average(&pings)
        ));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventSample, HistoryLog, PingSample};

    fn up_shard(id: &str, now: i64) -> ShardRecord {
        ShardRecord {
            id: id.to_string(),
            status: ShardStatus::Up,
            ping: Some(30),
            uptime_since: Some(now - 90_061_000), // 1d 1h 1m 1s
            last_update_time: Some(now),
            ping_history: HistoryLog::from_samples(vec![
                PingSample {
                    t: now - 2_000,
                    ping: Some(10),
                },
                PingSample {
                    t: now - 1_000,
                    ping: Some(20),
                },
                PingSample {
                    t: now,
                    ping: Some(30),
                },
            ]),
            event_history: HistoryLog::from_samples(vec![EventSample {
                t: now,
                event: ShardStatus::Up,
            }]),
            server: None,
            version: Some("2.1.0".to_string()),
        }
    }

    fn down_shard(id: &str) -> ShardRecord {
        ShardRecord {
            id: id.to_string(),
            status: ShardStatus::Down,
            ping: None,
            uptime_since: None,
            last_update_time: None,
            ping_history: HistoryLog::new(),
            event_history: HistoryLog::new(),
            server: None,
            version: Some("2.1.0".to_string()),
        }
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0);
    }

    #[test]
    fn test_average_floors_mean() {
        assert_eq!(average(&[10, 20, 30]), 20);
        assert_eq!(average(&[1, 2]), 1);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0d 0h 0m 0s");
        assert_eq!(format_uptime(61), "0d 0h 1m 1s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }

    #[test]
    fn test_render_summary_empty_store() {
        assert_eq!(render_summary(&[], 0), vec![NO_SHARDS_MESSAGE.to_string()]);
    }

    #[test]
    fn test_render_summary_solo_shard_named_bot_status() {
        let now = 1_000_000_000;
        let lines = render_summary(&[up_shard("0", now)], now);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Bot Status"));
        assert!(!lines[0].contains("Shard 0"));
        assert!(lines[0].contains("`v2.1.0`"));
        assert!(lines[0].contains("🟢"));
        assert!(lines[0].contains("**up:** `1d 1h 1m 1s`"));
        assert!(lines[0].contains("**ping:** `30ms`"));
        assert!(lines[0].contains("**24h average ping:** `20ms`"));
    }

    #[test]
    fn test_render_summary_multiple_shards_named_by_id() {
        let now = 1_000_000_000;
        let lines = render_summary(&[up_shard("0", now), down_shard("1")], now);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Shard 0"));
        assert!(lines[1].contains("Shard 1"));
    }

    #[test]
    fn test_down_shard_line_has_no_detail_block() {
        let lines = render_summary(&[down_shard("0"), down_shard("1")], 0);

        assert!(lines[0].contains("❌"));
        assert!(!lines[0].contains("**up:**"));
        assert!(!lines[0].contains("ping:"));
    }

    #[test]
    fn test_up_shard_with_absent_ping_is_not_rendered_as_zero() {
        let now = 1_000_000_000;
        let mut shard = up_shard("0", now);
        shard.ping = None;

        let line = render_summary(&[shard], now).remove(0);
        assert!(line.contains("**ping:** `unknown`"));
        assert!(!line.contains("`0ms`"));
    }

    #[test]
    fn test_average_ignores_absent_pings() {
        let now = 1_000_000_000;
        let mut shard = up_shard("0", now);
        shard.ping_history = HistoryLog::from_samples(vec![
            PingSample {
                t: now,
                ping: Some(10),
            },
            PingSample { t: now, ping: None },
            PingSample {
                t: now,
                ping: Some(30),
            },
        ]);

        let line = render_summary(&[shard], now).remove(0);
        assert!(line.contains("**24h average ping:** `20ms`"));
    }
}
