//! タイムラインページ生成
//!
//! イベント履歴を固定幅のセグメント列に離散化し、観測期間全体を
//! 1本のバーとして描画する自己完結HTMLを生成する。

use crate::status::format_uptime;
use crate::types::{EventSample, HistoryLog, ShardRecord, ShardStatus};

/// タイムラインのセグメント数（期間によらず固定）
pub const SEGMENT_COUNT: usize = 50;

/// 指定時刻時点のステータスを求める
///
/// タイムスタンプが`stamp`以下の最後のイベントを採用し、
/// イベントが1つもなければdownとみなす。
pub fn status_at(events: &HistoryLog<EventSample>, stamp: i64) -> ShardStatus {
    let mut status = ShardStatus::Down;
    for event in events.iter() {
        if event.t > stamp {
            break;
        }
        status = event.event;
    }
    status
}

/// イベント履歴をセグメント列に離散化する
///
/// `[now - period, now]`を等間隔に刻んだ`SEGMENT_COUNT`個の時点
/// それぞれのステータスを返す。最後のセグメントは`now`ちょうど。
pub fn segment_statuses(
    events: &HistoryLog<EventSample>,
    period_secs: i64,
    now_ms: i64,
) -> Vec<ShardStatus> {
    let period_ms = period_secs.saturating_mul(1000);
    let segment_ms = period_ms / SEGMENT_COUNT as i64;

    (0..SEGMENT_COUNT)
        .map(|i| {
            let stamp = now_ms - period_ms + (i as i64 + 1) * segment_ms;
            status_at(events, stamp)
        })
        .collect()
}

/// タイムラインページ全体を生成する
///
/// シャードは識別子の昇順で描画される。
pub fn render_timeline_page(shards: &[ShardRecord], period_secs: i64, now_ms: i64) -> String {
    let mut ordered: Vec<&ShardRecord> = shards.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut page = String::with_capacity(4096);
    page.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Shard Status</title>\n",
    );
    page.push_str("<style>\n");
    page.push_str("body { background: #1a1a1e; color: #e8e8e8; font-family: sans-serif; margin: 2rem; }\n");
    page.push_str(".shard { margin-bottom: 2rem; }\n");
    page.push_str(".timeline { position: relative; height: 14px; background: #2c2c31; border-radius: 7px; }\n");
    page.push_str(".segment { position: absolute; top: 2px; width: 6px; height: 10px; border-radius: 2px; transform: translateX(-50%); }\n");
    page.push_str(".segment.up { background: #3cb371; }\n");
    page.push_str(".segment.down { background: #d9534f; }\n");
    page.push_str(".labels { display: flex; justify-content: space-between; font-size: 0.8rem; color: #9a9aa2; margin-top: 0.3rem; }\n");
    page.push_str("</style>\n</head>\n<body>\n<h1>Shard Status</h1>\n");

    if ordered.is_empty() {
        page.push_str(&format!(
            "<p>{}</p>\n",
            escape_html(crate::status::NO_SHARDS_MESSAGE)
        ));
    }

    for shard in ordered {
        render_shard_timeline(&mut page, shard, period_secs, now_ms);
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn render_shard_timeline(page: &mut String, shard: &ShardRecord, period_secs: i64, now_ms: i64) {
    page.push_str("<div class=\"shard\">\n");
    page.push_str(&format!(
        "<h2>Shard {} {}</h2>\n",
        escape_html(&shard.id),
        shard.status.emoji()
    ));

    page.push_str("<div class=\"timeline\">\n");
    for (i, status) in segment_statuses(&shard.event_history, period_secs, now_ms)
        .into_iter()
        .enumerate()
    {
        // マーカー位置は (index+1)/(N+1) を百分率にしたもの
        let position = (i + 1) as f64 / (SEGMENT_COUNT + 1) as f64 * 100.0;
        page.push_str(&format!(
            "<span class=\"segment {}\" style=\"left: {:.2}%\"></span>\n",
            status.as_str(),
            position
        ));
    }
    page.push_str("</div>\n");

    page.push_str(&format!(
        "<div class=\"labels\"><span>{} ago</span><span>now</span></div>\n",
        format_uptime(period_secs)
    ));
    page.push_str("</div>\n");
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
