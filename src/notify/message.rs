// src/notify/message.rs
use crate::core::sanitize::escape_html;
use crate::diff::ChangeRecord;
use crate::error::HarvestError;

use super::Message;

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Alert listing every changed item (prev/cur rank, discount, price, link).
pub fn change_alert(to: &[String], checked_at: &str, changes: &[ChangeRecord]) -> Message {
    let mut rows = String::new();
    for c in changes {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"{}\" target=\"_blank\">open</a></td></tr>\n",
            opt(c.rank_prev),
            opt(c.rank_cur),
            escape_html(&c.discount_text_prev),
            escape_html(&c.discount_text_cur),
            escape_html(&c.price_text_prev),
            escape_html(&c.price_text_cur),
            escape_html(&c.link),
        ));
    }

    let body = format!(
        "<p><b>Price / discount change detected</b></p>\n\
         <p>Checked at: <b>{}</b></p>\n\
         <p>Attached: changed items only</p>\n\
         <table border=\"1\" cellpadding=\"6\" cellspacing=\"0\" style=\"border-collapse:collapse; font-size:13px;\">\n\
         <thead><tr><th>Prev Rank</th><th>Cur Rank</th><th>Prev Discount</th><th>Cur Discount</th>\
         <th>Prev Price</th><th>Cur Price</th><th>Link</th></tr></thead>\n\
         <tbody>\n{rows}</tbody>\n</table>\n",
        escape_html(checked_at),
    );

    let subject = format!("[price change] {checked_at} ({} items)", changes.len());
    Message::new(to, subject, body)
}

pub fn snapshot_report(to: &[String], checked_at: &str, collected: usize, target: usize, state_key: &str) -> Message {
    let body = format!(
        "<p><b>Snapshot complete</b></p>\n\
         <p>Time: <b>{}</b></p>\n\
         <p>Collected: <b>{collected}</b> (target {target})</p>\n\
         <p>State key: <b>{}</b></p>\n\
         <p>Attached: full snapshot</p>\n",
        escape_html(checked_at),
        escape_html(state_key),
    );
    Message::new(to, format!("[snapshot] {checked_at} (collected={collected})"), body)
}

pub fn error_report(to: &[String], failed_at: &str, phase: &str, err: &HarvestError) -> Message {
    let mut detail = format!("phase: {phase}\nerror: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(s) = source {
        detail.push_str(&format!("\ncaused by: {s}"));
        source = s.source();
    }

    let body = format!(
        "<p><b>Crawler run failed</b></p>\n\
         <pre style=\"white-space:pre-wrap; font-size:12px;\">{}</pre>\n",
        escape_html(&detail),
    );
    Message::new(to, format!("[crawler error] {failed_at}"), body)
}
