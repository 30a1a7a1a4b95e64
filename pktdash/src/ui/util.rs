//! Small UI helpers: truncation and relative times.

use chrono::{DateTime, Local};

/// Shorten `s` to at most `max` chars, eliding the middle.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max { return s.to_string(); }
    if max <= 3 { return "...".into(); }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}

/// "3s ago", "2m ago", or "never".
pub fn ago(t: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(t) = t else { return "never".into() };
    let secs = (now - t).num_seconds().max(0);
    if secs < 60 { format!("{secs}s ago") }
    else if secs < 3600 { format!("{}m ago", secs / 60) }
    else { format!("{}h ago", secs / 3600) }
}
