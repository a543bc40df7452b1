//! Helpers for keeping user-supplied text on a single log line.
//!
//! Chat messages routinely carry newlines and the occasional control character; logging them raw
//! splits one record across several lines and makes the security log hard to grep.

use std::fmt::Write;

/// Maximum number of characters of user text copied into a log record.
pub const LOG_PREVIEW_CHARS: usize = 120;

/// Escape a string for single-line logging.
///
/// Newlines, carriage returns, tabs and backslashes are written as their escape sequences,
/// other control characters as `\xNN`. Text longer than [`LOG_PREVIEW_CHARS`] is cut and
/// terminated with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(LOG_PREVIEW_CHARS) + 4);
    for (idx, ch) in s.chars().enumerate() {
        if idx == LOG_PREVIEW_CHARS {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Render an optional platform handle for logs and admin listings (`@name` or `-`).
pub fn handle_or_dash(handle: Option<&str>) -> String {
    match handle {
        Some(h) if !h.is_empty() => format!("@{}", escape_log(h)),
        _ => "-".to_string(),
    }
}
