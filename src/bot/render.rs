//! Text rendering for profile summaries and feedback listings.
use chrono::{DateTime, Local, Utc};

use crate::logutil::handle_or_dash;
use crate::storage::{FeedbackEntry, UserProfile, UserId};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn local_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// Multi-line profile summary; unset fields are left out.
pub fn profile_summary(profile: &UserProfile) -> String {
    let mut parts = vec![format!("ID: {}", profile.id)];
    if let Some(name) = profile.name.as_deref().filter(|n| !n.is_empty()) {
        parts.push(format!("Name: {}", name));
    }
    if let Some(age) = profile.age {
        parts.push(format!("Age: {}", age));
    }
    parts.push(format!("Registered: {}", local_timestamp(profile.created_at)));
    parts.join("\n")
}

/// Listing for `/admin_feedback`, oldest first.
pub fn feedback_listing(entries: &[FeedbackEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "[{}] from {} ({}):\n{}\n",
                local_timestamp(e.created_at),
                e.author,
                handle_or_dash(e.handle.as_deref()),
                e.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notice sent to each admin when feedback is submitted.
pub fn feedback_notice(author: UserId, handle: Option<&str>, text: &str) -> String {
    format!(
        "New feedback from {} ({}):\n{}",
        author,
        handle_or_dash(handle),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_skips_missing_fields() {
        let mut profile = UserProfile::new(UserId(9));
        let s = profile_summary(&profile);
        assert!(s.starts_with("ID: 9\n"));
        assert!(!s.contains("Name:"));
        assert!(!s.contains("Age:"));
        assert!(s.contains("Registered: "));

        profile.name = Some("Alice".into());
        profile.age = Some(35);
        let s = profile_summary(&profile);
        assert!(s.contains("Name: Alice"));
        assert!(s.contains("Age: 35"));
    }

    #[test]
    fn listing_contains_author_and_text() {
        let entries = vec![
            FeedbackEntry::new(UserId(1), Some("ann".into()), "first".into()),
            FeedbackEntry::new(UserId(2), None, "second".into()),
        ];
        let out = feedback_listing(&entries);
        assert!(out.contains("from 1 (@ann):\nfirst"));
        assert!(out.contains("from 2 (-):\nsecond"));
        assert!(out.find("first") < out.find("second"));
    }

    #[test]
    fn notice_format() {
        assert_eq!(
            feedback_notice(UserId(3), Some("bo"), "hi"),
            "New feedback from 3 (@bo):\nhi"
        );
    }
}
