use chrono::{DateTime, Utc};

use super::UserId;

/// One submitted piece of feedback. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub author: UserId,
    pub handle: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl FeedbackEntry {
    pub fn new(author: UserId, handle: Option<String>, text: String) -> Self {
        FeedbackEntry {
            author,
            handle,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Append-only feedback history in submission order.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: Vec<FeedbackEntry>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
    }

    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[FeedbackEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(n: usize) -> FeedbackLog {
        let mut log = FeedbackLog::new();
        for i in 0..n {
            log.append(FeedbackEntry::new(UserId(i as i64), None, format!("note {i}")));
        }
        log
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let log = log_with(15);
        let tail: Vec<_> = log.recent(10).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(tail.len(), 10);
        assert_eq!(tail.first(), Some(&"note 5"));
        assert_eq!(tail.last(), Some(&"note 14"));
    }

    #[test]
    fn recent_never_exceeds_limit() {
        for size in 0..8 {
            let log = log_with(size);
            for k in 0..10 {
                let got = log.recent(k);
                assert!(got.len() <= k);
                if size <= k {
                    assert_eq!(got.len(), size, "whole log expected for size {size} k {k}");
                }
                for pair in got.windows(2) {
                    assert!(pair[0].author < pair[1].author, "order broken");
                }
            }
        }
    }

    #[test]
    fn empty_log() {
        let log = FeedbackLog::new();
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }
}
