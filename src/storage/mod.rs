//! # Storage Module - In-Memory Bot State
//!
//! Holds everything the bot remembers for the lifetime of the process:
//!
//! - [`Directory`] - user profiles keyed by [`UserId`], plus the fan-out blocklist
//! - [`FeedbackLog`] - append-only list of submitted feedback
//!
//! Nothing is written to disk; a restart starts from an empty directory (plus any ids
//! blocked through configuration). The [`Store`] is owned by the server and handed to
//! handlers by reference, so there is no global state and no locking.
//!
//! ```rust
//! use utilbot::storage::{Store, UserId};
//!
//! let mut store = Store::new();
//! store.directory.get_or_create(UserId(42));
//! store.directory.set_name(UserId(42), "Alice");
//! assert_eq!(store.directory.get(UserId(42)).unwrap().name.as_deref(), Some("Alice"));
//! ```

mod directory;
mod feedback;

pub use directory::{Directory, UserProfile};
pub use feedback::{FeedbackEntry, FeedbackLog};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric platform identity of a user. Private chats are addressed by the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(UserId)
    }
}

/// Process-lifetime store shared by the router and the flows.
#[derive(Debug, Default)]
pub struct Store {
    pub directory: Directory,
    pub feedback: FeedbackLog,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `blocked` already on the blocklist.
    pub fn with_blocked(blocked: impl IntoIterator<Item = UserId>) -> Self {
        let mut store = Self::new();
        for id in blocked {
            store.directory.block(id);
        }
        store
    }
}
