use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use super::UserId;

/// Profile of a user the bot has seen at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: Option<String>,
    pub age: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: UserId) -> Self {
        UserProfile {
            id,
            name: None,
            age: None,
            created_at: Utc::now(),
        }
    }
}

/// Known users in first-contact order, plus the fan-out blocklist.
///
/// Profiles are never removed. `order` mirrors the keys of `profiles` so that
/// [`Directory::ids`] yields a stable snapshot for broadcasts.
#[derive(Debug, Default)]
pub struct Directory {
    profiles: HashMap<UserId, UserProfile>,
    order: Vec<UserId>,
    blocked: HashSet<UserId>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the profile for `id`, creating an empty one on first contact.
    pub fn get_or_create(&mut self, id: UserId) -> &mut UserProfile {
        if !self.profiles.contains_key(&id) {
            self.order.push(id);
        }
        self.profiles.entry(id).or_insert_with(|| UserProfile::new(id))
    }

    pub fn get(&self, id: UserId) -> Option<&UserProfile> {
        self.profiles.get(&id)
    }

    pub fn set_name(&mut self, id: UserId, name: &str) {
        self.get_or_create(id).name = Some(name.to_string());
    }

    pub fn set_age(&mut self, id: UserId, age: u8) {
        self.get_or_create(id).age = Some(age);
    }

    /// Add `id` to the blocklist. Returns `false` if it was already blocked.
    pub fn block(&mut self, id: UserId) -> bool {
        self.blocked.insert(id)
    }

    /// Remove `id` from the blocklist. Returns `false` if it was not blocked.
    pub fn unblock(&mut self, id: UserId) -> bool {
        self.blocked.remove(&id)
    }

    pub fn is_blocked(&self, id: UserId) -> bool {
        self.blocked.contains(&id)
    }

    /// Point-in-time copy of every known id, in first-contact order.
    pub fn ids(&self) -> Vec<UserId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut dir = Directory::new();
        let created_at = dir.get_or_create(UserId(1)).created_at;
        dir.set_name(UserId(1), "Alice");
        let again = dir.get_or_create(UserId(1));
        assert_eq!(again.created_at, created_at);
        assert_eq!(again.name.as_deref(), Some("Alice"));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn updates_keep_identity() {
        let mut dir = Directory::new();
        dir.set_name(UserId(5), "Bob");
        dir.set_age(UserId(5), 40);
        let p = dir.get(UserId(5)).unwrap();
        assert_eq!(p.id, UserId(5));
        assert_eq!(p.name.as_deref(), Some("Bob"));
        assert_eq!(p.age, Some(40));
    }

    #[test]
    fn snapshot_follows_first_contact_order() {
        let mut dir = Directory::new();
        for id in [30, 10, 20, 10] {
            dir.get_or_create(UserId(id));
        }
        assert_eq!(dir.ids(), vec![UserId(30), UserId(10), UserId(20)]);

        let snapshot = dir.ids();
        dir.get_or_create(UserId(99));
        assert_eq!(snapshot.len(), 3, "snapshot must not see later registrations");
    }

    #[test]
    fn block_and_unblock() {
        let mut dir = Directory::new();
        assert!(dir.block(UserId(3)));
        assert!(!dir.block(UserId(3)));
        assert!(dir.is_blocked(UserId(3)));
        assert!(dir.unblock(UserId(3)));
        assert!(!dir.unblock(UserId(3)));
        assert!(!dir.is_blocked(UserId(3)));
    }
}
