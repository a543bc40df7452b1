use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

use super::flow::Flow;
use crate::storage::UserId;

/// # Conversation Session
///
/// Transient per-user state while a flow is active. A session is created when a user
/// enters a flow and dropped once the flow returns to [`Flow::Idle`]; nothing survives a
/// restart.
///
/// There is no inactivity timeout: a user who starts `/register` and never answers keeps
/// a parked session until they cancel or start something else. `last_activity` is kept
/// for logs and status output only.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserId,
    pub flow: Flow,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user: UserId, flow: Flow) -> Self {
        let now = Utc::now();
        Session {
            user,
            flow,
            started_at: now,
            last_activity: now,
        }
    }

    /// Get session duration
    pub fn duration(&self) -> chrono::Duration {
        self.last_activity - self.started_at
    }
}

/// All active sessions, keyed by user.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<UserId, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current flow for `user`; `Idle` when no session exists.
    pub fn flow(&self, user: UserId) -> Flow {
        self.sessions
            .get(&user)
            .map(|s| s.flow.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    /// Store `flow` as the user's state, replacing whatever was there.
    ///
    /// `Idle` removes the session. Moving between two steps of one flow keeps the original
    /// `started_at`; entering a different flow starts a fresh session.
    pub fn set(&mut self, user: UserId, flow: Flow) {
        if flow.is_idle() {
            if let Some(old) = self.sessions.remove(&user) {
                debug!(
                    "session {} closed from {} after {}s",
                    user,
                    old.flow.label(),
                    old.duration().num_seconds()
                );
            }
            return;
        }
        let continuing = self
            .sessions
            .get(&user)
            .map(|s| same_flow(&s.flow, &flow))
            .unwrap_or(false);
        if continuing {
            if let Some(session) = self.sessions.get_mut(&user) {
                session.flow = flow;
                session.last_activity = Utc::now();
            }
        } else {
            debug!("session {} entered {}", user, flow.label());
            self.sessions.insert(user, Session::new(user, flow));
        }
    }

    /// Record activity without changing the flow.
    pub fn touch(&mut self, user: UserId) {
        if let Some(session) = self.sessions.get_mut(&user) {
            session.last_activity = Utc::now();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn same_flow(a: &Flow, b: &Flow) -> bool {
    use Flow::*;
    matches!(
        (a, b),
        (RegisterName | RegisterAge, RegisterName | RegisterAge)
            | (FeedbackText | FeedbackConfirm { .. }, FeedbackText | FeedbackConfirm { .. })
            | (BroadcastText | BroadcastConfirm { .. }, BroadcastText | BroadcastConfirm { .. })
            | (UtilityEcho, UtilityEcho)
    )
}
