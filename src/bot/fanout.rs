//! Best-effort broadcast delivery.
//!
//! [`fan_out`] walks a snapshot of recipient ids in order and makes one delivery attempt per
//! eligible recipient. Each attempt becomes a [`Delivery`] and the outcomes are folded into
//! a [`FanoutReport`]. A failed send is logged and counted; it never stops the loop.
//!
//! After every successful send the dispatcher sleeps for the configured pacing interval.
//! The sleep is awaited inline, so the server handles no other update until the whole
//! snapshot has been processed. Once started, a fan-out always runs to the end.

use log::{debug, warn};
use std::time::Duration;

use crate::storage::{Directory, UserId};
use crate::transport::{Reply, Transport};

/// Outcome of one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Recipient is on the blocklist; no attempt was made.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl FanoutReport {
    pub fn record(mut self, outcome: &Delivery) -> Self {
        match outcome {
            Delivery::Sent => self.sent += 1,
            Delivery::Skipped => self.skipped += 1,
            Delivery::Failed(_) => self.failed += 1,
        }
        self
    }

    pub fn total(&self) -> usize {
        self.sent + self.failed + self.skipped
    }
}

/// Deliver `reply` to every id in `snapshot` that `directory` does not block.
pub async fn fan_out(
    transport: &dyn Transport,
    directory: &Directory,
    snapshot: &[UserId],
    reply: &Reply,
    pacing: Duration,
) -> FanoutReport {
    let mut outcomes = Vec::with_capacity(snapshot.len());
    for &recipient in snapshot {
        let outcome = if directory.is_blocked(recipient) {
            debug!("fan-out skipping blocked user {}", recipient);
            Delivery::Skipped
        } else {
            match transport.send(recipient, reply).await {
                Ok(()) => {
                    if !pacing.is_zero() {
                        tokio::time::sleep(pacing).await;
                    }
                    Delivery::Sent
                }
                Err(e) => {
                    warn!("Failed to send broadcast to {}: {}", recipient, e);
                    Delivery::Failed(e.to_string())
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
        .iter()
        .fold(FanoutReport::default(), |report, outcome| report.record(outcome))
}
