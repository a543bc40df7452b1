use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{ChatId, DeliveryError, Reply, Transport};

/// Transport that records every reply instead of delivering it.
///
/// Chats registered with [`RecordingTransport::fail_for`] reject every send, which is how
/// tests simulate users who blocked the bot. Rejected sends are not recorded.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ChatId, Reply)>>,
    failing: Mutex<HashSet<ChatId>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future send to `chat` fail.
    pub fn fail_for(&self, chat: ChatId) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(chat);
        }
    }

    /// All recorded replies in send order.
    pub fn sent(&self) -> Vec<(ChatId, Reply)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Texts delivered to `chat`, in order.
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == chat)
            .map(|(_, reply)| reply.text)
            .collect()
    }

    /// Most recent reply delivered to `chat`.
    pub fn last_to(&self, chat: ChatId) -> Option<Reply> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| *to == chat)
            .map(|(_, reply)| reply)
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(&chat))
            .unwrap_or(false);
        if failing {
            return Err(DeliveryError::Rejected {
                chat,
                reason: "simulated failure".into(),
            });
        }
        self.sent
            .lock()
            .map_err(|_| DeliveryError::Closed)?
            .push((chat, reply.clone()));
        Ok(())
    }
}
