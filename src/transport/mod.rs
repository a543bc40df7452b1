//! # Transport Boundary
//!
//! The messaging platform is an external collaborator. This module defines what the bot
//! needs from it and nothing more:
//!
//! - [`Update`] - one inbound event (a text message or a button press)
//! - [`Reply`] - outbound text, optionally with a [`Keyboard`] of labelled choices
//! - [`Transport`] - the send primitive, assumed reliable and rate-limited on its side
//!
//! Two implementations ship with the crate: [`ConsoleTransport`] for running the bot from a
//! terminal, and [`RecordingTransport`] which captures replies and can simulate delivery
//! failures for tests.

mod console;
mod memory;

pub use console::{parse_console_line, ConsoleTransport};
pub use memory::RecordingTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::UserId;

/// Chat destination. Private chats share the user's numeric id.
pub type ChatId = UserId;

/// Who sent an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Sender {
    pub fn new(id: i64) -> Self {
        Sender {
            id: UserId(id),
            username: None,
            full_name: None,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_full_name(mut self, full_name: &str) -> Self {
        self.full_name = Some(full_name.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A text message; commands are text starting with `/`.
    Text(String),
    /// A button press carrying the button's callback identifier.
    Callback(String),
}

/// One inbound event from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub chat: ChatId,
    pub from: Sender,
    #[serde(flatten)]
    pub kind: UpdateKind,
}

impl Update {
    /// Text message in the sender's private chat.
    pub fn text(from: Sender, text: &str) -> Self {
        Update {
            chat: from.id,
            from,
            kind: UpdateKind::Text(text.to_string()),
        }
    }

    /// Button press in the sender's private chat.
    pub fn callback(from: Sender, data: &str) -> Self {
        Update {
            chat: from.id,
            from,
            kind: UpdateKind::Callback(data.to_string()),
        }
    }

    /// Short single-line description for logs.
    pub fn describe(&self) -> String {
        let (kind, body) = match &self.kind {
            UpdateKind::Text(t) => ("text", t.as_str()),
            UpdateKind::Callback(c) => ("callback", c.as_str()),
        };
        format!(
            "chat={} from={} {}={}",
            self.chat,
            self.from.id,
            kind,
            crate::logutil::escape_log(body)
        )
    }
}

/// A labelled choice. Pressing it sends `callback` back as an [`UpdateKind::Callback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub callback: String,
}

impl Button {
    pub fn new(label: &str, callback: impl ToString) -> Self {
        Button {
            label: label.to_string(),
            callback: callback.to_string(),
        }
    }
}

/// Rows of buttons. Rendering is up to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn callbacks(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.callback.as_str())
    }
}

/// Outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Failure reported by the transport for a single send.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The platform refused the message (user blocked the bot, chat not found, ...).
    #[error("delivery to {chat} rejected: {reason}")]
    Rejected { chat: ChatId, reason: String },

    /// The outbound side is gone.
    #[error("transport closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound half of the messaging platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError>;
}
