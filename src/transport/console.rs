//! Line-oriented transport for running the bot in a terminal.
//!
//! Input, one update per line:
//!
//! ```text
//! 42 /start                 text from user 42
//! 42@alice /feedback        same, with a platform handle
//! 42 #feedback_confirm:yes  button press
//! {"chat":42,"from":{"id":42},"text":"hi"}   full JSON update
//! ```
//!
//! Replies are printed as `[chat] text`, followed by one `  [callback] label` line per button.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{ChatId, DeliveryError, Reply, Sender, Transport, Update};
use crate::logutil::escape_log;

/// Writes replies to stdout; [`ConsoleTransport::spawn_reader`] feeds stdin lines back as updates.
#[derive(Debug, Default, Clone)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        ConsoleTransport
    }

    /// Read stdin until EOF, forwarding each parsed line to `tx`.
    pub fn spawn_reader(&self, tx: mpsc::UnboundedSender<Update>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_console_line(&line) {
                        Ok(Some(update)) => {
                            if tx.send(update).is_err() {
                                debug!("update channel closed; console reader stopping");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("ignoring console line '{}': {}", escape_log(&line), e),
                    },
                    Ok(None) => {
                        debug!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!("stdin read error: {}", e);
                        break;
                    }
                }
            }
        })
    }
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_console_line(line: &str) -> Result<Option<Update>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        let update: Update = serde_json::from_str(line).context("invalid JSON update")?;
        return Ok(Some(update));
    }

    let (who, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("expected '<id> <text>'"))?;
    let (id, handle) = match who.split_once('@') {
        Some((id, handle)) => (id, Some(handle)),
        None => (who, None),
    };
    let id: i64 = id.parse().with_context(|| format!("invalid user id '{}'", id))?;
    let mut sender = Sender::new(id);
    if let Some(handle) = handle.filter(|h| !h.is_empty()) {
        sender = sender.with_username(handle);
    }

    let rest = rest.trim_start();
    let update = match rest.strip_prefix('#') {
        Some(data) => Update::callback(sender, data.trim()),
        None => Update::text(sender, rest),
    };
    Ok(Some(update))
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "[{}] {}", chat, reply.text)?;
        if let Some(keyboard) = &reply.keyboard {
            for button in keyboard.rows.iter().flatten() {
                writeln!(out, "  [{}] {}", button.callback, button.label)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
