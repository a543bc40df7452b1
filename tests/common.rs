//! Test utilities & fixtures.
//! Builds a server wired to a `RecordingTransport` and offers short helpers for driving it.
#![allow(dead_code)]

use std::sync::Arc;
use utilbot::bot::BotServer;
use utilbot::config::Config;
use utilbot::storage::UserId;
use utilbot::transport::{RecordingTransport, Reply, Sender, Update};

pub const ADMIN: i64 = 1000;

/// Default config with the given admins, no pacing and no log files.
pub fn test_config(admins: &[i64]) -> Config {
    let mut config = Config::default();
    config.bot.admins = admins.to_vec();
    config.bot.broadcast_pacing_ms = 0;
    config.logging.file = None;
    config.logging.security_file = None;
    config
}

pub fn bot_with(config: Config) -> (BotServer, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let server = BotServer::new(config, transport.clone()).expect("server init");
    (server, transport)
}

pub fn bot() -> (BotServer, Arc<RecordingTransport>) {
    bot_with(test_config(&[ADMIN]))
}

pub async fn say(server: &mut BotServer, user: i64, text: &str) {
    server.process(Update::text(Sender::new(user), text)).await;
}

pub async fn press(server: &mut BotServer, user: i64, callback: &str) {
    server.process(Update::callback(Sender::new(user), callback)).await;
}

/// Text of the latest reply to `user`, or an empty string.
pub fn last_text(transport: &RecordingTransport, user: i64) -> String {
    transport
        .last_to(UserId(user))
        .map(|r| r.text)
        .unwrap_or_default()
}

pub fn last_reply(transport: &RecordingTransport, user: i64) -> Reply {
    transport
        .last_to(UserId(user))
        .unwrap_or_else(|| panic!("no reply to {user}"))
}

pub fn has_button(reply: &Reply, callback: &str) -> bool {
    reply
        .keyboard
        .as_ref()
        .map(|kb| kb.callbacks().any(|c| c == callback))
        .unwrap_or(false)
}
