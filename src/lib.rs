//! # Utilbot - Conversational Utility Bot
//!
//! Utilbot is a chat bot front-end: it receives messages and button presses from a
//! messaging platform, keeps a small profile per user, and walks users through short
//! multi-step conversations.
//!
//! ## Features
//!
//! - **Registration**: name and age collected step by step, with validation and re-prompts.
//! - **Feedback**: staged feedback text, explicit yes/no confirmation, admin notification.
//! - **Broadcast**: admin-only fan-out to every known user, honouring a blocklist and reporting
//!   sent/failed counts.
//! - **Utilities**: one-shot echo mode, dice roll and random number.
//! - **Single-worker design**: one server owns all state and handles updates in arrival order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use utilbot::bot::BotServer;
//! use utilbot::config::Config;
//! use utilbot::transport::ConsoleTransport;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let transport = ConsoleTransport::new();
//!     let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//!     transport.spawn_reader(tx);
//!
//!     let mut server = BotServer::new(config, Arc::new(transport))?;
//!     server.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - server, conversation flows, commands, fan-out
//! - [`storage`] - in-memory user directory and feedback log
//! - [`transport`] - platform boundary: updates, replies, the `Transport` trait
//! - [`config`] - configuration loading and validation
//! - [`validation`] - input checks used by the flows
//! - [`errors`] - startup error type
//! - [`logutil`] - single-line log escaping

pub mod bot;
pub mod config;
pub mod errors;
pub mod logutil;
pub mod storage;
pub mod transport;
pub mod validation;
