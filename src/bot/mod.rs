//! # Bot Core Module
//!
//! Conversation handling for the utility bot.
//!
//! ## Components
//!
//! - [`server`] - update routing, effect execution and the main loop
//! - [`flow`] - the per-user conversation state machine
//! - [`session`] - table of active flows keyed by user
//! - [`commands`] - slash-command table and parser
//! - [`keyboard`] - callback identifiers and button layouts
//! - [`fanout`] - best-effort broadcast delivery
//! - [`roles`] - admin / user resolution
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  BotServer      │ ← routes updates, owns store + sessions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Flow           │ ← advance(flow, event) -> Step { next, effects }
//! │  State Machine  │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Store /        │ ← directory, feedback log, fan-out
//! │  Fan-out        │
//! └─────────────────┘
//! ```
//!
//! ## Flows
//!
//! 1. **Registration** - `/register`, name, age (1-120); each step commits on acceptance
//! 2. **Feedback** - `/feedback`, text, yes/no; admins are notified on yes
//! 3. **Broadcast** - admins only; `/broadcast`, text, yes/no; fan-out reports sent/failed
//! 4. **Echo** - `util_echo` button; the next text message is echoed once

pub mod commands;
pub mod fanout;
pub mod flow;
pub mod keyboard;
pub mod render;
pub mod roles;
pub mod server;
pub mod session;
pub mod utility;

pub use server::BotServer;
