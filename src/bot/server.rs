use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::commands::{Command, CommandTable};
use super::fanout::fan_out;
use super::flow::{advance, Actor, Effect, Event, Flow, FlowKind, Step};
use super::keyboard::{main_menu, utility_menu, Callback};
use super::render::{feedback_listing, feedback_notice, profile_summary};
use super::roles::{log_denied, role_name, Role};
use super::session::SessionTable;
use super::utility::{random_number, roll_dice};
use crate::config::Config;
use crate::logutil::escape_log;
use crate::storage::{FeedbackEntry, Store, UserId};
use crate::transport::{ChatId, Reply, Transport, Update, UpdateKind};

/// Sent to the chat when handling an update fails unexpectedly.
pub const GENERIC_ERROR: &str = "An error occurred while processing your request.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help.";

/// # Bot Server
///
/// Owns every piece of mutable state (directory, feedback log, sessions) and processes
/// updates strictly one at a time. Handlers take `&mut self`, so the single-worker
/// discipline is enforced by the borrow checker instead of locks.
///
/// ```text
/// Update ──► handle_update ──► Command / Callback / free text
///                                  │
///                      one-shot handler or advance(flow, event)
///                                  │
///                           Step { next, effects } ──► apply
/// ```
///
/// ## Usage
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use utilbot::bot::BotServer;
/// use utilbot::config::Config;
/// use utilbot::transport::ConsoleTransport;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let transport = ConsoleTransport::new();
///     let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
///     transport.spawn_reader(tx);
///     let mut server = BotServer::new(Config::default(), Arc::new(transport))?;
///     server.run(rx).await
/// }
/// ```
///
/// ## Error boundary
///
/// [`BotServer::process`] is the top level for one update. Any error is logged with the
/// update and its full cause chain, the chat gets [`GENERIC_ERROR`], and the server moves on
/// to the next update.
pub struct BotServer {
    config: Config,
    store: Store,
    sessions: SessionTable,
    transport: Arc<dyn Transport>,
}

impl BotServer {
    /// Build a server after checking the command table and configuration.
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        CommandTable::validate()?;
        config.validate()?;
        let store = Store::with_blocked(config.bot.blocked.iter().copied().map(UserId));
        Ok(BotServer {
            config,
            store,
            sessions: SessionTable::new(),
            transport,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Current flow of `user` (`Idle` when no session is open).
    pub fn flow_of(&self, user: UserId) -> Flow {
        self.sessions.flow(user)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn role(&self, user: UserId) -> Role {
        Role::of(&self.config.bot, user)
    }

    /// Main loop: process updates in arrival order until the channel closes or Ctrl-C.
    pub async fn run(&mut self, mut updates: mpsc::UnboundedReceiver<Update>) -> Result<()> {
        info!(
            "Bot '{}' started ({} admin(s), {} blocked)",
            self.config.bot.name,
            self.config.bot.admins.len(),
            self.config.bot.blocked.len()
        );
        loop {
            tokio::select! {
                update = updates.recv() => {
                    match update {
                        Some(update) => self.process(update).await,
                        None => {
                            info!("Update channel closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Handle one update, absorbing any failure.
    pub async fn process(&mut self, update: Update) {
        if let Err(e) = self.handle_update(&update).await {
            error!("Exception while handling update {}: {:?}", update.describe(), e);
            if let Err(send_err) = self
                .transport
                .send(update.chat, &Reply::text(GENERIC_ERROR))
                .await
            {
                error!("Failed to send error message to {}: {}", update.chat, send_err);
            }
        }
    }

    /// Route one update. Errors propagate to [`BotServer::process`].
    pub async fn handle_update(&mut self, update: &Update) -> Result<()> {
        let user = update.from.id;
        debug!("update {}", update.describe());
        self.store.directory.get_or_create(user);
        self.sessions.touch(user);

        match &update.kind {
            UpdateKind::Text(text) => match Command::parse(text) {
                Some(cmd) => self.handle_command(update, cmd).await,
                None => self.drive(update, Event::Text(text)).await,
            },
            UpdateKind::Callback(data) => match data.parse::<Callback>() {
                Ok(cb) => self.handle_callback(update, cb).await,
                Err(e) => {
                    debug!("ignoring {} from {}", e, user);
                    Ok(())
                }
            },
        }
    }

    async fn handle_command(&mut self, update: &Update, cmd: Command) -> Result<()> {
        let user = update.from.id;
        let role = self.role(user);
        if let Some(spec) = cmd.spec() {
            if spec.admin_only && !role.is_admin() {
                log_denied(user, spec.usage);
                return self.reply(update.chat, Reply::text(spec.denied)).await;
            }
        }

        match cmd {
            Command::Start => {
                let seeded = update
                    .from
                    .full_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty());
                let has_name = self
                    .store
                    .directory
                    .get(user)
                    .map(|p| p.name.is_some())
                    .unwrap_or(false);
                if let (false, Some(full_name)) = (has_name, seeded) {
                    self.store.directory.set_name(user, full_name);
                }
                let text = format!(
                    "Welcome to {}.\nUse the buttons below or commands:\n/register, /profile, /feedback, /help",
                    self.config.bot.name
                );
                self.reply(update.chat, Reply::with_keyboard(text, main_menu(role.is_admin())))
                    .await
            }
            Command::Help => {
                self.reply(update.chat, Reply::text(CommandTable::help_text(role.is_admin())))
                    .await
            }
            Command::Echo(args) => {
                let text = if args.is_empty() {
                    "Send text after /echo to repeat it.".to_string()
                } else {
                    args
                };
                self.reply(update.chat, Reply::text(text)).await
            }
            Command::Profile => self.send_profile(update.chat, user).await,
            Command::Register => self.drive(update, Event::Begin(FlowKind::Register)).await,
            Command::Feedback => self.drive(update, Event::Begin(FlowKind::Feedback)).await,
            Command::Broadcast => self.drive(update, Event::Begin(FlowKind::Broadcast)).await,
            Command::Cancel => self.drive(update, Event::Cancel).await,
            Command::AdminFeedback => {
                let entries = self.store.feedback.recent(self.config.bot.feedback_recent_limit);
                let text = if entries.is_empty() {
                    "No feedback yet.".to_string()
                } else {
                    feedback_listing(entries)
                };
                self.reply(update.chat, Reply::text(text)).await
            }
            Command::Block(Some(id)) => {
                let text = if self.store.directory.block(id) {
                    info!(target: "security", "user {} blocked by {}", id, user);
                    format!("User {} will be skipped by broadcasts.", id)
                } else {
                    format!("User {} is already blocked.", id)
                };
                self.reply(update.chat, Reply::text(text)).await
            }
            Command::Unblock(Some(id)) => {
                let text = if self.store.directory.unblock(id) {
                    info!(target: "security", "user {} unblocked by {}", id, user);
                    format!("User {} will receive broadcasts again.", id)
                } else {
                    format!("User {} is not blocked.", id)
                };
                self.reply(update.chat, Reply::text(text)).await
            }
            Command::Block(None) => self.reply(update.chat, Reply::text("Usage: /block <id>")).await,
            Command::Unblock(None) => {
                self.reply(update.chat, Reply::text("Usage: /unblock <id>")).await
            }
            Command::Unknown(keyword) => {
                debug!("unknown command '/{}' from {}", escape_log(&keyword), user);
                self.reply(update.chat, Reply::text(UNKNOWN_COMMAND)).await
            }
        }
    }

    async fn handle_callback(&mut self, update: &Update, cb: Callback) -> Result<()> {
        let user = update.from.id;
        let role = self.role(user);
        match cb {
            Callback::MenuProfile => self.send_profile(update.chat, user).await,
            Callback::MenuUtilities => {
                self.drive(update, Event::LeaveUtilities).await?;
                self.reply(update.chat, Reply::with_keyboard("Choose a utility:", utility_menu()))
                    .await
            }
            Callback::MenuFeedback => {
                self.reply(
                    update.chat,
                    Reply::text("Use /feedback to send feedback message to admins."),
                )
                .await
            }
            Callback::MenuAdminBroadcast => {
                let text = if role.is_admin() {
                    "Use /broadcast to send message to all known users."
                } else {
                    log_denied(user, "menu_admin_broadcast");
                    "You are not authorized for admin actions."
                };
                self.reply(update.chat, Reply::text(text)).await
            }
            Callback::UtilEcho => self.drive(update, Event::EchoMode).await,
            Callback::UtilDice => {
                self.reply(update.chat, Reply::text(format!("Dice rolled: {}", roll_dice())))
                    .await
            }
            Callback::UtilRandom => {
                self.reply(
                    update.chat,
                    Reply::text(format!("Random number: {}", random_number())),
                )
                .await
            }
            Callback::UtilBack => {
                self.drive(update, Event::LeaveUtilities).await?;
                self.reply(
                    update.chat,
                    Reply::with_keyboard("Main menu:", main_menu(role.is_admin())),
                )
                .await
            }
            Callback::Confirm(kind, choice) => self.drive(update, Event::Decide(kind, choice)).await,
        }
    }

    /// Feed `event` to the user's flow and apply the resulting step.
    async fn drive(&mut self, update: &Update, event: Event<'_>) -> Result<()> {
        let user = update.from.id;
        let flow = self.sessions.flow(user);
        let name = self.store.directory.get(user).and_then(|p| p.name.clone());
        let actor = Actor {
            is_admin: self.role(user).is_admin(),
            name: name.as_deref(),
        };
        let from = flow.label();
        let step = advance(flow, event, actor);
        if from != step.next.label() {
            debug!("user {} flow {} -> {}", user, from, step.next.label());
        }
        self.apply(update, step).await
    }

    /// Commit the next flow, then run the effects in order.
    async fn apply(&mut self, update: &Update, step: Step) -> Result<()> {
        let user = update.from.id;
        self.sessions.set(user, step.next);
        for effect in step.effects {
            match effect {
                Effect::Reply(reply) => self.reply(update.chat, reply).await?,
                Effect::SaveName(name) => {
                    info!("profile {} name set to '{}'", user, escape_log(&name));
                    self.store.directory.set_name(user, &name);
                }
                Effect::SaveAge(age) => {
                    info!("profile {} age set to {}", user, age);
                    self.store.directory.set_age(user, age);
                }
                Effect::ShowSummary => {
                    let summary = profile_summary(self.store.directory.get_or_create(user));
                    self.reply(
                        update.chat,
                        Reply::text(format!("Registration completed:\n\n{}", summary)),
                    )
                    .await?;
                }
                Effect::SubmitFeedback(text) => self.submit_feedback(update, text).await?,
                Effect::Broadcast(text) => self.broadcast(update, text).await?,
            }
        }
        Ok(())
    }

    async fn submit_feedback(&mut self, update: &Update, text: String) -> Result<()> {
        let user = update.from.id;
        let handle = update.from.username.clone();
        let notice = Reply::text(feedback_notice(user, handle.as_deref(), &text));
        info!("feedback from {}: {}", user, escape_log(&text));
        self.store.feedback.append(FeedbackEntry::new(user, handle, text));

        for admin in self.config.bot.admin_ids() {
            if let Err(e) = self.transport.send(admin, &notice).await {
                warn!("Failed to send feedback to admin {}: {}", admin, e);
            }
        }
        self.reply(update.chat, Reply::text("Feedback sent. Thank you.")).await
    }

    async fn broadcast(&mut self, update: &Update, text: String) -> Result<()> {
        let sender = update.from.id;
        let snapshot = self.store.directory.ids();
        info!(
            "broadcast by {} ({}) to {} recipient(s): {}",
            sender,
            role_name(self.role(sender)),
            snapshot.len(),
            escape_log(&text)
        );
        let report = fan_out(
            self.transport.as_ref(),
            &self.store.directory,
            &snapshot,
            &Reply::text(text),
            self.config.bot.broadcast_pacing(),
        )
        .await;
        info!(
            "broadcast finished: sent={} failed={} skipped={}",
            report.sent, report.failed, report.skipped
        );
        let summary = format!(
            "Broadcast finished. Sent: {}, failed: {}.",
            report.sent, report.failed
        );
        self.reply(update.chat, Reply::text(summary)).await
    }

    async fn send_profile(&mut self, chat: ChatId, user: UserId) -> Result<()> {
        let summary = profile_summary(self.store.directory.get_or_create(user));
        self.reply(chat, Reply::text(summary)).await
    }

    async fn reply(&self, chat: ChatId, reply: Reply) -> Result<()> {
        self.transport
            .send(chat, &reply)
            .await
            .with_context(|| format!("failed to reply to chat {}", chat))
    }

    /// Multi-line summary for the `status` CLI command.
    pub fn status_summary(&self) -> String {
        let admins = self
            .config
            .bot
            .admins
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Bot: {}\nAdmins: {}\nBlocked at startup: {}\nBroadcast pacing: {} ms\nFeedback listing size: {}\nKnown users: {}\nOpen sessions: {}\nFeedback entries: {}",
            self.config.bot.name,
            if admins.is_empty() { "(none)".to_string() } else { admins },
            self.config.bot.blocked.len(),
            self.config.bot.broadcast_pacing_ms,
            self.config.bot.feedback_recent_limit,
            self.store.directory.len(),
            self.sessions.len(),
            self.store.feedback.len()
        )
    }

    fn shutdown(&self) {
        info!(
            "Shutting down: {} known user(s), {} feedback entr(ies), {} open session(s)",
            self.store.directory.len(),
            self.store.feedback.len(),
            self.sessions.len()
        );
    }
}
