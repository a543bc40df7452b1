//! Slash-command parsing against a static command table.
//!
//! [`COMMANDS`] is the single source for command names, their admin gating and the help
//! listing. [`CommandTable::validate`] runs when the server is built so a malformed table
//! stops startup instead of surfacing as "Unknown command" at runtime.
use std::collections::HashSet;

use crate::errors::BotError;
use crate::storage::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Start,
    Help,
    Echo,
    Profile,
    Register,
    Feedback,
    Cancel,
    Broadcast,
    AdminFeedback,
    Block,
    Unblock,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: CommandName,
    pub keyword: &'static str,
    pub admin_only: bool,
    pub usage: &'static str,
    pub summary: &'static str,
    /// Reply sent to non-admins who try an admin-only command.
    pub denied: &'static str,
}

const NOT_AUTHORIZED: &str = "You are not authorized to use this command.";

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: CommandName::Start, keyword: "start", admin_only: false, usage: "/start", summary: "Show main menu", denied: "" },
    CommandSpec { name: CommandName::Register, keyword: "register", admin_only: false, usage: "/register", summary: "Create or update your profile", denied: "" },
    CommandSpec { name: CommandName::Profile, keyword: "profile", admin_only: false, usage: "/profile", summary: "Show your profile information", denied: "" },
    CommandSpec { name: CommandName::Feedback, keyword: "feedback", admin_only: false, usage: "/feedback", summary: "Send feedback to the admins", denied: "" },
    CommandSpec { name: CommandName::Echo, keyword: "echo", admin_only: false, usage: "/echo <text>", summary: "Echo back text", denied: "" },
    CommandSpec { name: CommandName::Cancel, keyword: "cancel", admin_only: false, usage: "/cancel", summary: "Abort the current step", denied: "" },
    CommandSpec { name: CommandName::Help, keyword: "help", admin_only: false, usage: "/help", summary: "Show this list", denied: "" },
    CommandSpec { name: CommandName::Broadcast, keyword: "broadcast", admin_only: true, usage: "/broadcast", summary: "Send a message to all known users", denied: "You are not authorized to broadcast." },
    CommandSpec { name: CommandName::AdminFeedback, keyword: "admin_feedback", admin_only: true, usage: "/admin_feedback", summary: "Show recent feedback entries", denied: NOT_AUTHORIZED },
    CommandSpec { name: CommandName::Block, keyword: "block", admin_only: true, usage: "/block <id>", summary: "Exclude a user from broadcasts", denied: NOT_AUTHORIZED },
    CommandSpec { name: CommandName::Unblock, keyword: "unblock", admin_only: true, usage: "/unblock <id>", summary: "Include a user in broadcasts again", denied: NOT_AUTHORIZED },
];

/// Parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Echo(String),
    Profile,
    Register,
    Feedback,
    Cancel,
    Broadcast,
    AdminFeedback,
    /// `None` when the argument is missing or not a number.
    Block(Option<UserId>),
    Unblock(Option<UserId>),
    Unknown(String),
}

impl Command {
    /// Parse `text` as a command. Returns `None` for free text.
    ///
    /// Accepts `/name@botname args`; the keyword is matched case-insensitively.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim_start().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((h, a)) => (h, a.trim()),
            None => (rest, ""),
        };
        let keyword = head.split('@').next().unwrap_or(head).to_lowercase();
        let spec = match CommandTable::lookup(&keyword) {
            Some(spec) => spec,
            None => return Some(Command::Unknown(keyword)),
        };
        let cmd = match spec.name {
            CommandName::Start => Command::Start,
            CommandName::Help => Command::Help,
            CommandName::Echo => Command::Echo(args.split_whitespace().collect::<Vec<_>>().join(" ")),
            CommandName::Profile => Command::Profile,
            CommandName::Register => Command::Register,
            CommandName::Feedback => Command::Feedback,
            CommandName::Cancel => Command::Cancel,
            CommandName::Broadcast => Command::Broadcast,
            CommandName::AdminFeedback => Command::AdminFeedback,
            CommandName::Block => Command::Block(args.parse().ok()),
            CommandName::Unblock => Command::Unblock(args.parse().ok()),
        };
        Some(cmd)
    }

    pub fn name(&self) -> Option<CommandName> {
        let name = match self {
            Command::Start => CommandName::Start,
            Command::Help => CommandName::Help,
            Command::Echo(_) => CommandName::Echo,
            Command::Profile => CommandName::Profile,
            Command::Register => CommandName::Register,
            Command::Feedback => CommandName::Feedback,
            Command::Cancel => CommandName::Cancel,
            Command::Broadcast => CommandName::Broadcast,
            Command::AdminFeedback => CommandName::AdminFeedback,
            Command::Block(_) => CommandName::Block,
            Command::Unblock(_) => CommandName::Unblock,
            Command::Unknown(_) => return None,
        };
        Some(name)
    }

    pub fn spec(&self) -> Option<&'static CommandSpec> {
        self.name().and_then(CommandTable::spec)
    }
}

/// Access to [`COMMANDS`].
pub struct CommandTable;

impl CommandTable {
    pub fn lookup(keyword: &str) -> Option<&'static CommandSpec> {
        COMMANDS.iter().find(|c| c.keyword == keyword)
    }

    pub fn spec(name: CommandName) -> Option<&'static CommandSpec> {
        COMMANDS.iter().find(|c| c.name == name)
    }

    /// Check that every command appears once with a well-formed keyword.
    pub fn validate() -> Result<(), BotError> {
        let mut keywords = HashSet::new();
        let mut names = HashSet::new();
        for spec in COMMANDS {
            let well_formed = !spec.keyword.is_empty()
                && spec
                    .keyword
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !well_formed {
                return Err(BotError::CommandTable(format!(
                    "malformed keyword '{}'",
                    spec.keyword
                )));
            }
            if !keywords.insert(spec.keyword) || !names.insert(spec.name) {
                return Err(BotError::CommandTable(format!(
                    "duplicate command '{}'",
                    spec.keyword
                )));
            }
            if spec.admin_only && spec.denied.is_empty() {
                return Err(BotError::CommandTable(format!(
                    "admin command '{}' has no denial text",
                    spec.keyword
                )));
            }
            if !spec.usage.starts_with(&format!("/{}", spec.keyword)) {
                return Err(BotError::CommandTable(format!(
                    "usage for '{}' does not start with the command",
                    spec.keyword
                )));
            }
        }
        Ok(())
    }

    /// Help listing; admin commands are appended for admins only.
    pub fn help_text(is_admin: bool) -> String {
        let mut lines = vec!["Available commands:".to_string()];
        for spec in COMMANDS.iter().filter(|c| is_admin || !c.admin_only) {
            lines.push(format!("{} - {}", spec.usage, spec.summary));
        }
        lines.join("\n")
    }
}
