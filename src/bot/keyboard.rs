//! Button callbacks and the keyboards that carry them.
//!
//! Callback identifiers form a closed set; [`Callback`] parses and prints them so the
//! strings only exist in this file.
use std::fmt;
use std::str::FromStr;

use crate::transport::{Button, Keyboard};

/// Answer to a yes/no confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    fn as_str(self) -> &'static str {
        match self {
            Choice::Yes => "yes",
            Choice::No => "no",
        }
    }
}

/// Flows that end in a yes/no confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    Feedback,
    Broadcast,
}

impl ConfirmKind {
    fn prefix(self) -> &'static str {
        match self {
            ConfirmKind::Feedback => "feedback_confirm",
            ConfirmKind::Broadcast => "broadcast_confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    MenuProfile,
    MenuUtilities,
    MenuFeedback,
    MenuAdminBroadcast,
    UtilEcho,
    UtilDice,
    UtilRandom,
    UtilBack,
    Confirm(ConfirmKind, Choice),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown callback '{0}'")]
pub struct UnknownCallback(pub String);

impl FromStr for Callback {
    type Err = UnknownCallback;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cb = match s {
            "menu_profile" => Callback::MenuProfile,
            "menu_utilities" => Callback::MenuUtilities,
            "menu_feedback" => Callback::MenuFeedback,
            "menu_admin_broadcast" => Callback::MenuAdminBroadcast,
            "util_echo" => Callback::UtilEcho,
            "util_dice" => Callback::UtilDice,
            "util_random" => Callback::UtilRandom,
            "util_back" => Callback::UtilBack,
            other => {
                let (prefix, answer) = other
                    .split_once(':')
                    .ok_or_else(|| UnknownCallback(s.to_string()))?;
                let kind = match prefix {
                    "feedback_confirm" => ConfirmKind::Feedback,
                    "broadcast_confirm" => ConfirmKind::Broadcast,
                    _ => return Err(UnknownCallback(s.to_string())),
                };
                let choice = match answer {
                    "yes" => Choice::Yes,
                    "no" => Choice::No,
                    _ => return Err(UnknownCallback(s.to_string())),
                };
                Callback::Confirm(kind, choice)
            }
        };
        Ok(cb)
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Callback::MenuProfile => "menu_profile",
            Callback::MenuUtilities => "menu_utilities",
            Callback::MenuFeedback => "menu_feedback",
            Callback::MenuAdminBroadcast => "menu_admin_broadcast",
            Callback::UtilEcho => "util_echo",
            Callback::UtilDice => "util_dice",
            Callback::UtilRandom => "util_random",
            Callback::UtilBack => "util_back",
            Callback::Confirm(kind, choice) => {
                return write!(f, "{}:{}", kind.prefix(), choice.as_str())
            }
        };
        f.write_str(s)
    }
}

/// Main menu; the broadcast row is only offered to admins.
pub fn main_menu(is_admin: bool) -> Keyboard {
    let mut kb = Keyboard::default()
        .row(vec![
            Button::new("Profile", Callback::MenuProfile),
            Button::new("Utilities", Callback::MenuUtilities),
        ])
        .row(vec![Button::new("Feedback", Callback::MenuFeedback)]);
    if is_admin {
        kb = kb.row(vec![Button::new(
            "Admin: Broadcast",
            Callback::MenuAdminBroadcast,
        )]);
    }
    kb
}

pub fn yes_no(kind: ConfirmKind) -> Keyboard {
    Keyboard::default().row(vec![
        Button::new("Yes", Callback::Confirm(kind, Choice::Yes)),
        Button::new("No", Callback::Confirm(kind, Choice::No)),
    ])
}

pub fn utility_menu() -> Keyboard {
    Keyboard::default()
        .row(vec![
            Button::new("Echo", Callback::UtilEcho),
            Button::new("Roll Dice", Callback::UtilDice),
        ])
        .row(vec![
            Button::new("Random Number", Callback::UtilRandom),
            Button::new("Back", Callback::UtilBack),
        ])
}
