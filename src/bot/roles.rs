//! Role resolution for authorization checks.
//!
//! There are two roles. Administrators are the ids listed in `bot.admins`; everyone else is a
//! regular user. Admin-only entry points check the role before running and log refusals on
//! the `security` target.
use log::warn;

use crate::config::BotConfig;
use crate::storage::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn of(config: &BotConfig, id: UserId) -> Role {
        if config.is_admin(id) {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// Return the human‑readable role name.
pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::User => "User",
    }
}

/// Record a refused admin action.
pub fn log_denied(id: UserId, action: &str) {
    warn!(target: "security", "denied {} for user {} (role {})", action, id, role_name(Role::User));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn admins_come_from_config() {
        let mut config = Config::default();
        config.bot.admins = vec![10];
        assert_eq!(Role::of(&config.bot, UserId(10)), Role::Admin);
        assert_eq!(Role::of(&config.bot, UserId(11)), Role::User);
        assert_eq!(role_name(Role::Admin), "Admin");
    }
}
