use thiserror::Error;

/// Errors raised while setting up or configuring the bot.
///
/// Per-update failures travel as `anyhow::Error` and are absorbed at the server boundary;
/// these are the ones that can stop the process from starting.
#[derive(Debug, Error)]
pub enum BotError {
    /// The static command table failed its startup check.
    #[error("invalid command table: {0}")]
    CommandTable(String),

    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Wrapper around IO errors (config files, console transport).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
