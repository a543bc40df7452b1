//! Binary entrypoint for the utilbot CLI.
//!
//! Commands:
//! - `start` - run the bot on the console transport (stdin/stdout)
//! - `init` - write a starter `config.toml`
//! - `status` - print the effective configuration summary
//!
//! See the library crate docs for module‑level details: `utilbot::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;

use utilbot::bot::BotServer;
use utilbot::config::Config;
use utilbot::transport::ConsoleTransport;

#[derive(Parser)]
#[command(name = "utilbot")]
#[command(about = "A conversational utility bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot, reading updates from stdin and printing replies to stdout
    Start,
    /// Write a default configuration file
    Init,
    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Start => {
            let config = load_config(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting utilbot v{}", env!("CARGO_PKG_VERSION"));

            let transport = ConsoleTransport::new();
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            transport.spawn_reader(tx);

            let mut bot = BotServer::new(config, Arc::new(transport))?;
            bot.run(rx).await?;
        }
        Commands::Status => {
            let config = load_config(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let bot = BotServer::new(config, Arc::new(ConsoleTransport::new()))?;
            println!("{}", bot.status_summary());
        }
    }

    Ok(())
}

async fn load_config(path: &str) -> Result<Config> {
    let mut config = Config::load(path).await?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());

    match log_file {
        Some(f) => {
            let file = std::sync::Mutex::new(f);
            // stdout carries bot replies in console mode; logs go to stderr only when it is a terminal
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if record.target() == "security" {
                    if let Some(ref sec_path) = security_path {
                        if let Ok(mut sf) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(sec_path)
                        {
                            let _ = writeln!(sf, "{}", line);
                        }
                    }
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
