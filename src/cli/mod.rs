//! Command-line interface parsing and handling
//!
//! Parses arguments, loads configuration, installs logging and then hands
//! control to the chat loop (or prints the effective settings).

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::HttpChatClient;
use crate::core::config::{Config, TOKEN_ENV_VAR};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{default_log_path, init_logging, LOG_ENV_VAR};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version = VERSION)]
#[command(about = "A full-screen terminal client for team chat servers")]
#[command(
    long_about = "Parley is a full-screen terminal client for Mattermost-compatible chat servers.\n\n\
Environment Variables:\n\
  PARLEY_TOKEN      Personal access token (overrides the config file)\n\
  PARLEY_LOG        Log filter, e.g. 'debug' or 'parley::core=trace'\n\
  EDITOR            Program used by Meta+K (defaults to vi)\n\n\
Controls:\n\
  Enter             Send the message (inserts a newline in multi-line mode)\n\
  Meta+Enter        Send the message in any mode\n\
  Meta+E            Toggle multi-line editing\n\
  Meta+K            Edit the message in $EDITOR\n\
  Meta+P            Toggle the message preview\n\
  Tab               Complete @usernames\n\
  Ctrl+K / Ctrl+U   Kill to end / start of line; Ctrl+Y yanks it back\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL, e.g. https://chat.example.com
    #[arg(short = 's', long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Channel id to post into
    #[arg(long, global = true, value_name = "CHANNEL_ID")]
    pub channel: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable automatic pairing of `*`, `` ` `` and `_`
    #[arg(long, global = true)]
    pub no_smart_backtick: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive client (default)
    Chat,
    /// Print the effective configuration and exit
    Config,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StartupError {
    MissingServer,
    MissingToken,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::MissingServer => write!(
                f,
                "No server configured. Set server_url in the config file or pass --server."
            ),
            StartupError::MissingToken => write!(
                f,
                "No access token configured. Set {TOKEN_ENV_VAR} or token in the config file."
            ),
        }
    }
}

impl Error for StartupError {}

/// Layers command-line flags over the loaded file.
pub fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(server) = &args.server {
        config.server_url = Some(server.clone());
    }
    if let Some(channel) = &args.channel {
        config.channel_id = Some(channel.clone());
    }
    if args.no_smart_backtick {
        config.smart_backtick = false;
    }
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_from_path(&path)?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn connection(config: &Config) -> Result<(String, String), StartupError> {
    let server = config
        .server_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .ok_or(StartupError::MissingServer)?;
    let token = config.resolve_token().ok_or(StartupError::MissingToken)?;
    Ok((server, token))
}

fn print_config(config: &Config, args: &Args) {
    let masked = |value: Option<String>| match value {
        Some(_) => "(set)".to_string(),
        None => "(unset)".to_string(),
    };
    println!("server_url          = {}", config.server_url.as_deref().unwrap_or("(unset)"));
    println!("channel_id          = {}", config.channel_id.as_deref().unwrap_or("(unset)"));
    println!("token               = {}", masked(config.resolve_token()));
    println!("smart_backtick      = {}", config.smart_backtick);
    println!("task_workers        = {}", config.task_workers);
    println!("max_client_messages = {}", config.max_client_messages);
    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    println!("log file            = {} ({LOG_ENV_VAR} sets the filter)", log_path.display());
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.command == Some(Commands::Config) {
        print_config(&config, &args);
        return Ok(());
    }

    let (server, token) = connection(&config)?;
    let log_path = init_logging(args.log_file.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        info!(server = %server, log = %log_path.display(), version = VERSION, "starting parley");
        let client = Arc::new(HttpChatClient::new(&server, token));
        run_chat(config, client).await
    })
}

#[cfg(test)]
mod tests;
