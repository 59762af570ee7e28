//! # slack-butler
//!
//! `slack-butler` keeps a Slack workspace tidy from the command line.
//!
//! ## Features
//! - List public channels as a table or JSON.
//! - Detect channels created in the last N days and announce them.
//! - Warn about inactive channels and archive them after a grace period.
//! - Check API connectivity, token validity and OAuth scopes.
//!
//! ## Usage
//!
//! ```sh
//! export SLACK_TOKEN=xoxb-...
//! slack-butler health
//! slack-butler channels detect --since 7 --announce-to "#general"
//! slack-butler channels archive --warn-days 30 --archive-days 14 --dry-run
//! ```
//!
//! See `slack-butler --help` for all options.

use clap::Parser as _;
use slack_butler::cli::{Cli, parse_error_exit_code, unknown_command_message};
use slack_butler::error::exit_code_for;
use slack_butler::system::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if let Some(message) = unknown_command_message(&err) {
                eprintln!("{message}");
            } else {
                let _ = err.print();
            }
            std::process::exit(parse_error_exit_code(&err));
        }
    };

    // Keep stdout clean for JSON output; logs always go to stderr
    let log_level = if cli.global.verbose {
        "debug"
    } else if cli.wants_json() {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slack_butler={log_level},warn")));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    match slack_butler::run(cli, &system).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}
