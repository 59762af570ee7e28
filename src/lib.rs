//! `slack-butler` - A CLI tool for managing Slack workspace channels
//!
//! This library lists public channels, detects and announces newly created
//! channels, warns about and archives inactive channels, and checks that a
//! token has the connectivity and scopes those commands need.

pub mod build_info;
pub mod cli;
pub mod config;
pub mod error;
pub mod operations;
pub mod slack;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::Cli;
use system::System;

/// Main entry point for the slack-butler library
///
/// # Errors
///
/// Returns an error if the selected command fails; downcast to
/// [`error::ButlerError`] for the exit code.
#[inline]
pub async fn run(cli: Cli, system: &dyn System) -> Result<()> {
    cli::execute(cli, system).await
}
