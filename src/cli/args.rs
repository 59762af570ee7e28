use crate::build_info;
use clap::{Args, Parser, Subcommand};

/// Heading used for subcommand listings in help output
const COMMANDS_HEADING: &str = "Available Commands";

/// Command-line arguments for slack-butler
#[derive(Parser, Debug, Clone)]
#[command(name = "slack-butler")]
#[command(about = "A CLI tool for managing Slack workspace channels and checking workspace health")]
#[command(long_about = None)]
#[command(version = build_info::VERSION, long_version = build_info::LONG_VERSION)]
#[command(subcommand_help_heading = COMMANDS_HEADING, arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Slack bot or user token [default: $SLACK_TOKEN, then config file]
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Configuration file path [default: $SLACK_BUTLER_CONFIG, then <config dir>/slack-butler/config.yaml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Slack Web API base URL [default: $SLACK_API_URL, then https://slack.com/api]
    #[arg(long, global = true, value_name = "URL", hide = true)]
    pub api_url: Option<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manage Slack channels
    #[command(subcommand_help_heading = COMMANDS_HEADING, arg_required_else_help = true)]
    Channels {
        #[command(subcommand)]
        command: ChannelsCommand,
    },

    /// Check token validity, OAuth scopes, and API connectivity
    Health(HealthArgs),

    /// Print version, build time, and git commit
    Version,
}

/// `channels` subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChannelsCommand {
    /// List public channels
    List(ListArgs),

    /// Detect channels created recently and optionally announce them
    Detect(DetectArgs),

    /// Warn about and archive inactive channels
    Archive(ArchiveArgs),
}

/// Arguments for `channels list`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Output format: table or json
    #[arg(long, value_name = "FORMAT", default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Include archived channels
    #[arg(long)]
    pub include_archived: bool,
}

/// Arguments for `channels detect`
#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    /// Look-back window in days [default: config detect.since_days, then 8]
    #[arg(long, value_name = "DAYS")]
    pub since: Option<u32>,

    /// Channel (#name or ID) to announce new channels in
    #[arg(long, value_name = "CHANNEL")]
    pub announce_to: Option<String>,

    /// Preview the announcement without posting
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `channels archive`
#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Days without activity before a warning is posted [default: config, then 30]
    #[arg(long, value_name = "DAYS")]
    pub warn_days: Option<u32>,

    /// Days after the warning before the channel is archived [default: config, then 30]
    #[arg(long, value_name = "DAYS")]
    pub archive_days: Option<u32>,

    /// Channel names to leave alone (comma separated, adds to config)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Channel name prefixes to leave alone (comma separated, adds to config)
    #[arg(long, value_name = "PREFIXES", value_delimiter = ',')]
    pub exclude_prefix: Vec<String>,

    /// Preview operations without executing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `health`
#[derive(Args, Debug, Clone)]
pub struct HealthArgs {
    /// Treat warnings (such as missing scopes) as failures
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Whether stdout must stay machine readable
    #[must_use]
    #[inline]
    pub fn wants_json(&self) -> bool {
        matches!(
            self.command,
            Command::Channels {
                command: ChannelsCommand::List(ListArgs { ref format, .. })
            } if format == "json"
        )
    }
}
