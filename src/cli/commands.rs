//! CLI command implementations

use crate::build_info;
use crate::cli::{ArchiveArgs, ChannelsCommand, Cli, Command, DetectArgs, ListArgs};
use crate::config::validation::{parse_channel_ref, validate_channel_name, validate_days};
use crate::config::{DEFAULT_ARCHIVE_DAYS, DEFAULT_SINCE_DAYS, DEFAULT_WARN_DAYS, Settings};
use crate::error::ButlerError;
use crate::operations::{
    ArchiveOptions, ArchivePolicy, DetectOptions, OutputFormat, archive_inactive_channels,
    detect_new_channels, list_channels, render_channels, run_health_checks,
};
use crate::slack::SlackClient;
use crate::system::System;
use crate::utils::time::now_unix;
use anyhow::Result;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use tracing::info;

/// Message for an unrecognized subcommand, `None` for any other parse error
#[must_use]
#[inline]
pub fn unknown_command_message(err: &clap::Error) -> Option<String> {
    if err.kind() != ErrorKind::InvalidSubcommand {
        return None;
    }

    let name = match err.get(ContextKind::InvalidSubcommand) {
        Some(ContextValue::String(name)) => name.clone(),
        _ => String::new(),
    };

    Some(format!(
        "Error: unknown command \"{name}\" for \"slack-butler\"\n\
        Run 'slack-butler --help' for usage."
    ))
}

/// Exit code for a parse error
///
/// Help and version requests succeed; usage errors are configuration errors.
#[must_use]
#[inline]
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

/// Execute the parsed command
///
/// # Errors
///
/// Returns an error if:
/// - Settings cannot be resolved
/// - The command itself fails
#[inline]
pub async fn execute(cli: Cli, system: &dyn System) -> Result<()> {
    match cli.command {
        Command::Version => {
            println!("{}", build_info::version_report());
            Ok(())
        }
        Command::Health(ref args) => {
            let settings = Settings::resolve(system, &cli.global)?;
            let client = SlackClient::new(&settings.api_url, &settings.token)?;
            let report = run_health_checks(&client).await;
            println!("{report}");
            report.into_result(args.strict)?;
            Ok(())
        }
        Command::Channels { ref command } => {
            let settings = Settings::resolve(system, &cli.global)?;
            let client = SlackClient::new(&settings.api_url, &settings.token)?;
            match *command {
                ChannelsCommand::List(ref args) => execute_list(&client, args).await,
                ChannelsCommand::Detect(ref args) => {
                    execute_detect(&client, &settings, args).await
                }
                ChannelsCommand::Archive(ref args) => {
                    execute_archive(&client, &settings, args).await
                }
            }
        }
    }
}

async fn execute_list(client: &SlackClient, args: &ListArgs) -> Result<()> {
    let format = args
        .format
        .parse::<OutputFormat>()
        .map_err(ButlerError::configuration)?;
    let channels = list_channels(client, args.include_archived).await?;
    println!("{}", render_channels(&channels, format)?);
    Ok(())
}

/// Merge `channels detect` flags over the config file
///
/// # Errors
///
/// Returns a configuration error if:
/// - The day window is out of range
/// - The announce channel is not a valid reference
#[inline]
pub fn detect_options(settings: &Settings, args: &DetectArgs) -> Result<DetectOptions> {
    let since_days = args
        .since
        .or(settings.config.detect.since_days)
        .unwrap_or(DEFAULT_SINCE_DAYS);
    validate_days("--since", since_days).map_err(|e| ButlerError::configuration(e.to_string()))?;

    let announce_to = args
        .announce_to
        .as_deref()
        .or(settings.config.detect.announce_to.as_deref())
        .map(parse_channel_ref)
        .transpose()
        .map_err(|e| ButlerError::configuration(format!("--announce-to: {e}")))?;

    Ok(DetectOptions::new(since_days, announce_to, args.dry_run))
}

async fn execute_detect(
    client: &SlackClient,
    settings: &Settings,
    args: &DetectArgs,
) -> Result<()> {
    let options = detect_options(settings, args)?;
    let report = detect_new_channels(client, now_unix(), &options).await?;
    println!("{report}");
    Ok(())
}

/// Merge `channels archive` flags over the config file
///
/// Exclusion lists from flags are added to those from the config file.
///
/// # Errors
///
/// Returns a configuration error if:
/// - A day window is out of range
/// - An excluded channel name is invalid
#[inline]
pub fn archive_options(settings: &Settings, args: &ArchiveArgs) -> Result<ArchiveOptions> {
    let archive = &settings.config.archive;
    let warn_days = args
        .warn_days
        .or(archive.warn_days)
        .unwrap_or(DEFAULT_WARN_DAYS);
    let archive_days = args
        .archive_days
        .or(archive.archive_days)
        .unwrap_or(DEFAULT_ARCHIVE_DAYS);
    validate_days("--warn-days", warn_days)
        .and_then(|()| validate_days("--archive-days", archive_days))
        .map_err(|e| ButlerError::configuration(e.to_string()))?;

    let mut exclude = archive.exclude.clone();
    for name in args.exclude.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        validate_channel_name(name.trim_start_matches('#'))
            .map_err(|e| ButlerError::configuration(format!("--exclude: {e}")))?;
        exclude.push(name.to_owned());
    }
    let mut exclude_prefixes = archive.exclude_prefixes.clone();
    exclude_prefixes.extend(
        args.exclude_prefix
            .iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty()),
    );

    let policy = ArchivePolicy::new(warn_days, archive_days)
        .with_exclude(exclude)
        .with_exclude_prefixes(exclude_prefixes)
        .with_warning_message(archive.warning_message.clone());

    Ok(ArchiveOptions::new(policy, args.dry_run))
}

async fn execute_archive(
    client: &SlackClient,
    settings: &Settings,
    args: &ArchiveArgs,
) -> Result<()> {
    let options = archive_options(settings, args)?;
    if options.dry_run {
        info!("Dry run preview - no channels will be modified");
    }
    let report = archive_inactive_channels(client, now_unix(), &options).await?;
    println!("{report}");
    report.into_result()?;
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::cli::GlobalArgs;
    use crate::config::validation::ChannelRef;
    use crate::system::MockSystem;
    use clap::Parser as _;

    fn settings(config_yaml: &str) -> Settings {
        let system = MockSystem::new()
            .with_env("SLACK_TOKEN", "xoxb-test")
            .unwrap()
            .with_file("/home/user/.config/slack-butler/config.yaml", config_yaml.as_bytes())
            .unwrap();
        Settings::resolve(&system, &GlobalArgs::default()).unwrap()
    }

    #[test]
    fn unknown_subcommand_message() {
        let err = Cli::try_parse_from(["slack-butler", "nonexistent-command"]).unwrap_err();
        let message = unknown_command_message(&err).unwrap();
        assert!(message.contains("unknown command \"nonexistent-command\""));
        assert_eq!(parse_error_exit_code(&err), 1);
    }

    #[test]
    fn unknown_nested_subcommand_message() {
        let err = Cli::try_parse_from(["slack-butler", "channels", "purge"]).unwrap_err();
        assert!(unknown_command_message(&err).unwrap().contains("\"purge\""));
    }

    #[test]
    fn other_parse_errors_are_not_unknown_commands() {
        let err = Cli::try_parse_from(["slack-butler", "health", "--bogus"]).unwrap_err();
        assert!(unknown_command_message(&err).is_none());
        assert_eq!(parse_error_exit_code(&err), 1);
    }

    #[test]
    fn help_and_version_exit_zero() {
        let err = Cli::try_parse_from(["slack-butler", "--help"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&err), 0);
        let err = Cli::try_parse_from(["slack-butler", "--version"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&err), 0);
    }

    #[test]
    fn detect_flags_override_config() {
        let settings = settings("detect:\n  since_days: 3\n  announce_to: \"#general\"\n");
        let args = DetectArgs {
            since: Some(14),
            announce_to: None,
            dry_run: true,
        };
        let options = detect_options(&settings, &args).unwrap();
        assert_eq!(options.since_days, 14);
        assert_eq!(
            options.announce_to,
            Some(ChannelRef::Name("general".to_owned()))
        );
        assert!(options.dry_run);
    }

    #[test]
    fn detect_defaults_without_config() {
        let settings = settings("");
        let args = DetectArgs {
            since: None,
            announce_to: None,
            dry_run: false,
        };
        let options = detect_options(&settings, &args).unwrap();
        assert_eq!(options.since_days, DEFAULT_SINCE_DAYS);
        assert!(options.announce_to.is_none());
    }

    #[test]
    fn detect_rejects_zero_days() {
        let settings = settings("");
        let args = DetectArgs {
            since: Some(0),
            announce_to: None,
            dry_run: false,
        };
        let err = detect_options(&settings, &args).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 1);
    }

    #[test]
    fn archive_exclusions_accumulate() {
        let settings = settings("archive:\n  warn_days: 60\n  exclude: [general]\n");
        let args = ArchiveArgs {
            warn_days: None,
            archive_days: Some(7),
            exclude: vec!["random".to_owned()],
            exclude_prefix: vec!["ext-".to_owned(), " ".to_owned()],
            dry_run: true,
        };
        let options = archive_options(&settings, &args).unwrap();
        assert_eq!(options.policy.warn_days, 60);
        assert_eq!(options.policy.archive_days, 7);
        assert_eq!(options.policy.exclude, vec!["general", "random"]);
        assert_eq!(options.policy.exclude_prefixes, vec!["ext-"]);
    }

    #[test]
    fn archive_rejects_invalid_excluded_names() {
        let settings = settings("");
        let args = ArchiveArgs {
            warn_days: None,
            archive_days: None,
            exclude: vec!["#ok-name".to_owned(), "Random".to_owned()],
            exclude_prefix: Vec::new(),
            dry_run: true,
        };
        let err = archive_options(&settings, &args).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 1);
        assert!(err.to_string().contains("--exclude"));
        assert!(err.to_string().contains("'Random'"));

        let args = ArchiveArgs {
            exclude: vec!["#ok-name".to_owned(), String::new()],
            ..args
        };
        let options = archive_options(&settings, &args).unwrap();
        assert_eq!(options.policy.exclude, vec!["ok-name"]);
    }
}
