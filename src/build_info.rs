//! Build metadata injected at compile time by `build.rs`

/// Release version, `dev` for unreleased builds
pub const VERSION: &str = env!("BUTLER_BUILD_VERSION");

/// Build timestamp, `unknown` unless set by the release pipeline
pub const BUILD_TIME: &str = env!("BUTLER_BUILD_TIME");

/// Source commit hash, `unknown` unless set by the release pipeline
pub const GIT_COMMIT: &str = env!("BUTLER_BUILD_GIT_COMMIT");

/// Version text shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("BUTLER_BUILD_VERSION"),
    "\ncommit: ",
    env!("BUTLER_BUILD_GIT_COMMIT"),
    "\nbuilt:  ",
    env!("BUTLER_BUILD_TIME"),
);

/// Render the output of the `version` subcommand
#[must_use]
#[inline]
pub fn version_report() -> String {
    format!("slack-butler {VERSION}\n  commit: {GIT_COMMIT}\n  built:  {BUILD_TIME}")
}
