//! Build script injecting release metadata
//!
//! Release pipelines set `SLACK_BUTLER_VERSION`, `SLACK_BUTLER_BUILD_TIME` and
//! `SLACK_BUTLER_GIT_COMMIT`; local builds fall back to `dev`/`unknown`.

use std::env;

fn metadata(key: &str, fallback: &str) -> String {
    println!("cargo:rerun-if-env-changed={key}");
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

fn main() {
    let version = metadata("SLACK_BUTLER_VERSION", "dev");
    let build_time = metadata("SLACK_BUTLER_BUILD_TIME", "unknown");
    let git_commit = metadata("SLACK_BUTLER_GIT_COMMIT", "unknown");

    println!("cargo:rustc-env=BUTLER_BUILD_VERSION={version}");
    println!("cargo:rustc-env=BUTLER_BUILD_TIME={build_time}");
    println!("cargo:rustc-env=BUTLER_BUILD_GIT_COMMIT={git_commit}");
}
