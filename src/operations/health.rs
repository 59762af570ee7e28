//! `health`
//!
//! Checks connectivity, token validity and granted OAuth scopes.

use crate::error::ButlerError;
use crate::slack::SlackApi;
use anyhow::Result;
use std::fmt;
use tracing::debug;

/// Scopes the channel commands need
pub const REQUIRED_SCOPES: [&str; 5] = [
    "channels:read",
    "channels:history",
    "channels:join",
    "channels:manage",
    "chat:write",
];

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// One line of the health report
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new<S: Into<String>>(name: &'static str, status: CheckStatus, detail: S) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

/// All checks of a health run
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HealthReport {
    pub checks: Vec<Check>,
}

impl HealthReport {
    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Healthy when nothing failed; in strict mode warnings also count
    #[must_use]
    #[inline]
    pub fn is_healthy(&self, strict: bool) -> bool {
        self.count(CheckStatus::Fail) == 0 && (!strict || self.count(CheckStatus::Warn) == 0)
    }

    /// Turn an unhealthy report into a health error
    ///
    /// # Errors
    ///
    /// Returns a health error if:
    /// - Any check failed, or any check warned while `strict`
    #[inline]
    pub fn into_result(self, strict: bool) -> Result<Self> {
        if self.is_healthy(strict) {
            return Ok(self);
        }
        Err(ButlerError::health(format!(
            "{} failed, {} warning(s)",
            self.count(CheckStatus::Fail),
            self.count(CheckStatus::Warn)
        ))
        .into())
    }
}

impl fmt::Display for HealthReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Slack workspace health")?;
        for check in &self.checks {
            writeln!(f, "  [{}] {}: {}", check.status, check.name, check.detail)?;
        }

        let failed = self.count(CheckStatus::Fail);
        let warnings = self.count(CheckStatus::Warn);
        if failed > 0 {
            write!(f, "Overall: unhealthy ({failed} failed, {warnings} warning(s))")
        } else if warnings > 0 {
            write!(f, "Overall: healthy ({warnings} warning(s))")
        } else {
            write!(f, "Overall: healthy")
        }
    }
}

/// Required scopes not present in `granted`
#[must_use]
#[inline]
pub fn missing_scopes(granted: &[String]) -> Vec<&'static str> {
    REQUIRED_SCOPES
        .iter()
        .copied()
        .filter(|required| !granted.iter().any(|g| g == required))
        .collect()
}

/// Run every health check
///
/// Failures become report entries; this never returns early.
#[inline]
pub async fn run_health_checks(slack: &dyn SlackApi) -> HealthReport {
    let mut checks = Vec::new();

    match slack.api_test().await {
        Ok(()) => checks.push(Check::new(
            "API connectivity",
            CheckStatus::Pass,
            "Slack Web API reachable",
        )),
        Err(err) => checks.push(Check::new(
            "API connectivity",
            CheckStatus::Fail,
            format!("{err:#}"),
        )),
    }

    match slack.auth_test().await {
        Ok(auth) => {
            debug!("Authenticated as {} ({})", auth.user, auth.user_id);
            checks.push(Check::new(
                "Authentication",
                CheckStatus::Pass,
                format!("team {} ({}) as {}", auth.team, auth.team_id, auth.user),
            ));

            let check = if auth.scopes.is_empty() {
                Check::new(
                    "OAuth scopes",
                    CheckStatus::Warn,
                    "Slack did not report granted scopes",
                )
            } else {
                let missing = missing_scopes(&auth.scopes);
                if missing.is_empty() {
                    Check::new(
                        "OAuth scopes",
                        CheckStatus::Pass,
                        format!("all {} required scopes granted", REQUIRED_SCOPES.len()),
                    )
                } else {
                    Check::new(
                        "OAuth scopes",
                        CheckStatus::Warn,
                        format!("missing {}", missing.join(", ")),
                    )
                }
            };
            checks.push(check);
        }
        Err(err) => {
            checks.push(Check::new(
                "Authentication",
                CheckStatus::Fail,
                format!("{err:#}"),
            ));
            checks.push(Check::new(
                "OAuth scopes",
                CheckStatus::Fail,
                "not checked without a valid token",
            ));
        }
    }

    HealthReport { checks }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::slack::MockSlack;

    #[test]
    fn missing_scopes_lists_only_absent_ones() {
        let granted = vec![
            "channels:read".to_owned(),
            "chat:write".to_owned(),
            "users:read".to_owned(),
        ];
        assert_eq!(
            missing_scopes(&granted),
            vec!["channels:history", "channels:join", "channels:manage"]
        );
    }

    #[tokio::test]
    async fn all_green() {
        let slack = MockSlack::new().with_scopes(&REQUIRED_SCOPES).unwrap();
        let report = run_health_checks(&slack).await;
        assert!(report.is_healthy(true));
        assert!(report.to_string().ends_with("Overall: healthy"));
    }

    #[tokio::test]
    async fn missing_scopes_warn_unless_strict() {
        let slack = MockSlack::new().with_scopes(&["channels:read"]).unwrap();
        let report = run_health_checks(&slack).await;
        assert!(report.is_healthy(false));
        assert!(!report.is_healthy(true));
        let err = report.into_result(true).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 5);
    }

    #[tokio::test]
    async fn invalid_token_fails_auth_and_scopes() {
        let slack = MockSlack::new()
            .with_failure("auth.test", "invalid_auth")
            .unwrap();
        let report = run_health_checks(&slack).await;
        let statuses: Vec<CheckStatus> = report.checks.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Fail]
        );
        assert!(report.checks[1].detail.contains("invalid_auth"));
        assert!(!report.is_healthy(false));
    }

    #[tokio::test]
    async fn unreachable_api_fails_connectivity() {
        let slack = MockSlack::new().unreachable().unwrap();
        let report = run_health_checks(&slack).await;
        assert_eq!(report.checks[0].status, CheckStatus::Fail);
        assert!(report.to_string().contains("Overall: unhealthy"));
    }
}
