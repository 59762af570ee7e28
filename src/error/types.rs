//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for slack-butler operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ButlerError {
    /// Configuration Error - missing token, invalid config file or arguments
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication Error - Slack rejected the token
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// API Error - a Slack Web API call failed
    #[error("Slack API error: {message}")]
    Api { message: String },

    /// Rate Limited - Slack kept answering 429 after all retries
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Health Error - one or more health checks failed
    #[error("Health check failed: {message}")]
    Health { message: String },
}

impl ButlerError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Authentication { .. } => 2,
            Self::Api { .. } => 3,
            Self::RateLimited { .. } => 4,
            Self::Health { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an authentication error
    #[inline]
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an API error
    #[inline]
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a rate limit error
    #[inline]
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Create a health check error
    #[inline]
    pub fn health<S: Into<String>>(message: S) -> Self {
        Self::Health {
            message: message.into(),
        }
    }
}

/// Exit code for an `anyhow` error, defaulting to the configuration code
#[must_use]
#[inline]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ButlerError>()
        .map_or(1, ButlerError::exit_code)
}
