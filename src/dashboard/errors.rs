//! Error types for fetching metrics, publishing dashboards and loading
//! configuration

use derive_more::{Display, Error, From};

/// Failure to obtain the metrics exposition
#[derive(Debug, Display, From, Error)]
pub enum SourceError {
    #[display(fmt = "transport error: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "unexpected status code {}", _0)]
    #[from(ignore)]
    Status(#[error(not(source))] u16),
}

/// Failure to publish a dashboard
#[derive(Debug, Display, From, Error)]
pub enum PublishError {
    #[display(fmt = "transport error: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "unexpected status code {}", _0)]
    #[from(ignore)]
    Status(#[error(not(source))] u16),
}

/// Failure to load a configuration file
#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    #[display(fmt = "could not read config file: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "invalid config file: {}", _0)]
    Parse(toml::de::Error),
}

/// A run stops at the first failing stage
#[derive(Debug, Display, From, Error)]
pub enum RunError {
    #[display(fmt = "metrics source unavailable: {}", _0)]
    SourceUnavailable(SourceError),
    #[display(fmt = "dashboard publish rejected: {}", _0)]
    PublishRejected(PublishError),
}

pub type RunResult<T> = std::result::Result<T, RunError>;

impl SourceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status(code) => Some(*code),
            SourceError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

impl PublishError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PublishError::Status(code) => Some(*code),
            PublishError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let error = RunError::from(PublishError::Status(403));
        let display = format!("{}", error);

        assert!(display.contains("publish rejected"));
        assert!(display.contains("403"));
    }

    #[test]
    fn test_run_error_source_chain() {
        let error = RunError::SourceUnavailable(SourceError::Status(503));

        let source = error.source().unwrap();
        assert_eq!(source.to_string(), "unexpected status code 503");
        assert!(source.source().is_none());
    }

    #[test]
    fn test_status_accessors() {
        assert_eq!(SourceError::Status(500).status(), Some(500));
        assert_eq!(PublishError::Status(401).status(), Some(401));
    }
}
