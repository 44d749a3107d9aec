//! Error types for ratefetch
//!
//! Every failure is tagged with the stage it happened in: rate-limit
//! configuration, the HTTP request, destination creation or the copy itself.

use std::fmt;
use std::path::PathBuf;

use crate::core::rate::RATE_TIERS;

/// Suggest the closest known rate-limit label for a mistyped one
///
/// Only used to decorate the error message; resolution never succeeds on a
/// near miss.
pub fn suggest_rate_limit(label: &str) -> Option<String> {
    let max_distance = (label.len() / 2).clamp(1, 2);

    RATE_TIERS
        .iter()
        .map(|(known, _)| (*known, strsim::levenshtein(&label.to_lowercase(), &known.to_lowercase())))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(known, _)| known.to_string())
}

/// Main error type for ratefetch operations
#[derive(Debug)]
pub enum Error {
    /// Rate-limit label outside the closed set of tiers
    InvalidRateLimit {
        label: String,
        suggestion: Option<String>,
    },

    /// Request could not be issued or the server answered with a non-success status
    SourceUnavailable(String),

    /// Destination file could not be created
    SinkUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Read, write or rate-limit wait failed mid-copy
    TransferFailed(std::io::Error),
}

impl Error {
    pub(crate) fn invalid_rate_limit(label: &str) -> Self {
        Error::InvalidRateLimit {
            label: label.to_string(),
            suggestion: suggest_rate_limit(label),
        }
    }

    pub(crate) fn sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SinkUnavailable {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRateLimit { label, suggestion } => {
                write!(
                    f,
                    "Invalid rate limit '{}': --rate-limit must be either '300k' or '700k' or '2M'",
                    label
                )?;
                if let Some(suggestion) = suggestion {
                    write!(f, ". Did you mean '{}'?", suggestion)?;
                }
                Ok(())
            }
            Error::SourceUnavailable(msg) => {
                write!(f, "Source unavailable: {}", msg)
            }
            Error::SinkUnavailable { path, source } => {
                write!(f, "Failed to create file {}: {}", path.display(), source)
            }
            Error::TransferFailed(err) => {
                write!(f, "Download failed: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SinkUnavailable { source, .. } => Some(source),
            Error::TransferFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::SourceUnavailable(format!("network error: {err}"))
        } else {
            Error::SourceUnavailable(err.to_string())
        }
    }
}

/// Convenience result type for ratefetch operations
pub type Result<T> = std::result::Result<T, Error>;
