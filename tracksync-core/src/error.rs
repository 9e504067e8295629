//! Error types for tracksync-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which remote system an [`ApiError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Github,
    Tracker,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Github => write!(f, "github"),
            Service::Tracker => write!(f, "tracker"),
        }
    }
}

/// Failures talking to GitHub or Pivotal Tracker.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{service} api {operation} failed with status {status}: {body}")]
    Status {
        service: Service,
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// 401: the configured token was rejected.
    #[error("{service} api rejected the token during {operation}")]
    Unauthorized {
        service: Service,
        operation: &'static str,
    },

    /// Connection, DNS or TLS failure before a status was received.
    #[error("{service} api {operation} request failed: {message}")]
    Transport {
        service: Service,
        operation: &'static str,
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("failed to decode {service} {operation} response: {source}")]
    Decode {
        service: Service,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// All errors that can arise from config loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.tracksync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// `init` refused to overwrite an existing file.
    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// A required setting was provided by neither flag, env nor config file.
    #[error("must specify {0}")]
    Missing(&'static str),

    /// A `NAME:COLOR` label declaration could not be parsed.
    #[error("invalid label declaration '{0}'; expected NAME:COLOR with a 6-digit hex color")]
    InvalidLabel(String),
}
