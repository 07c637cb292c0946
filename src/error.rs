// src/error.rs
//! Top-level error type of the harness
//!
//! Each layer keeps its own error enum ([`ProfileError`] for the store,
//! [`ConfigError`] for the table parsers); [`HarnessError`] wraps them so a
//! session or the command line runner can propagate everything with `?`.

use crate::config::ConfigError;
use crate::profile::ProfileError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Phase of a harness session, used to tag errors for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Settings,
    ProfileLoad,
    Parse,
    Registration,
    Run,
    Report,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Settings => "settings",
            Phase::ProfileLoad => "profile load",
            Phase::Parse => "configuration parse",
            Phase::Registration => "test registration",
            Phase::Run => "test run",
            Phase::Report => "report",
        };
        f.write_str(name)
    }
}

/// Unified error type for harness sessions
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("[SETTINGS] {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("[PROFILE] {0}")]
    Profile(#[from] ProfileError),

    #[error("[CONFIG] {0}")]
    Config(#[from] ConfigError),

    #[error("[REGISTRATION] {0}")]
    Registration(String),

    #[error("[IO] {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[REPORT] {0}")]
    Report(#[from] serde_json::Error),

    #[error("[SESSION] {operation} is not valid after the session was closed")]
    Closed { operation: &'static str },
}

impl HarnessError {
    /// Session phase the error belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            HarnessError::Settings(_) => Phase::Settings,
            HarnessError::Profile(_) => Phase::ProfileLoad,
            HarnessError::Config(_) => Phase::Parse,
            HarnessError::Registration(_) => Phase::Registration,
            HarnessError::Closed { .. } => Phase::Run,
            HarnessError::Io { .. } | HarnessError::Report(_) => Phase::Report,
        }
    }

    /// Whether the error happened before any test case ran.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self.phase(),
            Phase::Settings | Phase::ProfileLoad | Phase::Parse | Phase::Registration
        )
    }
}

/// Result type alias for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Attach a path to I/O failures.
pub trait IoContext<T> {
    fn with_path<P: Into<PathBuf>>(self, path: P) -> HarnessResult<T>;
}

impl<T> IoContext<T> for Result<T, std::io::Error> {
    fn with_path<P: Into<PathBuf>>(self, path: P) -> HarnessResult<T> {
        self.map_err(|source| HarnessError::Io {
            path: path.into(),
            source,
        })
    }
}
