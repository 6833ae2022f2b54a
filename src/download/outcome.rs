//! Per-record download results

use crate::state::Record;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a single asset download can fail
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("record has no asset URL")]
    MissingUrl,

    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cancelled before start")]
    Cancelled,
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<tempfile::PathPersistError> for DownloadError {
    fn from(err: tempfile::PathPersistError) -> Self {
        Self::Io(err.error)
    }
}

/// Terminal result of one download attempt
#[derive(Debug)]
pub enum Outcome {
    /// Asset written to `path`
    Success { record: Record, path: PathBuf },

    /// Asset not written; sibling downloads are unaffected
    Failure {
        record: Record,
        reason: DownloadError,
    },
}

impl Outcome {
    pub fn record(&self) -> &Record {
        match self {
            Self::Success { record, .. } | Self::Failure { record, .. } => record,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Success { path, .. } => Some(path),
            Self::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&DownloadError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}

/// All outcomes of one pool invocation, in input order
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub outcomes: Vec<Outcome>,
}

impl DownloadReport {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Failed records with their reasons
    pub fn failures(&self) -> impl Iterator<Item = (&Record, &DownloadError)> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failure { record, reason } => Some((record, reason)),
            Outcome::Success { .. } => None,
        })
    }
}
