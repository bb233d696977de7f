use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Every failure is fatal for the run; nothing is retried or skipped.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("no input files match {pattern}")]
    MissingInputFiles { pattern: String },

    #[error("malformed row in {}:{line}: {message}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("{}:{line}: {source}", path.display())]
    InRow {
        path: PathBuf,
        line: u64,
        #[source]
        source: Box<AggregateError>,
    },

    #[error("unknown time unit '{unit}'")]
    UnknownUnit { unit: String },

    #[error(
        "throughput mismatch for group '{group}' value {value}: first saw {expected}, now {found}"
    )]
    ThroughputMismatch {
        group: String,
        value: i64,
        expected: i64,
        found: i64,
    },

    #[error("cannot average an empty sample set")]
    EmptySampleSet,

    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "groups '{first}' and '{second}' would both be written to {}",
        path.display()
    )]
    OutputNameClash {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot list input files: {0}")]
    Discovery(#[from] glob::GlobError),
}

impl AggregateError {
    /// The error underneath any row context.
    pub fn root(&self) -> &AggregateError {
        match self {
            AggregateError::InRow { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_row(self, path: &Path, line: u64) -> Self {
        match self {
            AggregateError::MalformedRow { .. } | AggregateError::InRow { .. } => self,
            other => AggregateError::InRow {
                path: path.to_path_buf(),
                line,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn malformed(path: &Path, line: u64, message: impl Into<String>) -> Self {
        AggregateError::MalformedRow {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn output(path: &Path, source: io::Error) -> Self {
        AggregateError::OutputWriteFailure {
            path: path.to_path_buf(),
            source,
        }
    }
}
