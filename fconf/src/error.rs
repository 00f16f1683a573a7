// SPDX-License-Identifier: MIT

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Problems building or querying an expectation table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table revision must not be empty")]
    EmptyRevision,
    #[error("invalid case name {0:?}")]
    InvalidCaseName(String),
    #[error("case '{name}' defined more than once for revision '{revision}'")]
    DuplicateCase { revision: String, name: String },
    #[error("case '{case}': '{value}' is not in the fault catalog")]
    UnknownFault { case: String, value: String },
    #[error("case '{0}' must set exactly one of `expect` or `message`")]
    AmbiguousExpectation(String),
    #[error("no expectation for case '{0}'")]
    UnknownCase(String),
    #[error("cannot read table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed table: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal problems with the image corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot read corpus directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corpus path {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// A case could not be put in front of the checker.
///
/// This never means the checker reported a fault: a non-zero exit with a
/// diagnostic is a normal [`crate::ObservedOutcome`].
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("checker binary not found: {0}")]
    NotFound(PathBuf),
    #[error("permission denied running checker: {0}")]
    PermissionDenied(PathBuf),
    #[error("failed to spawn checker: {0}")]
    Spawn(#[source] io::Error),
    #[error("cannot capture checker output: {0}")]
    Capture(#[source] io::Error),
    #[error("lost track of checker process: {0}")]
    Wait(#[source] io::Error),
    #[error("checker timed out after {after:?}")]
    TimedOut { after: Duration },
    #[error("image not found")]
    ImageNotFound,
    #[error("no expectation for case")]
    NoExpectation,
}

impl InvocationError {
    pub fn detail(&self) -> String {
        self.to_string()
    }

    pub(crate) fn from_spawn(binary: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => InvocationError::NotFound(binary),
            io::ErrorKind::PermissionDenied => InvocationError::PermissionDenied(binary),
            _ => InvocationError::Spawn(err),
        }
    }
}
