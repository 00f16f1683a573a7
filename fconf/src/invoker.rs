// SPDX-License-Identifier: MIT

//! Runs the checker once per image and captures what it reports.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::InvocationError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What one checker run produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObservedOutcome {
    /// `None` when the process died from a signal.
    pub exit_status: Option<i32>,
    /// Error stream, trimmed.
    pub diagnostic_text: String,
}

impl ObservedOutcome {
    pub fn new(exit_status: Option<i32>, stderr: &[u8]) -> Self {
        Self {
            exit_status,
            diagnostic_text: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    fn from_status(status: ExitStatus, stderr: &[u8]) -> Self {
        Self::new(status.code(), stderr)
    }
}

/// Narrow seam between the runner and the checker process.
///
/// A non-zero exit is a normal outcome. Only failing to run the checker at all
/// is an error.
pub trait CheckerInvoker: Send + Sync {
    fn invoke(&self, image: &Path) -> Result<ObservedOutcome, InvocationError>;
}

/// Spawns the checker binary with the image path as its only argument.
#[derive(Clone, Debug)]
pub struct ProcessInvoker {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves the binary the way the spawn will: a bare name goes through
    /// `PATH`, anything with a separator is taken as a path.
    pub fn preflight(&self) -> Result<PathBuf, InvocationError> {
        let is_bare = self.binary.components().count() == 1
            && !self.binary.to_string_lossy().starts_with('.');
        if is_bare {
            return which::which(&self.binary)
                .map_err(|_| InvocationError::NotFound(self.binary.clone()));
        }
        if !self.binary.is_file() {
            return Err(InvocationError::NotFound(self.binary.clone()));
        }
        Ok(self.binary.clone())
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image).stdin(Stdio::null()).stdout(Stdio::null());
        cmd
    }

    fn spawn_error(&self, err: std::io::Error) -> InvocationError {
        InvocationError::from_spawn(self.binary.clone(), err)
    }

    fn invoke_blocking(&self, image: &Path) -> Result<ObservedOutcome, InvocationError> {
        let output = self
            .command(image)
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        Ok(ObservedOutcome::from_status(output.status, &output.stderr))
    }

    /// stderr goes to an unnamed temp file so a chatty checker cannot block
    /// on a full pipe while we poll.
    fn invoke_with_deadline(
        &self,
        image: &Path,
        timeout: Duration,
    ) -> Result<ObservedOutcome, InvocationError> {
        let log = tempfile::tempfile().map_err(InvocationError::Capture)?;
        let sink = log.try_clone().map_err(InvocationError::Capture)?;

        let mut child = self
            .command(image)
            .stderr(Stdio::from(sink))
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let started_at = Instant::now();
        let status = loop {
            match child.try_wait().map_err(InvocationError::Wait)? {
                Some(status) => break status,
                None if started_at.elapsed() >= timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(InvocationError::TimedOut { after: timeout });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let stderr = read_back(log)?;
        Ok(ObservedOutcome::from_status(status, &stderr))
    }
}

fn read_back(mut log: File) -> Result<Vec<u8>, InvocationError> {
    let mut stderr = Vec::new();
    log.seek(SeekFrom::Start(0))
        .and_then(|_| log.read_to_end(&mut stderr))
        .map_err(InvocationError::Capture)?;
    Ok(stderr)
}

impl CheckerInvoker for ProcessInvoker {
    fn invoke(&self, image: &Path) -> Result<ObservedOutcome, InvocationError> {
        match self.timeout {
            Some(timeout) => self.invoke_with_deadline(image, timeout),
            None => self.invoke_blocking(image),
        }
    }
}
