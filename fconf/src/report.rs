// SPDX-License-Identifier: MIT

use core::fmt;

use serde::Serialize;

/// Verdict for one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed { expected: String, actual: String },
    InvocationError { detail: String },
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Verdict::Passed => "PASS",
            Verdict::Failed { .. } => "FAIL",
            Verdict::InvocationError { .. } => "ERROR",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub verdict: Verdict,
    /// Only set when the checker actually ran.
    pub exit_status: Option<i32>,
    /// Trimmed error stream, when the checker actually ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CaseReport {
    /// Exit status and diagnostic tell different stories.
    ///
    /// Never affects the verdict, which is decided by text alone.
    pub fn exit_disagrees(&self) -> bool {
        match (self.exit_status, &self.diagnostic) {
            (Some(code), Some(text)) => (code == 0) == !text.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Passed => write!(f, "PASS  {}", self.name),
            Verdict::Failed { expected, actual } => {
                writeln!(f, "FAIL  {}", self.name)?;
                writeln!(f, "      expected: {}", quoted(expected))?;
                write!(f, "      actual:   {}", quoted(actual))
            }
            Verdict::InvocationError { detail } => {
                write!(f, "ERROR {} (invocation: {detail})", self.name)
            }
        }
    }
}

fn quoted(s: &str) -> String {
    if s.is_empty() {
        "<no diagnostic>".to_string()
    } else {
        format!("{s:?}")
    }
}

/// Outcome of a full harness run, in plan order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub revision: String,
    pub cases: Vec<CaseReport>,
}

impl RunResult {
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            cases: Vec::new(),
        }
    }

    pub fn push(&mut self, report: CaseReport) {
        self.cases.push(report)
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.verdict.is_passed()).count()
    }

    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.verdict.is_passed())
    }

    pub fn mismatches(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.verdict, Verdict::Failed { .. }))
            .count()
    }

    pub fn invocation_errors(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.verdict, Verdict::InvocationError { .. }))
            .count()
    }

    pub fn summary_line(&self) -> String {
        format!("{} / {} tests passed", self.passed(), self.total())
    }
}
