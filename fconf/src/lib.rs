// SPDX-License-Identifier: MIT

//! Conformance engine for file-system consistency checkers.
//!
//! A checker reads a raw disk image and either exits quietly or prints one
//! diagnostic line from a closed catalog. `fconf` runs it over a corpus of
//! crafted images and compares every diagnostic against a versioned
//! expectation table.
//!
//! ```no_run
//! use fconf::prelude::*;
//! use std::path::Path;
//!
//! let table = ExpectationTable::builtin();
//! let corpus = Corpus::open(Path::new("tests")).unwrap();
//! let checker = ProcessInvoker::new("./fcheck");
//! let result = ConformanceRunner::new(&table, &corpus, &checker, RunnerOptions::default()).run();
//! println!("{}", result.summary_line());
//! ```

pub mod case;
pub mod catalog;
pub mod error;
pub mod invoker;
pub mod report;
pub mod runner;
pub mod table;

pub use case::{Corpus, PlannedCase, Presence, TestCase};
pub use catalog::FaultKind;
pub use error::{CorpusError, InvocationError, TableError};
pub use invoker::{CheckerInvoker, ObservedOutcome, ProcessInvoker};
pub use report::{CaseReport, RunResult, Verdict};
pub use runner::{ConformanceRunner, RunnerOptions, classify};
pub use table::{BUILTIN_REVISION, Coverage, ExpectationTable, ExpectedOutcome};

pub mod prelude {
    pub use crate::{
        CheckerInvoker, ConformanceRunner, Corpus, ExpectationTable, ExpectedOutcome, FaultKind,
        ProcessInvoker, RunResult, RunnerOptions, Verdict,
    };
}
