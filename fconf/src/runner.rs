// SPDX-License-Identifier: MIT

//! Conformance runner: drives the checker over the corpus plan.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::case::{Corpus, PlannedCase, Presence};
use crate::error::InvocationError;
use crate::invoker::{CheckerInvoker, ObservedOutcome};
use crate::report::{CaseReport, RunResult, Verdict};
use crate::table::{ExpectationTable, ExpectedOutcome};

#[derive(Copy, Clone, Debug)]
pub struct RunnerOptions {
    /// Worker threads; 0 and 1 both mean sequential.
    pub jobs: usize,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

/// Text equality is the only pass criterion; exit status is ignored.
pub fn classify(expected: ExpectedOutcome, observed: &ObservedOutcome) -> Verdict {
    if expected.matches(&observed.diagnostic_text) {
        Verdict::Passed
    } else {
        Verdict::Failed {
            expected: expected.message().to_string(),
            actual: observed.diagnostic_text.trim().to_string(),
        }
    }
}

pub struct ConformanceRunner<'a> {
    table: &'a ExpectationTable,
    corpus: &'a Corpus,
    invoker: &'a dyn CheckerInvoker,
    options: RunnerOptions,
}

impl<'a> ConformanceRunner<'a> {
    pub fn new(
        table: &'a ExpectationTable,
        corpus: &'a Corpus,
        invoker: &'a dyn CheckerInvoker,
        options: RunnerOptions,
    ) -> Self {
        Self {
            table,
            corpus,
            invoker,
            options,
        }
    }

    pub fn plan(&self) -> Vec<PlannedCase> {
        self.corpus.plan(self.table)
    }

    pub fn run(&self) -> RunResult {
        self.run_with(|_| {})
    }

    /// Runs every planned case. `observer` sees each report as it completes,
    /// which in parallel mode is not plan order; the returned result always is.
    pub fn run_with<F>(&self, mut observer: F) -> RunResult
    where
        F: FnMut(&CaseReport),
    {
        let plan = self.plan();
        let jobs = self.options.jobs.clamp(1, plan.len().max(1));
        let mut slots: Vec<Option<CaseReport>> = vec![None; plan.len()];

        if jobs == 1 {
            for (slot, planned) in slots.iter_mut().zip(&plan) {
                let report = self.run_case(planned);
                observer(&report);
                *slot = Some(report);
            }
        } else {
            let next = AtomicUsize::new(0);
            let (tx, rx) = mpsc::channel::<(usize, CaseReport)>();

            thread::scope(|s| {
                for _ in 0..jobs {
                    let tx = tx.clone();
                    let next = &next;
                    let plan = &plan;
                    s.spawn(move || {
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            let Some(planned) = plan.get(idx) else {
                                break;
                            };
                            if tx.send((idx, self.run_case(planned))).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(tx);

                for (idx, report) in rx {
                    observer(&report);
                    slots[idx] = Some(report);
                }
            });
        }

        RunResult {
            revision: self.table.revision().to_string(),
            cases: slots.into_iter().flatten().collect(),
        }
    }

    fn run_case(&self, planned: &PlannedCase) -> CaseReport {
        let name = planned.case.name.clone();

        let expected = match planned.presence {
            Presence::MissingImage => return errored(name, InvocationError::ImageNotFound),
            Presence::Unlisted => return errored(name, InvocationError::NoExpectation),
            Presence::Present => match self.table.lookup(&name) {
                Ok(expected) => expected,
                Err(_) => return errored(name, InvocationError::NoExpectation),
            },
        };

        match self.invoker.invoke(&planned.case.image_path) {
            Ok(observed) => CaseReport {
                verdict: classify(expected, &observed),
                exit_status: observed.exit_status,
                diagnostic: Some(observed.diagnostic_text),
                name,
            },
            Err(err) => errored(name, err),
        }
    }
}

fn errored(name: String, err: InvocationError) -> CaseReport {
    CaseReport {
        name,
        verdict: Verdict::InvocationError {
            detail: err.detail(),
        },
        exit_status: None,
        diagnostic: None,
    }
}
