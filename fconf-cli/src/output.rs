// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use colored::Colorize;
use fconf::{CaseReport, ExpectationTable, ExpectedOutcome, FaultKind, RunResult, Verdict};
use serde::Serialize;

use crate::utils::{LogLevel, log_level};

/// Per-case lines in plan order, then the detail block and summary.
pub fn print_run(result: &RunResult) {
    let quiet = log_level() == LogLevel::Quiet;

    for case in &result.cases {
        match &case.verdict {
            Verdict::Passed if quiet => {}
            Verdict::Passed => {
                println!("{}  {}", "PASS".green().bold(), case.name);
                print_exit_note(case);
            }
            Verdict::Failed { .. } => println!("{}  {}", "FAIL".red().bold(), case.name),
            Verdict::InvocationError { .. } => {
                println!("{} {}", "ERROR".magenta().bold(), case.name)
            }
        }
    }

    if !result.all_passed() {
        println!();
        println!(
            "{} mismatch(es), {} invocation error(s):",
            result.mismatches(),
            result.invocation_errors()
        );
        for case in result.failures() {
            print_failure(case);
        }
    }

    println!();
    let summary = result.summary_line();
    if result.all_passed() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}

fn print_failure(case: &CaseReport) {
    println!("{case}");
    print_exit_note(case);
}

fn print_exit_note(case: &CaseReport) {
    if case.exit_disagrees() {
        println!(
            "      note: exit status {:?} disagrees with diagnostic",
            case.exit_status
        );
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: usize,
    total: usize,
    summary: String,
    #[serde(flatten)]
    result: &'a RunResult,
}

pub fn write_json_report(result: &RunResult, path: &Path) -> anyhow::Result<()> {
    let report = JsonReport {
        passed: result.passed(),
        total: result.total(),
        summary: result.summary_line(),
        result,
    };
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Box-drawn view of an expectation table.
pub struct TableSummary<'a>(pub &'a ExpectationTable);

impl core::fmt::Display for TableSummary<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let table = self.0;
        writeln!(f, "\n  revision: {}", table.revision())?;
        writeln!(
            f,
            "  ┌────┬──────────────┬───────┬────────────────────────────────────────────────────────────┐"
        )?;
        writeln!(
            f,
            "  | Id | Case         | Check | Expected diagnostic                                        |"
        )?;
        writeln!(
            f,
            "  ├────┼──────────────┼───────┼────────────────────────────────────────────────────────────┤"
        )?;
        for (i, (name, outcome)) in table.iter().enumerate() {
            let check = match outcome {
                ExpectedOutcome::Clean => "-".to_string(),
                ExpectedOutcome::Faulty(kind) => kind.check_number().to_string(),
            };
            let message = match outcome {
                ExpectedOutcome::Clean => "(clean)",
                ExpectedOutcome::Faulty(kind) => kind.message(),
            };
            writeln!(
                f,
                "  | {i:<2} | {n:<12} | {check:>5} | {message:<58} |",
                n = name.get(..12).unwrap_or(name),
            )?;
        }
        writeln!(
            f,
            "  └────┴──────────────┴───────┴────────────────────────────────────────────────────────────┘"
        )
    }
}

pub fn print_catalog() {
    for kind in FaultKind::ALL {
        println!(
            "{:>2}  {:<28} {}",
            kind.check_number(),
            kind.key(),
            kind.message()
        );
    }
}
