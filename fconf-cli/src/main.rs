// SPDX-License-Identifier: MIT

mod output;
mod utils;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fconf::prelude::*;

use crate::output::TableSummary;
use crate::utils::{LogLevel, set_log_level};

#[derive(Parser)]
#[command(name = "fconf", version, about = "File-system checker conformance harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only print failures and the summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print per-invocation details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the checker over every image in the corpus
    Run {
        /// Directory holding one disk image per case
        #[arg(short, long, default_value = "tests")]
        corpus: PathBuf,

        /// Checker binary, invoked as `<checker> <image>`
        #[arg(short = 'x', long, default_value = "./fcheck")]
        checker: PathBuf,

        #[command(flatten)]
        table: TableArg,

        /// Abort an invocation after N seconds
        #[arg(short, long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Run up to N cases concurrently
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,

        /// Also write the run result as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Print the expectation table
    Table {
        #[command(flatten)]
        table: TableArg,
    },
    /// Print the fault catalog in checker order
    Catalog,
}

#[derive(Args)]
struct TableArg {
    /// Expectation table (TOML); defaults to the builtin revision
    #[arg(long = "table", value_name = "FILE")]
    path: Option<PathBuf>,
}

impl TableArg {
    fn load(&self) -> anyhow::Result<ExpectationTable> {
        let table = match &self.path {
            Some(path) => ExpectationTable::from_file(path)
                .with_context(|| format!("loading expectation table {}", path.display()))?,
            None => ExpectationTable::builtin(),
        };
        crate::log_verbose!(
            "Expectation table '{}' with {} case(s)",
            table.revision(),
            table.len()
        );
        warn_on_coverage_gaps(&table);
        Ok(table)
    }
}

fn warn_on_coverage_gaps(table: &ExpectationTable) {
    let coverage = table.coverage();
    if !coverage.has_clean {
        crate::log_warn!("table '{}' has no clean case", table.revision());
    }
    for kind in &coverage.missing {
        crate::log_warn!(
            "table '{}' never expects {:?} ({})",
            table.revision(),
            kind.message(),
            kind.key()
        );
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    set_log_level(if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    });
    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Run {
            corpus,
            checker,
            table,
            timeout,
            jobs,
            report,
        } => {
            let table = table.load()?;
            let invoker = ProcessInvoker::new(checker)
                .with_timeout(timeout.map(Duration::from_secs));
            run(&table, &corpus, &invoker, jobs, report.as_deref())
        }
        Commands::Table { table } => {
            let table = table.load()?;
            println!("{}", TableSummary(&table));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Catalog => {
            output::print_catalog();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run(
    table: &ExpectationTable,
    corpus: &Path,
    invoker: &ProcessInvoker,
    jobs: usize,
    report: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let corpus = Corpus::open(corpus).context("opening image corpus")?;

    match invoker.preflight() {
        Ok(resolved) => crate::log_verbose!("Checker resolved to {}", resolved.display()),
        Err(e) => crate::log_warn!("{e}; every case will record an invocation error"),
    }

    crate::log_info!(
        "Running {} against {} (revision '{}')",
        invoker.binary().display(),
        corpus.root().display(),
        table.revision()
    );
    crate::log_verbose!(
        "{} image(s) on disk, timeout {}",
        corpus.images().count(),
        invoker
            .timeout()
            .map_or_else(|| "none".to_string(), |t| format!("{t:?}"))
    );

    let runner = ConformanceRunner::new(table, &corpus, invoker, RunnerOptions { jobs });
    let hidden = utils::log_level() == LogLevel::Quiet || !std::io::stderr().is_terminal();
    let pb = utils::progress::case_progress(runner.plan().len(), hidden)?;

    let result = runner.run_with(|case| {
        pb.inc(1);
        pb.set_message(case.name.clone());
        crate::log_verbose!(
            "{} {} exit={:?}",
            case.verdict.tag(),
            case.name,
            case.exit_status
        );
    });
    pb.finish_and_clear();

    output::print_run(&result);

    if let Some(path) = report {
        output::write_json_report(&result, path)
            .with_context(|| format!("writing report {}", path.display()))?;
        crate::log_info!("Report written to {}", path.display());
    }

    Ok(if result.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
