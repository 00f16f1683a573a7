// SPDX-License-Identifier: MIT

//! End-to-end runs against a scripted stand-in for the real checker.
//!
//! Each fake image holds the exit code on its first line and the diagnostic
//! on the rest, so the same script can play every corpus case.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use fconf::prelude::*;
use fconf::InvocationError;

const FAKE_CHECKER: &str = r#"#!/bin/sh
if [ ! -f "$1" ]; then
    echo "image not found" >&2
    exit 1
fi
echo "checking $1"
code=$(head -n 1 "$1")
if [ "$code" = "hang" ]; then
    exec sleep 5
fi
tail -n +2 "$1" >&2
exit "$code"
"#;

/// Written once per test binary, before anything spawns, to dodge ETXTBSY.
fn fake_checker() -> &'static Path {
    static CHECKER: OnceLock<(tempfile::TempDir, PathBuf)> = OnceLock::new();
    let (_, path) = CHECKER.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcheck");
        fs::write(&path, FAKE_CHECKER).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    });
    path
}

fn write_image(dir: &Path, name: &str, code: &str, stderr: &str) {
    fs::write(dir.join(name), format!("{code}\n{stderr}")).unwrap();
}

fn faithful_corpus(table: &ExpectationTable) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, outcome) in table.iter() {
        let code = if outcome.fault().is_some() { "1" } else { "0" };
        write_image(dir.path(), name, code, outcome.message());
    }
    dir
}

#[test]
fn clean_image_passes() {
    let checker = ProcessInvoker::new(fake_checker());
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "good", "0", "");

    let observed = checker.invoke(&dir.path().join("good")).unwrap();
    assert_eq!(observed.exit_status, Some(0));
    assert_eq!(observed.diagnostic_text, "");
}

#[test]
fn faulty_image_stdout_is_ignored() {
    let checker = ProcessInvoker::new(fake_checker());
    let dir = tempfile::tempdir().unwrap();
    write_image(
        dir.path(),
        "addronce",
        "1",
        "ERROR: direct address used more than once.\n",
    );

    let observed = checker.invoke(&dir.path().join("addronce")).unwrap();
    assert_eq!(observed.exit_status, Some(1));
    assert_eq!(
        observed.diagnostic_text,
        "ERROR: direct address used more than once."
    );
}

#[test]
fn builtin_corpus_all_pass() {
    let checker = ProcessInvoker::new(fake_checker());
    let table = ExpectationTable::builtin();
    let dir = faithful_corpus(&table);
    let corpus = Corpus::open(dir.path()).unwrap();

    let result = ConformanceRunner::new(&table, &corpus, &checker, RunnerOptions::default()).run();
    assert_eq!(result.summary_line(), "23 / 23 tests passed");
    assert!(result.all_passed());
}

#[test]
fn builtin_corpus_parallel_with_timeout() {
    let checker =
        ProcessInvoker::new(fake_checker()).with_timeout(Some(Duration::from_secs(10)));
    let table = ExpectationTable::builtin();
    let dir = faithful_corpus(&table);
    write_image(dir.path(), "badinode", "1", "ERROR: bad direct address in inode.");
    let corpus = Corpus::open(dir.path()).unwrap();

    let result =
        ConformanceRunner::new(&table, &corpus, &checker, RunnerOptions { jobs: 4 }).run();
    assert_eq!(result.summary_line(), "22 / 23 tests passed");
    let names: Vec<&str> = result.cases.iter().map(|c| c.name.as_str()).collect();
    let expected: Vec<&str> = table.iter().map(|(n, _)| n).collect();
    assert_eq!(names, expected);

    let failed = result.failures().next().unwrap();
    assert_eq!(failed.name, "badinode");
    assert_eq!(
        failed.verdict,
        Verdict::Failed {
            expected: "ERROR: bad inode.".into(),
            actual: "ERROR: bad direct address in inode.".into(),
        }
    );
}

#[test]
fn hanging_checker_times_out() {
    let checker =
        ProcessInvoker::new(fake_checker()).with_timeout(Some(Duration::from_millis(200)));
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "good", "hang", "");

    let err = checker.invoke(&dir.path().join("good")).unwrap_err();
    assert!(matches!(err, InvocationError::TimedOut { .. }), "{err:?}");
}

#[test]
fn non_executable_checker_is_permission_denied() {
    let _ = fake_checker();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fcheck");
    fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let err = ProcessInvoker::new(&path)
        .invoke(Path::new("good"))
        .unwrap_err();
    assert!(matches!(err, InvocationError::PermissionDenied(_)), "{err:?}");
}

#[test]
fn invalid_checker_path_errors_every_case() {
    let _ = fake_checker();
    let table = ExpectationTable::builtin();
    let dir = faithful_corpus(&table);
    let corpus = Corpus::open(dir.path()).unwrap();
    let checker = ProcessInvoker::new(dir.path().join("no-such-fcheck"));

    let result = ConformanceRunner::new(&table, &corpus, &checker, RunnerOptions::default()).run();
    assert_eq!(result.summary_line(), "0 / 23 tests passed");
    assert!(result.cases.iter().all(|c| matches!(
        &c.verdict,
        Verdict::InvocationError { detail } if detail.starts_with("checker binary not found")
    )));
}

#[test]
fn json_report_shape() {
    let checker = ProcessInvoker::new(fake_checker());
    let table = ExpectationTable::builder("r1")
        .clean("good")
        .faulty("badinode", FaultKind::BadInode)
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "good", "0", "");
    let corpus = Corpus::open(dir.path()).unwrap();

    let result = ConformanceRunner::new(&table, &corpus, &checker, RunnerOptions::default()).run();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["revision"], "r1");
    assert_eq!(json["cases"][0]["verdict"]["verdict"], "passed");
    assert_eq!(json["cases"][1]["verdict"]["verdict"], "invocation_error");
    assert_eq!(json["cases"][1]["verdict"]["detail"], "image not found");
}
