// SPDX-License-Identifier: MIT

//! Versioned expectation table: case name -> expected checker outcome.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::FaultKind;
use crate::error::TableError;

/// Revision of the builtin table.
pub const BUILTIN_REVISION: &str = "xv6-fcheck-r1";

/// Reserved `expect` value for images the checker must accept.
pub const CLEAN_KEY: &str = "clean";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "fault", rename_all = "lowercase")]
pub enum ExpectedOutcome {
    Clean,
    Faulty(FaultKind),
}

impl ExpectedOutcome {
    /// Expected diagnostic text; empty for a clean image.
    pub fn message(&self) -> &'static str {
        match self {
            ExpectedOutcome::Clean => "",
            ExpectedOutcome::Faulty(kind) => kind.message(),
        }
    }

    pub fn matches(&self, diagnostic: &str) -> bool {
        diagnostic.trim() == self.message()
    }

    pub fn fault(&self) -> Option<FaultKind> {
        match self {
            ExpectedOutcome::Clean => None,
            ExpectedOutcome::Faulty(kind) => Some(*kind),
        }
    }
}

/// Which part of the catalog a table leaves unexercised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    pub has_clean: bool,
    pub missing: Vec<FaultKind>,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.has_clean && self.missing.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct ExpectationTable {
    revision: String,
    entries: Vec<(String, ExpectedOutcome)>,
}

impl ExpectationTable {
    pub fn builder(revision: impl Into<String>) -> ExpectationTableBuilder {
        ExpectationTableBuilder {
            revision: revision.into(),
            entries: Vec::new(),
        }
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn lookup(&self, name: &str) -> Result<ExpectedOutcome, TableError> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| *outcome)
            .ok_or_else(|| TableError::UnknownCase(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ExpectedOutcome)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), *o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn coverage(&self) -> Coverage {
        let has_clean = self
            .entries
            .iter()
            .any(|(_, o)| matches!(o, ExpectedOutcome::Clean));
        let present: HashSet<FaultKind> =
            self.entries.iter().filter_map(|(_, o)| o.fault()).collect();
        let missing = FaultKind::ALL
            .into_iter()
            .filter(|k| !present.contains(k))
            .collect();
        Coverage { has_clean, missing }
    }

    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let content = fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TableError> {
        let raw: RawTable = toml::from_str(content)?;
        let mut builder = Self::builder(raw.revision);
        for case in raw.cases {
            let outcome = case.outcome()?;
            builder = builder.entry(case.name, outcome);
        }
        builder.build()
    }

    /// Ground truth for the reference xv6 checker, taken from its check order.
    ///
    /// An image that trips several passes expects the earliest one, since the
    /// checker exits on the first fault.
    pub fn builtin() -> Self {
        use FaultKind::*;

        let table = Self::builder(BUILTIN_REVISION)
            .clean("good")
            .clean("goodlarge")
            .clean("goodlink")
            .clean("goodrefcnt")
            .clean("goodrm")
            .faulty("badinode", BadInode)
            .faulty("badaddr", BadDirectAddress)
            .faulty("badindir1", BadIndirectAddress)
            .faulty("badindir2", BadIndirectAddress)
            .faulty("badroot", RootMissing)
            .faulty("badroot2", RootMissing)
            .faulty("badfmt", BadDirectoryFormat)
            .faulty("mrkfree", AddressMarkedFree)
            .faulty("indirfree", AddressMarkedFree)
            .faulty("mrkused", BitmapMarksUnused)
            .faulty("addronce", DupDirectAddress)
            .faulty("addronce2", DupIndirectAddress)
            .faulty("imrkused", InodeNotInDirectory)
            .faulty("imrkfree", DirectoryRefersFreeInode)
            .faulty("badrefcnt", BadRefCount)
            .faulty("badrefcnt2", BadRefCount)
            .faulty("dironce", DirectoryLinkedTwice)
            .faulty("badlarge", BadIndirectAddress)
            .build();

        match table {
            Ok(table) => table,
            Err(e) => unreachable!("builtin table is malformed: {e}"),
        }
    }
}

pub struct ExpectationTableBuilder {
    revision: String,
    entries: Vec<(String, ExpectedOutcome)>,
}

impl ExpectationTableBuilder {
    pub fn clean(self, name: impl Into<String>) -> Self {
        self.entry(name, ExpectedOutcome::Clean)
    }

    pub fn faulty(self, name: impl Into<String>, kind: FaultKind) -> Self {
        self.entry(name, ExpectedOutcome::Faulty(kind))
    }

    pub fn entry(mut self, name: impl Into<String>, outcome: ExpectedOutcome) -> Self {
        self.entries.push((name.into(), outcome));
        self
    }

    /// Rejects duplicates even when both definitions agree.
    pub fn build(self) -> Result<ExpectationTable, TableError> {
        let revision = self.revision.trim().to_string();
        if revision.is_empty() {
            return Err(TableError::EmptyRevision);
        }

        let mut seen = HashSet::new();
        for (name, _) in &self.entries {
            if !is_valid_case_name(name) {
                return Err(TableError::InvalidCaseName(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateCase {
                    revision,
                    name: name.clone(),
                });
            }
        }

        Ok(ExpectationTable {
            revision,
            entries: self.entries,
        })
    }
}

/// Case names double as file names inside the corpus directory, which skips
/// hidden files, so a leading dot could never match an image.
fn is_valid_case_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    revision: String,
    #[serde(default, rename = "case")]
    cases: Vec<RawCase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCase {
    name: String,
    #[serde(default)]
    expect: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RawCase {
    fn outcome(&self) -> Result<ExpectedOutcome, TableError> {
        match (&self.expect, &self.message) {
            (Some(key), None) => {
                if key.trim() == CLEAN_KEY {
                    return Ok(ExpectedOutcome::Clean);
                }
                FaultKind::from_key(key)
                    .map(ExpectedOutcome::Faulty)
                    .ok_or_else(|| self.unknown(key))
            }
            (None, Some(msg)) => {
                if msg.trim().is_empty() {
                    return Ok(ExpectedOutcome::Clean);
                }
                FaultKind::from_message(msg)
                    .map(ExpectedOutcome::Faulty)
                    .ok_or_else(|| self.unknown(msg))
            }
            _ => Err(TableError::AmbiguousExpectation(self.name.clone())),
        }
    }

    fn unknown(&self, value: &str) -> TableError {
        TableError::UnknownFault {
            case: self.name.clone(),
            value: value.to_string(),
        }
    }
}
