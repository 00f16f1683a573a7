// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CorpusError;
use crate::table::ExpectationTable;

/// One disk image, addressed by case name inside the corpus directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub image_path: PathBuf,
}

impl TestCase {
    pub fn new(root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let image_path = root.join(&name);
        Self { name, image_path }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Listed in the table and found on disk.
    Present,
    /// Listed in the table, no image file.
    MissingImage,
    /// Image on disk the table does not know about.
    Unlisted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedCase {
    pub case: TestCase,
    pub presence: Presence,
}

/// Snapshot of a corpus directory, taken once at startup.
#[derive(Clone, Debug)]
pub struct Corpus {
    root: PathBuf,
    /// Sorted by name. A file name that is not UTF-8 keeps a lossy name but its
    /// real path, so it still reaches the plan.
    images: Vec<(String, PathBuf)>,
}

impl Corpus {
    pub fn open(root: &Path) -> Result<Self, CorpusError> {
        let unreadable = |source| CorpusError::Unreadable {
            path: root.to_path_buf(),
            source,
        };

        let meta = fs::metadata(root).map_err(unreadable)?;
        if !meta.is_dir() {
            return Err(CorpusError::NotADirectory(root.to_path_buf()));
        }

        let mut images = Vec::new();
        for entry in fs::read_dir(root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // follows symlinks, so linked images still count
            let path = entry.path();
            if path.is_file() {
                images.push((name, path));
            }
        }
        images.sort();

        Ok(Self {
            root: root.to_path_buf(),
            images,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .is_ok()
    }

    /// Image names in sorted order.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|(n, _)| n.as_str())
    }

    /// Table cases in definition order, then unlisted images sorted by name.
    pub fn plan(&self, table: &ExpectationTable) -> Vec<PlannedCase> {
        let mut planned: Vec<PlannedCase> = table
            .iter()
            .map(|(name, _)| PlannedCase {
                case: TestCase::new(&self.root, name),
                presence: if self.contains(name) {
                    Presence::Present
                } else {
                    Presence::MissingImage
                },
            })
            .collect();

        planned.extend(
            self.images
                .iter()
                .filter(|(name, _)| !table.contains(name))
                .map(|(name, path)| PlannedCase {
                    case: TestCase {
                        name: name.clone(),
                        image_path: path.clone(),
                    },
                    presence: Presence::Unlisted,
                }),
        );

        planned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FaultKind;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn test_open_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::open(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CorpusError::Unreadable { .. }));
    }

    #[test]
    fn test_open_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "good");
        let err = Corpus::open(&dir.path().join("good")).unwrap_err();
        assert!(matches!(err, CorpusError::NotADirectory(_)));
    }

    #[test]
    fn test_open_skips_hidden_and_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "good");
        touch(dir.path(), ".DS_Store");
        fs::create_dir(dir.path().join("nested")).unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        assert_eq!(corpus.images().collect::<Vec<_>>(), vec!["good"]);
    }

    #[test]
    fn test_plan_orders_table_then_unlisted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "good", "alpha", "badinode"] {
            touch(dir.path(), name);
        }
        let table = ExpectationTable::builder("r")
            .faulty("badinode", FaultKind::BadInode)
            .clean("good")
            .faulty("addronce", FaultKind::DupDirectAddress)
            .build()
            .unwrap();

        let corpus = Corpus::open(dir.path()).unwrap();
        let plan = corpus.plan(&table);
        let got: Vec<(&str, Presence)> = plan
            .iter()
            .map(|p| (p.case.name.as_str(), p.presence))
            .collect();
        assert_eq!(
            got,
            vec![
                ("badinode", Presence::Present),
                ("good", Presence::Present),
                ("addronce", Presence::MissingImage),
                ("alpha", Presence::Unlisted),
                ("zeta", Presence::Unlisted),
            ]
        );
        assert_eq!(plan[0].case.image_path, dir.path().join("badinode"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_image_is_planned_as_unlisted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "good");
        let raw = dir.path().join(OsStr::from_bytes(b"bad\xffimg"));
        if fs::write(&raw, b"img").is_err() {
            // filesystem refuses non-UTF-8 names
            return;
        }
        let table = ExpectationTable::builder("r").clean("good").build().unwrap();

        let plan = Corpus::open(dir.path()).unwrap().plan(&table);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].presence, Presence::Unlisted);
        assert_eq!(plan[1].case.name, "bad\u{fffd}img");
        assert_eq!(plan[1].case.image_path, raw);
    }
}
