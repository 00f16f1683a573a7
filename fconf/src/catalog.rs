// SPDX-License-Identifier: MIT

//! Closed catalog of diagnostics the checker can emit.
//!
//! Each [`FaultKind`] maps to exactly one verbatim line on the checker's
//! error stream. The checker stops at the first fault it detects, so a faulty
//! image produces exactly one of these lines.

use core::fmt;

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultKind {
    BadInode,
    BadDirectAddress,
    BadIndirectAddress,
    RootMissing,
    BadDirectoryFormat,
    AddressMarkedFree,
    BitmapMarksUnused,
    DupDirectAddress,
    DupIndirectAddress,
    InodeNotInDirectory,
    DirectoryRefersFreeInode,
    BadRefCount,
    DirectoryLinkedTwice,
}

impl FaultKind {
    /// Every fault, in the order the checker runs its checks.
    pub const ALL: [FaultKind; 13] = [
        FaultKind::BadInode,
        FaultKind::BadDirectAddress,
        FaultKind::BadIndirectAddress,
        FaultKind::RootMissing,
        FaultKind::BadDirectoryFormat,
        FaultKind::AddressMarkedFree,
        FaultKind::BitmapMarksUnused,
        FaultKind::DupDirectAddress,
        FaultKind::DupIndirectAddress,
        FaultKind::InodeNotInDirectory,
        FaultKind::DirectoryRefersFreeInode,
        FaultKind::BadRefCount,
        FaultKind::DirectoryLinkedTwice,
    ];

    /// Exact diagnostic line, without the trailing newline.
    pub fn message(&self) -> &'static str {
        match self {
            FaultKind::BadInode => "ERROR: bad inode.",
            FaultKind::BadDirectAddress => "ERROR: bad direct address in inode.",
            FaultKind::BadIndirectAddress => "ERROR: bad indirect address in inode.",
            FaultKind::RootMissing => "ERROR: root directory does not exist.",
            FaultKind::BadDirectoryFormat => "ERROR: directory not properly formatted.",
            FaultKind::AddressMarkedFree => {
                "ERROR: address used by inode but marked free in bitmap."
            }
            FaultKind::BitmapMarksUnused => {
                "ERROR: bitmap marks block in use but it is not in use."
            }
            FaultKind::DupDirectAddress => "ERROR: direct address used more than once.",
            FaultKind::DupIndirectAddress => "ERROR: indirect address used more than once.",
            FaultKind::InodeNotInDirectory => {
                "ERROR: inode marked use but not found in a directory."
            }
            FaultKind::DirectoryRefersFreeInode => {
                "ERROR: inode referred to in directory but marked free."
            }
            FaultKind::BadRefCount => "ERROR: bad reference count for file.",
            FaultKind::DirectoryLinkedTwice => {
                "ERROR: directory appears more than once in file system."
            }
        }
    }

    /// Stable identifier used by table files.
    pub fn key(&self) -> &'static str {
        match self {
            FaultKind::BadInode => "bad-inode",
            FaultKind::BadDirectAddress => "bad-direct-address",
            FaultKind::BadIndirectAddress => "bad-indirect-address",
            FaultKind::RootMissing => "root-missing",
            FaultKind::BadDirectoryFormat => "bad-directory-format",
            FaultKind::AddressMarkedFree => "address-marked-free",
            FaultKind::BitmapMarksUnused => "bitmap-marks-unused",
            FaultKind::DupDirectAddress => "dup-direct-address",
            FaultKind::DupIndirectAddress => "dup-indirect-address",
            FaultKind::InodeNotInDirectory => "inode-not-in-directory",
            FaultKind::DirectoryRefersFreeInode => "directory-refers-free-inode",
            FaultKind::BadRefCount => "bad-ref-count",
            FaultKind::DirectoryLinkedTwice => "directory-linked-twice",
        }
    }

    /// Numbered checker pass that reports this fault (1-based).
    ///
    /// Direct and indirect range violations share pass 2.
    pub fn check_number(&self) -> u8 {
        match self {
            FaultKind::BadInode => 1,
            FaultKind::BadDirectAddress | FaultKind::BadIndirectAddress => 2,
            FaultKind::RootMissing => 3,
            FaultKind::BadDirectoryFormat => 4,
            FaultKind::AddressMarkedFree => 5,
            FaultKind::BitmapMarksUnused => 6,
            FaultKind::DupDirectAddress => 7,
            FaultKind::DupIndirectAddress => 8,
            FaultKind::InodeNotInDirectory => 9,
            FaultKind::DirectoryRefersFreeInode => 10,
            FaultKind::BadRefCount => 11,
            FaultKind::DirectoryLinkedTwice => 12,
        }
    }

    /// Exact match after trimming surrounding whitespace.
    pub fn from_message(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|k| k.message() == text)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
