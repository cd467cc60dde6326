//! Per-path status record
//!
//! Each tracked or observed path carries up to three slots — its entry in
//! the HEAD commit, in the index, and in the working tree — plus the two
//! derived status verdicts. Which slots are present drives the verdicts;
//! the record itself is never persisted.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use colored::Colorize;
use std::path::PathBuf;

/// How the index compares to the HEAD commit for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexStatus {
    #[default]
    NotUpdated,
    UpdatedInIndex,
    AddedInIndex,
    DeletedInIndex,
    Untracked,
}

impl IndexStatus {
    pub fn code(&self) -> &'static str {
        match self {
            IndexStatus::NotUpdated => " ",
            IndexStatus::UpdatedInIndex => "M",
            IndexStatus::AddedInIndex => "A",
            IndexStatus::DeletedInIndex => "D",
            IndexStatus::Untracked => "?",
        }
    }
}

/// How the working tree compares to the index for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WdStatus {
    #[default]
    IndexAndWorktreeMatch,
    WorktreeChangedSinceIndex,
    DeletedInWorktree,
    Untracked,
}

impl WdStatus {
    pub fn code(&self) -> &'static str {
        match self {
            WdStatus::IndexAndWorktreeMatch => " ",
            WdStatus::WorktreeChangedSinceIndex => "M",
            WdStatus::DeletedInWorktree => "D",
            WdStatus::Untracked => "?",
        }
    }
}

/// Status record for one path
#[derive(Debug, Clone, Default)]
pub struct FileStatus {
    pub path: PathBuf,
    /// Entry in the HEAD commit's tree, when the path is committed
    pub commit: Option<DatabaseEntry>,
    /// Entry in the staging index, when the path is staged
    pub index: Option<IndexEntry>,
    /// Fresh stat of the working-tree file, when it exists
    pub wd: Option<EntryMetadata>,
    pub index_status: IndexStatus,
    pub wd_status: WdStatus,
}

impl FileStatus {
    /// Clean paths are omitted from status listings
    pub fn is_clean(&self) -> bool {
        self.index_status == IndexStatus::NotUpdated
            && self.wd_status == WdStatus::IndexAndWorktreeMatch
    }

    /// Two-letter porcelain code, colorized like git: staged changes in
    /// green, unstaged in red
    pub fn porcelain_code(&self) -> String {
        if self.index_status == IndexStatus::Untracked {
            return "??".red().to_string();
        }

        let index_code = match self.index_status {
            IndexStatus::NotUpdated => self.index_status.code().normal(),
            _ => self.index_status.code().green(),
        };
        let wd_code = match self.wd_status {
            WdStatus::IndexAndWorktreeMatch => self.wd_status.code().normal(),
            _ => self.wd_status.code().red(),
        };

        format!("{index_code}{wd_code}")
    }
}
