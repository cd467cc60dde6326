//! Three-way status composition
//!
//! A `StatusSet` is built by merging, in order:
//! 1. the files of the HEAD commit's tree,
//! 2. the index entries,
//! 3. an ignore-filtered walk of the working tree.
//!
//! Each merge refines the per-path verdicts. Defaults are pessimistic and
//! corrected by later merges: a committed path starts as deleted from the
//! index until the index proves otherwise, and an indexed path starts as
//! deleted from the worktree until the walk finds it.
//!
//! Worktree equivalence is modification-time equality (seconds and
//! nanoseconds). When mtimes differ the blob is rehashed and the verdict
//! downgraded to unchanged if the content still matches, which absorbs
//! racy timestamps.

use crate::areas::index::Index;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::{FileStatus, IndexStatus, WdStatus};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

/// Map of path → status, sorted ascending by path
#[derive(Debug, Clone, Default)]
pub struct StatusSet {
    files: BTreeMap<PathBuf, FileStatus>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&FileStatus> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// All records, ascending by path
    pub fn files(&self) -> impl Iterator<Item = &FileStatus> {
        self.files.values()
    }

    /// Records that would appear in a status listing
    pub fn changed_files(&self) -> impl Iterator<Item = &FileStatus> {
        self.files.values().filter(|status| !status.is_clean())
    }

    /// Seed the set with the files of the HEAD commit
    pub fn merge_commit_files(&mut self, commit_files: &BTreeMap<PathBuf, DatabaseEntry>) {
        for (path, entry) in commit_files {
            self.files.insert(
                path.clone(),
                FileStatus {
                    path: path.clone(),
                    commit: Some(*entry),
                    // pessimistic until the index merge proves otherwise
                    index_status: IndexStatus::DeletedInIndex,
                    wd_status: WdStatus::IndexAndWorktreeMatch,
                    ..Default::default()
                },
            );
        }
    }

    /// Merge the staging index, deciding each path's index verdict
    pub fn merge_index(&mut self, index: &Index) {
        for entry in index.entries() {
            let record = self
                .files
                .entry(entry.name.clone())
                .or_insert_with(|| FileStatus {
                    path: entry.name.clone(),
                    ..Default::default()
                });

            record.index = Some(entry.clone());
            // pessimistic until the worktree walk finds the file
            record.wd_status = WdStatus::DeletedInWorktree;

            record.index_status = match &record.commit {
                Some(commit_entry)
                    if commit_entry.oid == entry.oid
                        && commit_entry.mode == entry.metadata.mode =>
                {
                    IndexStatus::NotUpdated
                }
                Some(_) => IndexStatus::UpdatedInIndex,
                None => IndexStatus::AddedInIndex,
            };
        }
    }

    /// Merge the worktree walk, deciding each path's worktree verdict
    ///
    /// `rehash` computes the blob id of a working-tree file; it is only
    /// invoked when the cheap mtime comparison fails.
    pub fn merge_worktree<F>(
        &mut self,
        worktree: Vec<(PathBuf, EntryMetadata)>,
        rehash: F,
    ) -> anyhow::Result<()>
    where
        F: Fn(&Path) -> anyhow::Result<ObjectId>,
    {
        for (path, stat) in worktree {
            match self.files.entry(path) {
                Entry::Vacant(vacant) => {
                    let path = vacant.key().clone();
                    vacant.insert(FileStatus {
                        path,
                        wd: Some(stat),
                        index_status: IndexStatus::Untracked,
                        wd_status: WdStatus::Untracked,
                        ..Default::default()
                    });
                }
                Entry::Occupied(mut occupied) => {
                    let record = occupied.get_mut();
                    record.wd = Some(stat);

                    let Some(index_entry) = record.index.clone() else {
                        // committed but unstaged; the index verdict
                        // already carries the report
                        record.wd_status = WdStatus::IndexAndWorktreeMatch;
                        continue;
                    };

                    record.wd_status = if index_entry.mtime_match(&stat) {
                        WdStatus::IndexAndWorktreeMatch
                    } else if rehash(&record.path)? == index_entry.oid {
                        // racy timestamp, content unchanged
                        WdStatus::IndexAndWorktreeMatch
                    } else {
                        WdStatus::WorktreeChangedSinceIndex
                    };
                }
            }
        }

        Ok(())
    }
}
