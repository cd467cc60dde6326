//! Delta plan for moving the working tree between two commits
//!
//! Compares the current status (commit/index/worktree verdicts per path)
//! with the target branch's committed files and buckets every path:
//!
//! - `remove`: tracked, clean, and absent from the target — delete
//! - `add`: needs materializing from the target commit
//! - `add_skip`: already correct on disk, only the index entry is rebuilt
//! - `staged`: staged additions absent from the target, carried over
//! - `ignore`: local work the switch must leave alone
//! - `conflicts`: paths whose local state the switch would destroy
//!
//! A non-empty conflict list means the caller must not mutate anything.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_status::{IndexStatus, WdStatus};
use crate::artifacts::status::status_set::StatusSet;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A path scheduled for materialization from the target commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub path: PathBuf,
    pub oid: ObjectId,
}

/// The full delta between the current state and a target branch
#[derive(Debug, Clone, Default)]
pub struct SwitchPlan {
    /// Files to write into the working tree
    pub add: Vec<PlanEntry>,
    /// Files already correct on disk; index entry rebuilt, no I/O
    pub add_skip: Vec<PlanEntry>,
    /// Staged index entries carried into the rebuilt index
    pub staged: Vec<IndexEntry>,
    /// Files to delete from the working tree
    pub remove: Vec<PathBuf>,
    /// Locally-dirty files left untouched
    pub ignore: Vec<PathBuf>,
    /// Paths whose local changes the switch would overwrite
    pub conflicts: Vec<PathBuf>,
}

impl SwitchPlan {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Build the delta from the current status and the target's files
    pub fn build(current: &StatusSet, target: &BTreeMap<PathBuf, DatabaseEntry>) -> Self {
        let mut plan = SwitchPlan::default();

        for record in current.files() {
            let Some(target_entry) = target.get(&record.path) else {
                // not in the target: removable only when fully clean
                if record.wd_status == WdStatus::IndexAndWorktreeMatch
                    && record.index_status == IndexStatus::NotUpdated
                {
                    plan.remove.push(record.path.clone());
                    continue;
                }

                // a staged addition survives the switch in the new index
                if record.index_status == IndexStatus::AddedInIndex {
                    if let Some(entry) = &record.index {
                        plan.staged.push(entry.clone());
                    }
                    plan.ignore.push(record.path.clone());
                    continue;
                }

                plan.ignore.push(record.path.clone());
                continue;
            };

            // in the target: local state decides whether it is safe to touch

            if record.index_status == IndexStatus::Untracked {
                // materializing would overwrite a file git knows nothing about
                plan.conflicts.push(record.path.clone());
                continue;
            }

            if record.wd_status == WdStatus::WorktreeChangedSinceIndex
                && record.commit.map(|entry| entry.oid) != Some(target_entry.oid)
            {
                plan.conflicts.push(record.path.clone());
                continue;
            }

            if record.index_status == IndexStatus::UpdatedInIndex
                && record.index.as_ref().map(|entry| entry.oid) != Some(target_entry.oid)
            {
                plan.conflicts.push(record.path.clone());
            }
        }

        for (path, target_entry) in target {
            if plan.conflicts.contains(path) {
                continue;
            }

            let Some(record) = current.get(path) else {
                plan.add.push(PlanEntry {
                    path: path.clone(),
                    oid: target_entry.oid,
                });
                continue;
            };

            let same_commit_hash = record.commit.map(|entry| entry.oid) == Some(target_entry.oid);
            let clean = record.wd_status == WdStatus::IndexAndWorktreeMatch
                && record.index_status == IndexStatus::NotUpdated;

            if same_commit_hash && clean {
                plan.add_skip.push(PlanEntry {
                    path: path.clone(),
                    oid: target_entry.oid,
                });
            } else if clean {
                plan.add.push(PlanEntry {
                    path: path.clone(),
                    oid: target_entry.oid,
                });
            } else {
                // local changes on a path the target also carries, but
                // nothing the switch would destroy: keep the worktree
                // file and carry the index entry into the new index
                if let Some(entry) = &record.index {
                    plan.staged.push(entry.clone());
                }
                plan.ignore.push(path.clone());
            }
        }

        plan
    }
}
