//! References: HEAD and branch heads
//!
//! A branch head is a file under `refs/heads/<name>` holding a 40-hex
//! commit id plus newline; HEAD is a symbolic ref of the form
//! `ref: refs/heads/<name>`. Repositories that have been packed may also
//! carry branch heads as lines in the packed-refs file, which is consulted
//! whenever a loose ref file is absent.
//!
//! The default branch is special: before the first commit its head file
//! does not exist, and resolving it yields the unset id rather than an
//! error.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitError;
use anyhow::Context;
use file_guard::Lock;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prefix of branch refs inside HEAD and packed-refs
const HEADS_PREFIX: &str = "refs/heads/";

/// Reference manager
#[derive(Debug)]
pub struct Refs {
    head_path: PathBuf,
    heads_path: PathBuf,
    packed_refs_path: PathBuf,
    default_branch: String,
}

impl Refs {
    pub fn new(
        head_path: PathBuf,
        heads_path: PathBuf,
        packed_refs_path: PathBuf,
        default_branch: String,
    ) -> Self {
        Refs {
            head_path,
            heads_path,
            packed_refs_path,
            default_branch,
        }
    }

    /// Name of the branch HEAD points at
    pub fn current_branch(&self) -> anyhow::Result<String> {
        let content = std::fs::read_to_string(&self.head_path)
            .context(format!("unable to read HEAD at {:?}", self.head_path))?;

        let branch = content
            .trim_end_matches('\n')
            .strip_prefix("ref: ")
            .and_then(|reference| reference.strip_prefix(HEADS_PREFIX))
            .ok_or_else(|| GitError::InvalidRef("HEAD".to_string()))?;

        if branch.is_empty() {
            return Err(GitError::InvalidRef("HEAD".to_string()).into());
        }

        Ok(branch.to_string())
    }

    /// Resolve a branch name to its head commit
    ///
    /// Falls back to packed-refs when the loose file is absent. The
    /// default branch with no commits resolves to the unset id.
    pub fn head_sha(&self, branch: &str) -> anyhow::Result<ObjectId> {
        let branch_path = self.heads_path.join(branch);

        match std::fs::read_to_string(&branch_path) {
            Ok(content) => {
                let hex = content.trim_end_matches('\n');
                ObjectId::try_parse(hex)
                    .with_context(|| format!("malformed ref file for branch '{branch}'"))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(oid) = self.packed_refs()?.get(branch) {
                    return Ok(*oid);
                }
                if branch == self.default_branch {
                    return Ok(ObjectId::unset());
                }
                Err(GitError::InvalidRef(branch.to_string()).into())
            }
            Err(err) => Err(err).context(format!("unable to read ref file {branch_path:?}")),
        }
    }

    /// Head commit of the current branch; unset before the first commit
    pub fn last_commit(&self) -> anyhow::Result<ObjectId> {
        self.head_sha(&self.current_branch()?)
    }

    /// Branch names from packed-refs, keyed by name
    fn packed_refs(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let content = match std::fs::read_to_string(&self.packed_refs_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                return Err(err).context(format!(
                    "unable to read packed refs at {:?}",
                    self.packed_refs_path
                ));
            }
        };

        let mut refs = BTreeMap::new();
        for line in content.lines() {
            // format: "<40-hex> <refname>"; only branch refs surface here
            let Some((hex, refname)) = line.split_once(' ') else {
                continue;
            };
            let Some(branch) = refname.strip_prefix(HEADS_PREFIX) else {
                continue;
            };
            let oid = ObjectId::try_parse(hex)
                .with_context(|| format!("malformed packed ref line '{line}'"))?;
            refs.insert(branch.to_string(), oid);
        }

        Ok(refs)
    }

    /// Sorted union of loose and packed branch names
    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        let mut branches = self
            .packed_refs()?
            .into_keys()
            .collect::<std::collections::BTreeSet<_>>();

        if self.heads_path.exists() {
            for entry in WalkDir::new(&self.heads_path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
            {
                let relative = entry
                    .path()
                    .strip_prefix(&self.heads_path)
                    .context("branch ref outside the heads directory")?;
                branches.insert(relative.to_string_lossy().replace('\\', "/"));
            }
        }

        Ok(branches.into_iter().collect())
    }

    /// Create a branch pointing at the current head commit
    pub fn create_branch(&self, name: &str) -> anyhow::Result<()> {
        let name = BranchName::try_parse(name.to_string())?;

        let branch_path = self.heads_path.join(name.as_ref());
        if branch_path.exists() {
            anyhow::bail!("fatal: a branch named '{}' already exists", name);
        }

        let head = self.last_commit()?;
        if !head.is_set() {
            anyhow::bail!("fatal: not a valid object name: '{}'", name);
        }

        self.update_branch_head(name.as_ref(), &head)
    }

    /// Delete a loose branch ref; the checked-out branch is refused
    pub fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        if name == self.current_branch()? {
            return Err(GitError::BranchCheckedOut(name.to_string()).into());
        }

        let branch_path = self.heads_path.join(name);
        if !branch_path.exists() {
            anyhow::bail!("error: branch '{}' not found", name);
        }

        std::fs::remove_file(&branch_path)
            .context(format!("unable to delete branch file {branch_path:?}"))?;
        self.prune_empty_parent_dirs(&branch_path)?;

        Ok(())
    }

    /// Point HEAD at a branch
    pub fn update_head(&self, branch: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path, &format!("ref: {HEADS_PREFIX}{branch}\n"))
    }

    /// Advance a branch head to a commit
    pub fn update_branch_head(&self, branch: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.heads_path.join(branch);
        self.write_ref_file(&branch_path, &format!("{}\n", oid.to_hex()?))
    }

    /// Write a ref file under an exclusive lock, creating parent dirs
    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .context(format!("ref file {path:?} has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .context(format!("unable to create ref directory {parent:?}"))?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .context(format!("unable to open ref file {path:?}"))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut()
            .write_all(content.as_bytes())
            .context(format!("unable to write ref file {path:?}"))?;

        Ok(())
    }

    /// Hierarchical branch names leave empty directories behind on delete
    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .context(format!("unable to remove empty branch directory {parent:?}"))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
