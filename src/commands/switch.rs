use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::switch_plan::SwitchPlan;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::GitError;
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    /// Switch to another branch, refusing to clobber local changes
    pub fn switch(&self, branch: &str) -> anyhow::Result<()> {
        let conflicts = self.switch_branch(branch)?;

        if !conflicts.is_empty() {
            let paths = conflicts
                .iter()
                .map(|path| format!("\t{}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::bail!(
                "error: The following untracked working tree files would be overwritten by checkout:\n{paths}\nPlease move or remove them before you switch branches.\nAborting"
            );
        }

        writeln!(self.writer(), "Switched to branch '{branch}'")?;

        Ok(())
    }

    /// Move the working tree, index and HEAD to another branch's commit
    ///
    /// Returns the conflicting paths instead of switching when local
    /// changes would be overwritten; in that case nothing — no file, no
    /// index byte, no ref — has been mutated. Mutation order on success:
    /// working-tree removals, then writes, then the index, then HEAD.
    pub fn switch_branch(&self, branch: &str) -> anyhow::Result<Vec<PathBuf>> {
        let target_oid = self.refs().head_sha(branch)?;
        if !target_oid.is_set() {
            return Err(GitError::InvalidRef(branch.to_string()).into());
        }

        let current = self.current_status()?;
        let target_files = self.database().committed_files(&target_oid)?;

        let plan = SwitchPlan::build(&current, &target_files);
        if plan.has_conflicts() {
            return Ok(plan.conflicts);
        }

        for path in &plan.remove {
            self.workspace().remove_file(path)?;
        }

        for entry in &plan.add {
            let payload = self.database().read_blob_payload(&entry.oid)?;
            self.workspace().write_file(&entry.path, &payload)?;
        }

        // rebuild the index from scratch: materialized and untouched
        // target files take the commit's hash with a fresh stat, staged
        // additions carry over verbatim
        let mut index = self.index_mut();
        *index = Index::new(self.config().index_path());

        for entry in plan.add_skip.iter().chain(plan.add.iter()) {
            let stat = self.workspace().stat_file(&entry.path)?;
            index.add(IndexEntry::new(entry.path.clone(), entry.oid, stat));
        }
        for entry in &plan.staged {
            index.add(entry.clone());
        }
        index.write_updates()?;

        self.refs().update_head(branch)?;

        Ok(Vec::new())
    }
}
