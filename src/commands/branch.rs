use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List, create or delete branches
    ///
    /// With no name, lists branches with the current one marked. With a
    /// name, creates a branch at the current head. With `-d`, deletes the
    /// named branch, refusing the checked-out one.
    pub fn branch(&self, name: Option<&str>, delete: bool) -> anyhow::Result<()> {
        match (name, delete) {
            (None, false) => self.list_branches(),
            (Some(name), false) => self.refs().create_branch(name),
            (Some(name), true) => {
                self.refs().delete_branch(name)?;
                writeln!(self.writer(), "Deleted branch {name}")?;
                Ok(())
            }
            (None, true) => anyhow::bail!("fatal: branch name required"),
        }
    }

    fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            let marker = if branch == current { "* " } else { "  " };
            writeln!(self.writer(), "{marker}{branch}")?;
        }

        Ok(())
    }
}
