use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the paths tracked by the index, ascending
    pub fn ls_files(&self) -> anyhow::Result<()> {
        let mut index = self.index_mut();
        index.rehydrate()?;

        for entry in index.entries() {
            writeln!(self.writer(), "{}", entry.name.display())?;
        }

        Ok(())
    }
}
