use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print porcelain status: a two-letter code and the path, ascending
    /// by path; clean paths are omitted
    pub fn status(&self) -> anyhow::Result<()> {
        let status_set = self.current_status()?;

        for record in status_set.changed_files() {
            writeln!(
                self.writer(),
                "{} {}",
                record.porcelain_code(),
                record.path.display()
            )?;
        }

        Ok(())
    }
}
