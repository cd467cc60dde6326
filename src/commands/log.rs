use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Print the first-parent history of the current branch, newest
    /// first, in medium format
    pub fn log(&self) -> anyhow::Result<()> {
        let mut current = self.refs().last_commit()?;

        while current.is_set() {
            let commit = self
                .database()
                .parse_object_as_commit(&current)?
                .ok_or_else(|| anyhow::anyhow!("object {current} is not a commit"))?;

            let mut writer = self.writer();
            writeln!(writer, "commit {}", current.to_hex()?)?;
            writeln!(writer, "Author: {}", commit.author().display_name())?;
            writeln!(writer, "Date:   {}", commit.author().readable_timestamp())?;
            writeln!(writer)?;
            for line in commit.message().lines() {
                writeln!(writer, "    {line}")?;
            }
            drop(writer);

            current = match commit.parent() {
                Some(parent) => {
                    writeln!(self.writer())?;
                    *parent
                }
                None => ObjectId::unset(),
            };
        }

        Ok(())
    }
}
