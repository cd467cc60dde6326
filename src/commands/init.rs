use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create the git directory skeleton and point HEAD at the default
    /// branch
    ///
    /// Re-running in an existing repository recreates missing directories
    /// but leaves HEAD alone.
    pub fn init(&self) -> anyhow::Result<()> {
        let config = self.config();

        fs::create_dir_all(config.objects_path())
            .context("failed to create the objects directory")?;
        fs::create_dir_all(config.pack_path()).context("failed to create the pack directory")?;
        fs::create_dir_all(config.heads_path())
            .context("failed to create the refs/heads directory")?;

        if !config.head_path().exists() {
            self.refs().update_head(config.default_branch())?;
        }

        self.sweep_temp_objects()?;

        writeln!(
            self.writer(),
            "Initialized empty repository in {}",
            config.git_path().display()
        )?;

        Ok(())
    }

    /// Remove temp files an interrupted object write may have left under
    /// `objects/xx/`
    fn sweep_temp_objects(&self) -> anyhow::Result<()> {
        for entry in walkdir::WalkDir::new(self.config().objects_path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with("tmp-obj-"));
            if is_temp {
                fs::remove_file(entry.path()).context("failed to sweep stale temp object")?;
            }
        }

        Ok(())
    }
}
