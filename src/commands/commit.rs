use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use crate::errors::GitError;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Record a snapshot of the index as a commit and advance the branch
    ///
    /// Ordering: every tree is stored (children first) before the commit
    /// object, and the commit is stored before the branch head moves.
    /// Without `-m` the configured editor is launched on a truncated
    /// `COMMIT_EDITMSG`; an empty message aborts with nothing written.
    pub fn commit(&self, message: Option<&str>) -> anyhow::Result<()> {
        let mut index = self.index_mut();
        index.rehydrate()?;

        let parent = self.refs().last_commit()?;
        if index.is_empty() && !parent.is_set() {
            return Err(GitError::EmptyRepository.into());
        }

        let message = match message {
            Some(message) => message.trim().to_string(),
            None => self.capture_message_from_editor()?,
        };
        if message.is_empty() {
            return Err(GitError::EmptyCommitMessage.into());
        }
        let message = format!("{message}\n");

        let tree = Tree::build(index.entries())?;
        tree.traverse(&|subtree| {
            self.database().store(subtree)?;
            Ok(())
        })?;
        let tree_oid = tree.object_id()?;

        let parents = if parent.is_set() { vec![parent] } else { Vec::new() };
        let is_root = parents.is_empty();

        let config = self.config();
        let author = Author::new(config.author_name(), config.author_email());
        let committer = Author::new(config.committer_name(), config.committer_email());

        let commit = Commit::new(parents, tree_oid, author, committer, message);
        let commit_oid = self.database().store(&commit)?;

        let branch = self.refs().current_branch()?;
        self.refs().update_branch_head(&branch, &commit_oid)?;

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            if is_root { " (root-commit)" } else { "" },
            commit_oid.to_short_oid()?,
            commit.short_message()
        )?;

        Ok(())
    }

    /// Launch the configured editor on the message scratch file and read
    /// back what the user wrote
    fn capture_message_from_editor(&self) -> anyhow::Result<String> {
        let editmsg_path = self.config().editmsg_path();
        std::fs::write(&editmsg_path, b"")
            .context(format!("unable to truncate {editmsg_path:?}"))?;

        let (editor, editor_args) = self.config().editor();
        let status = std::process::Command::new(editor)
            .args(editor_args)
            .arg(&editmsg_path)
            .status()
            .context(format!("unable to launch editor '{editor}'"))?;

        if !status.success() {
            anyhow::bail!("editor '{editor}' exited with {status}");
        }

        let message = std::fs::read_to_string(&editmsg_path)
            .context(format!("unable to read {editmsg_path:?}"))?;

        Ok(message.trim().to_string())
    }
}
