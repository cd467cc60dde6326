//! Repository facade
//!
//! The `Repository` wires the subsystems together — configuration, object
//! database, staging index, working tree and refs — and is the receiver
//! for every porcelain command (see `crate::commands`). Output flows
//! through an injected writer so callers decide where it lands.

use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnoreRules;
use crate::artifacts::objects::object::Object;
use crate::artifacts::status::status_set::StatusSet;
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::Path;

pub struct Repository {
    config: Config,
    /// Output writer (stdout in production, a buffer in tests)
    writer: RefCell<Box<dyn Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(root: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        let config = Config::new(root)?;

        let ignore = IgnoreRules::load(&config.ignore_path(), config.git_dir_name())?;
        let index = Index::new(config.index_path());
        let database = Database::new(config.objects_path(), config.pack_path());
        let workspace = Workspace::new(
            config.root().to_path_buf(),
            config.git_dir_name().to_string(),
            ignore,
        );
        let refs = Refs::new(
            config.head_path(),
            config.heads_path(),
            config.packed_refs_path(),
            config.default_branch().to_string(),
        );

        Ok(Repository {
            config,
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn index_mut(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Assemble the full three-way status of the repository
    pub fn current_status(&self) -> anyhow::Result<StatusSet> {
        let mut index = self.index_mut();
        index.rehydrate()?;

        self.status_with_index(&index)
    }

    /// Status against an already-loaded index
    pub fn status_with_index(&self, index: &Index) -> anyhow::Result<StatusSet> {
        let mut set = StatusSet::new();

        let head = self.refs.last_commit()?;
        if head.is_set() {
            set.merge_commit_files(&self.database.committed_files(&head)?);
        }

        set.merge_index(index);

        let mut worktree = Vec::new();
        for path in self.workspace.list_files()? {
            let stat = self.workspace.stat_file(&path)?;
            worktree.push((path, stat));
        }
        set.merge_worktree(worktree, |path| {
            self.workspace.parse_blob(path)?.object_id()
        })?;

        Ok(set)
    }
}
