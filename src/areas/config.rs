//! Repository configuration
//!
//! A `Config` is assembled once at startup from the repository root plus
//! any overrides, and then read-only: every derived path is a pure function
//! of the snapshot. Identity comes from the standard Git environment
//! variables with committer values falling back to author values.

use std::path::{Path, PathBuf};

const DEFAULT_GIT_DIR: &str = ".git";
const DEFAULT_HEAD_FILE: &str = "HEAD";
const DEFAULT_INDEX_FILE: &str = "index";
const DEFAULT_OBJECTS_DIR: &str = "objects";
const DEFAULT_PACK_DIR: &str = "pack";
const DEFAULT_REFS_DIR: &str = "refs";
const DEFAULT_HEADS_DIR: &str = "heads";
const DEFAULT_PACKED_REFS_FILE: &str = "info/refs";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_EDITOR: &str = "vim";
const DEFAULT_IGNORE_FILE: &str = ".gitignore";
const DEFAULT_AUTHOR_NAME: &str = "default";
const DEFAULT_AUTHOR_EMAIL: &str = "default@default.com";

/// Scratch file the editor is launched on for commit messages
const EDITMSG_FILE: &str = "COMMIT_EDITMSG";

/// Immutable configuration snapshot
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute repository root (the directory containing the git-dir)
    root: PathBuf,
    git_dir: String,
    head_file: String,
    index_file: String,
    objects_dir: String,
    pack_dir: String,
    refs_dir: String,
    heads_dir: String,
    packed_refs_file: String,
    default_branch: String,
    editor: String,
    editor_args: Vec<String>,
    ignore_file: String,
}

impl Config {
    /// Build a configuration rooted at `root`, made absolute
    pub fn new(root: &Path) -> anyhow::Result<Self> {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Config {
            root,
            git_dir: DEFAULT_GIT_DIR.to_string(),
            head_file: DEFAULT_HEAD_FILE.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            objects_dir: DEFAULT_OBJECTS_DIR.to_string(),
            pack_dir: DEFAULT_PACK_DIR.to_string(),
            refs_dir: DEFAULT_REFS_DIR.to_string(),
            heads_dir: DEFAULT_HEADS_DIR.to_string(),
            packed_refs_file: DEFAULT_PACKED_REFS_FILE.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
            editor: DEFAULT_EDITOR.to_string(),
            editor_args: Vec::new(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
        })
    }

    pub fn with_git_dir(mut self, name: &str) -> Self {
        self.git_dir = name.to_string();
        self
    }

    pub fn with_default_branch(mut self, name: &str) -> Self {
        self.default_branch = name.to_string();
        self
    }

    pub fn with_editor(mut self, editor: &str, args: Vec<String>) -> Self {
        self.editor = editor.to_string();
        self.editor_args = args;
        self
    }

    // Derived paths

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir_name(&self) -> &str {
        &self.git_dir
    }

    pub fn git_path(&self) -> PathBuf {
        self.root.join(&self.git_dir)
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_path().join(&self.head_file)
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_path().join(&self.index_file)
    }

    pub fn objects_path(&self) -> PathBuf {
        self.git_path().join(&self.objects_dir)
    }

    pub fn pack_path(&self) -> PathBuf {
        self.objects_path().join(&self.pack_dir)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.git_path().join(&self.refs_dir)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join(&self.heads_dir)
    }

    pub fn packed_refs_path(&self) -> PathBuf {
        self.git_path().join(&self.packed_refs_file)
    }

    pub fn editmsg_path(&self) -> PathBuf {
        self.git_path().join(EDITMSG_FILE)
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.root.join(&self.ignore_file)
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn editor(&self) -> (&str, &[String]) {
        (&self.editor, &self.editor_args)
    }

    // Identity, resolved from the environment on each call

    pub fn author_name(&self) -> String {
        std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| DEFAULT_AUTHOR_NAME.to_string())
    }

    pub fn author_email(&self) -> String {
        std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| DEFAULT_AUTHOR_EMAIL.to_string())
    }

    pub fn committer_name(&self) -> String {
        std::env::var("GIT_COMMITTER_NAME").unwrap_or_else(|_| self.author_name())
    }

    pub fn committer_email(&self) -> String {
        std::env::var("GIT_COMMITTER_EMAIL").unwrap_or_else(|_| self.author_email())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_derived_paths() {
        let config = Config::new(Path::new("/repo")).unwrap();

        assert_eq!(config.git_path(), PathBuf::from("/repo/.git"));
        assert_eq!(config.head_path(), PathBuf::from("/repo/.git/HEAD"));
        assert_eq!(config.index_path(), PathBuf::from("/repo/.git/index"));
        assert_eq!(config.objects_path(), PathBuf::from("/repo/.git/objects"));
        assert_eq!(config.pack_path(), PathBuf::from("/repo/.git/objects/pack"));
        assert_eq!(config.heads_path(), PathBuf::from("/repo/.git/refs/heads"));
        assert_eq!(
            config.packed_refs_path(),
            PathBuf::from("/repo/.git/info/refs")
        );
        assert_eq!(
            config.editmsg_path(),
            PathBuf::from("/repo/.git/COMMIT_EDITMSG")
        );
    }

    #[rstest]
    fn test_overrides() {
        let config = Config::new(Path::new("/repo"))
            .unwrap()
            .with_git_dir(".rit")
            .with_default_branch("trunk");

        assert_eq!(config.git_path(), PathBuf::from("/repo/.rit"));
        assert_eq!(config.default_branch(), "trunk");
    }
}
