//! Typed error taxonomy
//!
//! Engine failures that callers may need to distinguish are expressed as
//! `GitError` variants and raised through `anyhow` so command code can add
//! context and the CLI can downcast where the kind matters (pack deltas,
//! pathspec misses, checked-out branch deletion).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    /// A hash was not 40 hex characters or 20 raw bytes
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    /// An unset object id was asked to encode itself
    #[error("object id is not set")]
    UnsetObjectId,

    /// Unknown object kind token or malformed loose-object header
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// Bad DIRC magic, version, padding or trailer mismatch
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// Pack index magic or version check failed
    #[error("corrupt pack index: {0}")]
    CorruptPackIndex(String),

    /// Packfile magic, version or payload length check failed
    #[error("corrupt packfile: {0}")]
    CorruptPack(String),

    /// The pack entry is an ofs-delta or ref-delta, which this engine
    /// locates but refuses to reconstruct
    #[error("deltified pack entries are not supported")]
    DeltaNotSupported,

    /// A tree entry's declared kind disagreed with the pointed-to object
    #[error("tree entry type mismatch for object {0}")]
    TreeTypeMismatch(String),

    /// HEAD is malformed, or a branch head file is missing and the branch
    /// is not the default branch
    #[error("fatal: invalid reference: {0}")]
    InvalidRef(String),

    #[error("error: Cannot delete branch '{0}' checked out")]
    BranchCheckedOut(String),

    #[error("Aborting commit due to empty commit message.")]
    EmptyCommitMessage,

    /// Commit requested with an empty index and no history
    #[error("nothing to commit in an empty repository")]
    EmptyRepository,

    #[error("error: pathspec '{0}' did not match any file(s) known to git")]
    PathspecNoMatch(String),

    /// stat fields required by the index are unavailable on this platform
    #[error("file metadata is not supported on this platform")]
    UnsupportedPlatform,
}
