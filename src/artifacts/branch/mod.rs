//! Branch name handling
//!
//! Validates branch names against Git's ref-name rules before they are
//! used to create, delete or switch branches.

pub mod branch_name;

/// Regex matching anything that disqualifies a branch name
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
