//! Database entry representation
//!
//! A database entry is a reference to an object in the object store as seen
//! from a tree: the object id plus the entry mode. Used when flattening
//! committed trees during status, switch and restore.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Entry from a tree object in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct DatabaseEntry {
    /// Object id of the referenced blob or subtree
    pub oid: ObjectId,
    /// Entry mode (file permissions and type)
    pub mode: EntryMode,
}

impl DatabaseEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}
