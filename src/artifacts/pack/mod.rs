//! Packfile storage
//!
//! Objects that are not loose live in pack pairs under `objects/pack/`:
//! `pack-<sha>.idx` (version 2 lookup index) plus `pack-<sha>.pack` (the
//! object data). This module locates objects through the index fanout and
//! decodes non-deltified entries; ofs-delta and ref-delta entries are
//! located but refuse to yield bytes.

pub mod pack_index;
pub mod packfile;

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Pack index magic bytes: `\xFF t O c`
pub const IDX_MAGIC: [u8; 4] = [0xFF, b't', b'O', b'c'];

/// Packfile magic bytes
pub const PACK_MAGIC: [u8; 4] = *b"PACK";

/// The only supported pack and pack-index version
pub const PACK_VERSION: u32 = 2;

/// Number of fanout buckets in the pack index
pub const FANOUT_ENTRIES: usize = 256;

/// Pack entry types, as encoded in the 3 type bits of an entry header
pub const PACK_TYPE_COMMIT: u8 = 1;
pub const PACK_TYPE_TREE: u8 = 2;
pub const PACK_TYPE_BLOB: u8 = 3;
pub const PACK_TYPE_TAG: u8 = 4;
pub const PACK_TYPE_OFS_DELTA: u8 = 6;
pub const PACK_TYPE_REF_DELTA: u8 = 7;

/// Enumerate `(idx, pack)` path pairs under the pack directory
///
/// A missing pack directory is an empty repository state, not an error.
pub fn find_pack_pairs(pack_dir: &Path) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
    let entries = match std::fs::read_dir(pack_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).context(format!("unable to list pack directory {pack_dir:?}"));
        }
    };

    let mut pairs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        let is_idx = path.extension().is_some_and(|ext| ext == "idx")
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("pack-"));

        if is_idx {
            let pack_path = path.with_extension("pack");
            if pack_path.exists() {
                pairs.push((path, pack_path));
            }
        }
    }

    pairs.sort();
    Ok(pairs)
}
