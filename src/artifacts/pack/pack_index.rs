//! Pack index (v2) reader
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! magic \xFFtOc (4) | version (4)
//! fanout: 256 cumulative counts (4 each)
//! sorted 20-byte object hashes (20 * total)
//! CRC-32 values (4 * total)
//! offsets (4 * total) — MSB set means index into the extended table
//! extended 8-byte offsets (optional)
//! trailer: pack checksum + index checksum
//! ```
//!
//! The fanout bucket for a hash's first byte bounds the slice of the sorted
//! hash array that can contain it, so lookup is a binary search within
//! `[fanout[b-1], fanout[b])`.

use crate::artifacts::objects::OBJECT_ID_RAW_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::pack::{FANOUT_ENTRIES, IDX_MAGIC, PACK_VERSION};
use crate::errors::GitError;
use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte size of the magic + version preamble
const PREAMBLE_SIZE: u64 = 8;

/// Byte size of the fanout table
const FANOUT_SIZE: u64 = (FANOUT_ENTRIES * 4) as u64;

/// Reader for a single `pack-*.idx` file
#[derive(Debug)]
pub struct PackIndex {
    path: PathBuf,
}

impl PackIndex {
    pub fn new(path: PathBuf) -> Self {
        PackIndex { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locate the packfile offset of `oid`, if this pack contains it
    pub fn find_offset(&self, oid: &ObjectId) -> anyhow::Result<Option<u64>> {
        let mut file = std::fs::File::open(&self.path)
            .context(format!("unable to open pack index {:?}", self.path))?;

        self.verify_preamble(&mut file)?;
        let fanout = Self::read_fanout(&mut file)?;

        let first_byte = oid.as_raw()[0] as usize;
        let lo = if first_byte == 0 {
            0
        } else {
            fanout[first_byte - 1]
        };
        let hi = fanout[first_byte];
        let total = fanout[FANOUT_ENTRIES - 1];

        if lo == hi {
            return Ok(None);
        }

        let position = match Self::search_hashes(&mut file, oid, lo, hi)? {
            Some(position) => position,
            None => return Ok(None),
        };

        self.read_offset(&mut file, total, position).map(Some)
    }

    fn verify_preamble(&self, file: &mut std::fs::File) -> anyhow::Result<()> {
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if magic != IDX_MAGIC {
            return Err(GitError::CorruptPackIndex(format!(
                "bad magic bytes in {:?}",
                self.path
            ))
            .into());
        }

        let version = file.read_u32::<BigEndian>()?;
        if version != PACK_VERSION {
            return Err(GitError::CorruptPackIndex(format!(
                "unsupported version {version} in {:?}",
                self.path
            ))
            .into());
        }

        Ok(())
    }

    fn read_fanout(file: &mut std::fs::File) -> anyhow::Result<[u32; FANOUT_ENTRIES]> {
        let mut fanout = [0u32; FANOUT_ENTRIES];
        for bucket in fanout.iter_mut() {
            *bucket = file.read_u32::<BigEndian>()?;
        }

        Ok(fanout)
    }

    /// Binary search the sorted hash slice `[lo, hi)` for `oid`, returning
    /// its absolute position in the hash array
    fn search_hashes(
        file: &mut std::fs::File,
        oid: &ObjectId,
        lo: u32,
        hi: u32,
    ) -> anyhow::Result<Option<u32>> {
        let count = (hi - lo) as usize;
        file.seek(SeekFrom::Start(
            PREAMBLE_SIZE + FANOUT_SIZE + lo as u64 * OBJECT_ID_RAW_LENGTH as u64,
        ))?;

        let mut hashes = vec![0u8; count * OBJECT_ID_RAW_LENGTH];
        file.read_exact(&mut hashes)?;

        let target: &[u8] = oid.as_raw();
        let found = hashes
            .chunks_exact(OBJECT_ID_RAW_LENGTH)
            .collect::<Vec<_>>()
            .binary_search_by(|candidate| candidate.cmp(&target))
            .ok();

        Ok(found.map(|i| lo + i as u32))
    }

    fn read_offset(
        &self,
        file: &mut std::fs::File,
        total: u32,
        position: u32,
    ) -> anyhow::Result<u64> {
        let hashes_size = total as u64 * OBJECT_ID_RAW_LENGTH as u64;
        let crcs_size = total as u64 * 4;
        let offsets_start = PREAMBLE_SIZE + FANOUT_SIZE + hashes_size + crcs_size;

        file.seek(SeekFrom::Start(offsets_start + position as u64 * 4))?;
        let offset = file.read_u32::<BigEndian>()?;

        if offset & 0x8000_0000 == 0 {
            return Ok(offset as u64);
        }

        // MSB set: the low 31 bits index the 8-byte extended offset table
        let extended_index = (offset & 0x7FFF_FFFF) as u64;
        let extended_start = offsets_start + total as u64 * 4;
        file.seek(SeekFrom::Start(extended_start + extended_index * 8))?;

        Ok(file.read_u64::<BigEndian>()?)
    }
}
