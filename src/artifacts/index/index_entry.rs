//! Index entry representation
//!
//! Each entry in the index represents a tracked file:
//! - the path relative to the repository root
//! - the content hash (object id)
//! - a stat cache (mode, size, timestamps) enabling change detection
//!   without reading file content
//!
//! ## Entry Format
//!
//! A 62-byte big-endian fixed prefix (ten u32 stat fields, the 20-byte
//! object id, a u16 flags word whose low 12 bits carry the path length),
//! followed by the path and NUL padding to an 8-byte boundary.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitError;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::min;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Path length saturation value (low 12 bits of the flags word)
pub const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed entry prefix in bytes
pub const ENTRY_PREFIX_SIZE: usize = 62;

/// Minimum total size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// Index entry representing a tracked file
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// File path relative to the repository root
    pub name: PathBuf,
    /// SHA-1 hash of the file content
    pub oid: ObjectId,
    /// Stat cache (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid file name in index entry"))
    }

    /// Ancestor directories of this entry, shallowest first, root excluded
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = Vec::new();
        let mut parent = self.name.parent();

        while let Some(new_parent) = parent {
            dirs.push(new_parent);
            parent = new_parent.parent();
        }
        dirs.reverse();

        dirs[1..].to_vec()
    }

    /// Quick stat comparison: mode and size
    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    /// Timestamp comparison with nanosecond precision
    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    /// Modification time comparison only (sec + nsec)
    pub fn mtime_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.mtime == other.mtime && self.metadata.mtime_nsec == other.mtime_nsec
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// File metadata stored in index entries
///
/// Sourced either from a real `stat` call or reconstructed verbatim from a
/// previously stored entry, so that a read/write cycle is byte-identical.
///
/// ## Timestamps
///
/// - `ctime`: file status change time (inode modification)
/// - `mtime`: file content modification time
///
/// Both carry nanosecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: u32,
    pub ctime_nsec: u32,
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid entry name"))?;
        let flags = min(entry_name.len(), MAX_PATH_SIZE) as u16;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // at least one NUL terminator, then pad to the block boundary
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let bytes = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        if bytes.len() < ENTRY_MIN_SIZE || bytes.len() % ENTRY_BLOCK != 0 {
            return Err(GitError::CorruptIndex("invalid index entry size".to_string()).into());
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]);
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]);
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]);
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]);
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]);
        let mode: EntryMode = byteorder::NetworkEndian::read_u32(&bytes[24..28]).try_into()?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]);
        let oid = ObjectId::read_raw_from(&mut &bytes[40..60])?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let name_len = (flags & MAX_PATH_SIZE as u16) as usize;
        if ENTRY_PREFIX_SIZE + name_len >= bytes.len() {
            return Err(
                GitError::CorruptIndex("entry path exceeds entry length".to_string()).into(),
            );
        }

        let name_bytes = &bytes[ENTRY_PREFIX_SIZE..ENTRY_PREFIX_SIZE + name_len];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| GitError::CorruptIndex("invalid UTF-8 in entry path".to_string()))?,
        );

        // everything after the path must be NUL padding
        if bytes[ENTRY_PREFIX_SIZE + name_len..].iter().any(|&b| b != 0) {
            return Err(GitError::CorruptIndex("invalid entry padding".to_string()).into());
        }

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    /// Build metadata from a real stat call; `file_path` must be absolute
    /// so the executable bit can be probed
    #[cfg(unix)]
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        use is_executable::IsExecutable;
        use std::os::unix::prelude::MetadataExt;

        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else {
            match file_path.is_executable() {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        })
    }

    #[cfg(not(unix))]
    fn try_from(_: (&Path, Metadata)) -> Result<Self, Self::Error> {
        Err(GitError::UnsupportedPlatform.into())
    }
}
