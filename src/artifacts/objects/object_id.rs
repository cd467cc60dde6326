//! Git object identifier (SHA-1 hash)
//!
//! An object id is the 20-byte SHA-1 of an object's serialized form. It is
//! carried around in binary and rendered as 40 lowercase hex characters.
//! An id can also be "unset" — the state of a branch head before the first
//! commit — and an unset id compares equal only to another unset id.
//!
//! ## Storage
//!
//! Objects live in `.git/objects/<first-2-hex-chars>/<remaining-38>`

use crate::artifacts::objects::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_RAW_LENGTH};
use crate::errors::GitError;
use std::io;
use std::path::PathBuf;

/// 20-byte SHA-1 object identifier with a presence flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_RAW_LENGTH],
    set: bool,
}

impl ObjectId {
    /// Build an id from 20 raw bytes
    pub fn from_raw(bytes: [u8; OBJECT_ID_RAW_LENGTH]) -> Self {
        ObjectId { bytes, set: true }
    }

    /// Parse and validate an id from its 40-character hex form
    pub fn try_parse(id: &str) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_HEX_LENGTH {
            return Err(GitError::InvalidOid(id.to_string()).into());
        }

        let mut bytes = [0u8; OBJECT_ID_RAW_LENGTH];
        for (i, chunk) in id.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| GitError::InvalidOid(id.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| GitError::InvalidOid(id.to_string()))?;
        }

        Ok(Self::from_raw(bytes))
    }

    /// The unset id, used for branch heads with no commits yet
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn as_raw(&self) -> &[u8; OBJECT_ID_RAW_LENGTH] {
        &self.bytes
    }

    /// Render as lowercase hex; an unset id refuses to encode
    pub fn to_hex(&self) -> anyhow::Result<String> {
        if !self.set {
            return Err(GitError::UnsetObjectId.into());
        }

        Ok(self.bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Write the 20 raw bytes, as used inside tree entries and the index
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        if !self.set {
            return Err(GitError::UnsetObjectId.into());
        }

        writer.write_all(&self.bytes)?;
        Ok(())
    }

    /// Read 20 raw bytes back into an id
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut bytes = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut bytes)?;

        Ok(Self::from_raw(bytes))
    }

    /// Relative storage path: `xx/yyyy…` split after the first hex pair
    pub fn to_path(&self) -> anyhow::Result<PathBuf> {
        let hex = self.to_hex()?;
        let (dir, file) = hex.split_at(2);

        Ok(PathBuf::from(dir).join(file))
    }

    /// Standard 7-character abbreviation
    pub fn to_short_oid(&self) -> anyhow::Result<String> {
        Ok(self.to_hex()?.split_at(7).0.to_string())
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_hex() {
            Ok(hex) => write!(f, "{hex}"),
            Err(_) => write!(f, "(unset)"),
        }
    }
}
