//! Git blob object
//!
//! Blobs store raw file content. They carry no metadata — filename and
//! permissions live in tree entries. Content is kept as opaque bytes so
//! binary files survive a round trip untouched.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Git blob object representing file content
#[derive(Debug, Clone, new)]
pub struct Blob {
    /// Raw file content
    content: Bytes,
    /// File mode (permissions)
    mode: FileMode,
}

impl Blob {
    pub fn mode(&self) -> &FileMode {
        &self.mode
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), self.content.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&self.content)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been consumed
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(Bytes::from(content), Default::default()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_serialize_prepends_header() {
        let blob = Blob::new(Bytes::from_static(b"hello"), FileMode::Regular);

        let bytes = blob.serialize().unwrap();
        assert_eq!(&bytes[..], b"blob 5\0hello");
    }

    #[rstest]
    fn test_known_object_id() {
        // `echo -n 'hello' | git hash-object --stdin`
        let blob = Blob::new(Bytes::from_static(b"hello"), FileMode::Regular);

        let oid = blob.object_id().unwrap();
        assert_eq!(
            oid.to_hex().unwrap(),
            "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"
        );
    }

    #[rstest]
    fn test_deserialize_keeps_raw_bytes() {
        let payload: &[u8] = &[0x00, 0xff, 0x10, 0x80];

        let blob = Blob::deserialize(payload).unwrap();
        assert_eq!(&blob.content()[..], payload);
    }
}
