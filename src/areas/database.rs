//! Object database
//!
//! Content-addressable storage for blobs, trees and commits. Objects are
//! zlib-compressed loose files under `.git/objects/ab/cdef…`, with packfile
//! pairs under `objects/pack/` consulted when a loose file is absent.
//!
//! ## Write discipline
//!
//! Serialized bytes are hashed, compressed, written to a temp sibling and
//! atomically renamed into place. A pre-existing target means the identical
//! object is already stored, so the write is skipped.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::pack::pack_index::PackIndex;
use crate::artifacts::pack::{find_pack_pairs, packfile};
use crate::errors::GitError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Git object database
#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.git/objects`)
    path: PathBuf,
    /// Path to the pack directory (typically `.git/objects/pack`)
    pack_path: PathBuf,
}

impl Database {
    pub fn new(path: PathBuf, pack_path: PathBuf) -> Self {
        Database { path, pack_path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object, returning its id
    ///
    /// Content addressing makes this idempotent: if the target file already
    /// exists it holds identical bytes and nothing is rewritten.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path()?);

        if !object_path.exists() {
            let object_dir = object_path
                .parent()
                .context(format!("invalid object path {}", object_path.display()))?;
            std::fs::create_dir_all(object_dir).context(format!(
                "unable to create object directory {}",
                object_dir.display()
            ))?;

            self.write_object(&object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    fn write_object(&self, object_path: &Path, content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(&content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "unable to open object file {}",
                temp_object_path.display()
            ))?;
        file.write_all(&compressed).context(format!(
            "unable to write object file {}",
            temp_object_path.display()
        ))?;
        drop(file);

        // rename makes the object visible atomically
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(Bytes::from(decompressed))
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Read an object's kind and payload, checking loose storage first and
    /// falling back to the packfiles
    pub fn read_raw(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(object_id.to_path()?);

        if object_path.exists() {
            let compressed = std::fs::read(&object_path).context(format!(
                "unable to read object file {}",
                object_path.display()
            ))?;
            return Self::split_header(&Self::decompress(&compressed)?);
        }

        self.read_from_packs(object_id)?
            .ok_or_else(|| anyhow::anyhow!("object {object_id} not found in the database"))
    }

    /// Parse a `<kind> <size>\0` header and validate the payload length
    fn split_header(content: &Bytes) -> anyhow::Result<(ObjectType, Bytes)> {
        let nul = content
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GitError::CorruptObject("missing header terminator".to_string()))?;

        let header = std::str::from_utf8(&content[..nul])
            .map_err(|_| GitError::CorruptObject("non-utf8 object header".to_string()))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| GitError::CorruptObject(format!("malformed header '{header}'")))?;

        let object_type = ObjectType::try_from(kind)?;
        let size: usize = size
            .parse()
            .map_err(|_| GitError::CorruptObject(format!("invalid object size '{size}'")))?;

        let payload = content.slice(nul + 1..);
        if payload.len() != size {
            return Err(GitError::CorruptObject(format!(
                "size mismatch: header says {size}, payload is {}",
                payload.len()
            ))
            .into());
        }

        Ok((object_type, payload))
    }

    fn read_from_packs(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<Option<(ObjectType, Bytes)>> {
        for (idx_path, pack_path) in find_pack_pairs(&self.pack_path)? {
            let index = PackIndex::new(idx_path);
            if let Some(offset) = index.find_offset(object_id)? {
                let object = packfile::read_object_at(&pack_path, offset)?;
                return Ok(Some((object.object_type, object.payload)));
            }
        }

        Ok(None)
    }

    /// Parse an object into its typed representation
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, payload) = self.read_raw(object_id)?;
        let reader = Cursor::new(payload);

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(reader)?))),
            ObjectType::Tag => Err(GitError::CorruptObject(
                "tag objects are not supported".to_string(),
            )
            .into()),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(Some(*blob)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    /// Flatten the tree reachable from a commit (or tree) into a map of
    /// `/`-joined file paths to their database entries
    pub fn committed_files(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<BTreeMap<PathBuf, DatabaseEntry>> {
        let mut files = BTreeMap::new();

        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => {
                self.collect_tree_files(commit.tree_oid(), Path::new(""), &mut files)?;
            }
            ObjectBox::Tree(_) => {
                self.collect_tree_files(object_id, Path::new(""), &mut files)?;
            }
            ObjectBox::Blob(_) => {
                return Err(GitError::TreeTypeMismatch(object_id.to_string()).into());
            }
        }

        Ok(files)
    }

    fn collect_tree_files(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        files: &mut BTreeMap<PathBuf, DatabaseEntry>,
    ) -> anyhow::Result<()> {
        let tree = self
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| GitError::TreeTypeMismatch(tree_oid.to_string()))?;

        for (name, entry) in tree.entries() {
            let child_path = prefix.join(name);

            if entry.is_tree() {
                self.collect_tree_files(&entry.oid, &child_path, files)?;
            } else {
                files.insert(child_path, *entry);
            }
        }

        Ok(())
    }

    /// Read a blob's payload for materialization into the working tree
    pub fn read_blob_payload(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let (object_type, payload) = self.read_raw(object_id)?;

        if object_type != ObjectType::Blob {
            return Err(GitError::TreeTypeMismatch(object_id.to_string()).into());
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn database(dir: &assert_fs::TempDir) -> Database {
        let objects = dir.path().join("objects");
        Database::new(objects.clone(), objects.join("pack"))
    }

    #[rstest]
    fn test_store_and_read_round_trip() {
        let dir = assert_fs::TempDir::new().unwrap();
        let db = database(&dir);

        let blob = Blob::new(Bytes::from_static(b"hello"), FileMode::Regular);
        let oid = db.store(&blob).unwrap();

        let (object_type, payload) = db.read_raw(&oid).unwrap();
        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(&payload[..], b"hello");
    }

    #[rstest]
    fn test_store_is_idempotent() {
        let dir = assert_fs::TempDir::new().unwrap();
        let db = database(&dir);

        let blob = Blob::new(Bytes::from_static(b"same bytes"), FileMode::Regular);
        let first = db.store(&blob).unwrap();
        let second = db.store(&blob).unwrap();
        assert_eq!(first, second);

        let object_path = db.path.join(first.to_path().unwrap());
        assert!(object_path.exists());

        // no temp droppings left behind
        let leftovers = std::fs::read_dir(object_path.parent().unwrap())
            .unwrap()
            .count();
        assert_eq!(leftovers, 1);
    }

    #[rstest]
    fn test_missing_object_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let db = database(&dir);

        let oid = ObjectId::from_raw([9u8; 20]);
        assert!(db.read_raw(&oid).is_err());
    }

    #[rstest]
    fn test_corrupt_header_is_rejected() {
        let dir = assert_fs::TempDir::new().unwrap();
        let db = database(&dir);

        let oid = ObjectId::try_parse("aa5df04587d4c35e4a1a0291b51b5a0b24d5b1c7").unwrap();
        let object_path = db.path.join(oid.to_path().unwrap());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();

        let bogus = Database::compress(b"wat 5\0hello").unwrap();
        std::fs::write(&object_path, bogus).unwrap();

        let err = db.read_raw(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::CorruptObject(_))
        ));
    }
}
