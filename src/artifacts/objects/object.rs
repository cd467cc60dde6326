//! Core object traits and types
//!
//! The fundamental traits that all Git objects implement:
//! - `Packable`: serialization to Git's binary format
//! - `Unpackable`: deserialization from Git's binary format
//! - `Object`: common object operations (id computation, storage path)
//!
//! ## Object Format
//!
//! All objects are stored as:
//! ```text
//! <kind> <size>\0<content>
//! ```
//! then compressed with zlib and written under `.git/objects/`. The object
//! id is the SHA-1 of the uncompressed `<kind> <size>\0<content>` bytes.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Trait for serializing objects to Git's binary format
pub trait Packable {
    /// Serialize the object to bytes, header included
    fn serialize(&self) -> Result<Bytes>;
}

/// Trait for deserializing objects from Git's binary format
pub trait Unpackable {
    /// Deserialize the object from a reader positioned at the payload
    /// (header already consumed)
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

/// Core Git object trait, implemented by Blob, Tree and Commit
pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Compute the object id by hashing the serialized content
    fn object_id(&self) -> Result<ObjectId> {
        let content = self.serialize()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        Ok(ObjectId::from_raw(hasher.finalize().into()))
    }

    /// Relative path where this object would be stored
    fn object_path(&self) -> Result<PathBuf> {
        self.object_id()?.to_path()
    }
}

/// Type-erased object container for callers that don't know the kind
/// at compile time
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}
