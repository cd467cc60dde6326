//! Staging index
//!
//! The index tracks the files that make up the next commit together with a
//! stat cache for fast change detection. On disk it is the binary DIRC v2
//! format; in memory it is a sorted map of path → entry plus a directory
//! map so file/directory conflicts can be evicted on insert.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{
    ENTRY_BLOCK, ENTRY_PREFIX_SIZE, EntryMetadata, IndexEntry, MAX_PATH_SIZE,
};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::GitError;
use anyhow::Context;
use byteorder::ByteOrder;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Git index (staging area)
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: PathBuf,
    /// Tracked files mapped by path, kept sorted
    entries: BTreeMap<PathBuf, IndexEntry>,
    /// Directory hierarchy for parent/child conflict handling
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Parsed header of the backing file
    header: IndexHeader,
    /// Set when in-memory state has diverged from disk
    changed: bool,
}

impl Index {
    pub fn new(path: PathBuf) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            header: IndexHeader::new(String::from(SIGNATURE), VERSION, 0),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.header = IndexHeader::empty();
        self.changed = false;
    }

    /// Load the index from disk, verifying the trailing checksum
    ///
    /// An absent or empty index file is the empty index, not an error.
    ///
    /// ## Locking
    ///
    /// Holds a shared lock on the index file while reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(&self.path)?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock.deref_mut());
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()
    }

    fn parse_header<T: std::io::Read>(&self, reader: &mut Checksum<T>) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(&header_bytes)?;

        if header.marker != SIGNATURE {
            return Err(GitError::CorruptIndex("invalid index file signature".to_string()).into());
        }

        if header.version != VERSION {
            return Err(GitError::CorruptIndex(format!(
                "unsupported index file version: {}",
                header.version
            ))
            .into());
        }

        Ok(header.entries_count)
    }

    /// Parse each entry: 62-byte prefix, then a path whose length comes
    /// from the flags word, then NUL padding to the 8-byte boundary
    fn parse_entries<T: std::io::Read>(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<T>,
    ) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let prefix = reader.read(ENTRY_PREFIX_SIZE)?;

            let flags = byteorder::NetworkEndian::read_u16(&prefix[60..62]);
            let name_len = (flags & MAX_PATH_SIZE as u16) as usize;
            let padding = ENTRY_BLOCK - (ENTRY_PREFIX_SIZE + name_len) % ENTRY_BLOCK;

            let rest = reader.read(name_len + padding)?;

            let entry_bytes = Bytes::from([prefix.to_vec(), rest.to_vec()].concat());
            let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;

            self.store_entry(&entry);
        }

        self.header.entries_count = entries_count;

        Ok(())
    }

    /// Evict entries that conflict with the incoming one: a parent
    /// directory stored as a file, or children beneath a path that is
    /// becoming a file
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: &IndexEntry) {
        let entry_parents = entry
            .parent_dirs()
            .into_iter()
            .map(|parent| parent.to_path_buf())
            .collect::<BTreeSet<_>>();

        self.entries.insert(entry.name.clone(), entry.clone());

        for parent in entry_parents {
            self.children
                .entry(parent)
                .or_default()
                .insert(entry.name.clone());
        }
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) -> bool {
        match self.entries.remove(path) {
            None => false,
            Some(entry) => {
                for parent in entry.parent_dirs() {
                    let parent = parent.to_path_buf();
                    if let Some(children) = self.children.get_mut(&parent) {
                        children.remove(path);
                        if children.is_empty() {
                            self.children.remove(&parent);
                        }
                    }
                }

                true
            }
        }
    }

    /// Check if a path is tracked as a file entry or as a directory with
    /// tracked children
    pub fn is_directly_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path) || self.children.contains_key(path)
    }

    /// Upsert an entry, evicting conflicting file/directory entries
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(&entry);

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;
    }

    /// Replace an existing entry; absent paths are a pathspec error
    pub fn update(&mut self, entry: IndexEntry) -> anyhow::Result<()> {
        if !self.entries.contains_key(&entry.name) {
            return Err(
                GitError::PathspecNoMatch(entry.name.display().to_string()).into(),
            );
        }

        self.store_entry(&entry);
        self.changed = true;

        Ok(())
    }

    /// Remove an entry (or a tracked directory subtree); absent paths are
    /// a pathspec error
    pub fn remove(&mut self, path: &Path) -> anyhow::Result<()> {
        let removed_entry = self.remove_entry(path);
        let had_children = self.children.contains_key(path);
        self.remove_children(path);

        if !removed_entry && !had_children {
            return Err(GitError::PathspecNoMatch(path.display().to_string()).into());
        }

        self.header.entries_count = self.entries.len() as u32;
        self.changed = true;

        Ok(())
    }

    /// Refresh the stat cache of an existing entry without marking the
    /// content changed
    pub fn update_entry_stat(&mut self, path: &Path, stat: EntryMetadata) {
        if let Some(existing_entry) = self.entries.get_mut(path) {
            existing_entry.metadata = stat;
            self.changed = true;
        }
    }

    /// Serialize the index and atomically replace the file on disk
    ///
    /// Entries are emitted sorted ascending by path bytes; the whole
    /// stream is checksummed and the SHA-1 appended.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("index file has no parent directory")?;
        let temp_path = parent.join(format!("index.tmp-{}", rand::random::<u32>()));

        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .context(format!("unable to open temp index {temp_path:?}"))?;

        let mut writer = Checksum::new(&mut temp_file);

        self.header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..self.header.clone()
        };
        writer.write(&self.header.serialize()?)?;

        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        temp_file.flush()?;
        drop(temp_file);

        std::fs::rename(&temp_path, &self.path)
            .context(format!("unable to rename index into place at {:?}", self.path))?;
        self.changed = false;

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = IndexEntry> {
        self.entries.into_values()
    }

    /// Paths tracked under a pathspec (`.` matches everything)
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|entry_path| {
                if path == Path::new(".") {
                    return true;
                }
                entry_path.starts_with(path)
            })
            .map(|p| p.to_path_buf())
            .collect()
    }
}
