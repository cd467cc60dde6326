//! Streaming SHA-1 over index I/O
//!
//! Every byte read from or written to the index file passes through this
//! wrapper so the trailing 20-byte checksum can be verified on load and
//! appended on store without buffering the whole file.

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::GitError;
use anyhow::anyhow;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Checksum<T> {
    io: T,
    digest: Sha1,
}

impl<T> Checksum<T> {
    pub(crate) fn new(io: T) -> Self {
        Checksum {
            io,
            digest: Sha1::new(),
        }
    }
}

impl<T: Read> Checksum<T> {
    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.io
            .read_exact(&mut buffer)
            .map_err(|_| anyhow!("unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Compare the trailing on-disk checksum against the digest of
    /// everything read so far
    pub(crate) fn verify(&mut self) -> anyhow::Result<()> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.io.read_exact(&mut expected_checksum)?;

        let actual_checksum = self.digest.clone().finalize();

        if expected_checksum != actual_checksum.as_slice() {
            return Err(GitError::CorruptIndex(
                "checksum does not match value stored on disk".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl<T: Write> Checksum<T> {
    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.io.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub(crate) fn write_checksum(&mut self) -> anyhow::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.io
            .write_all(checksum.as_slice())
            .map_err(|_| anyhow!("failed to write checksum to index file"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    fn test_write_then_verify() {
        let mut buffer = Vec::new();
        let mut writer = Checksum::new(&mut buffer);
        writer.write(b"DIRC test payload").unwrap();
        writer.write_checksum().unwrap();

        let mut reader = Checksum::new(Cursor::new(buffer));
        reader.read(17).unwrap();
        reader.verify().unwrap();
    }

    #[rstest]
    fn test_verify_detects_corruption() {
        let mut buffer = Vec::new();
        let mut writer = Checksum::new(&mut buffer);
        writer.write(b"DIRC test payload").unwrap();
        writer.write_checksum().unwrap();

        // flip a payload byte after the checksum was taken
        buffer[3] ^= 0xFF;

        let mut reader = Checksum::new(Cursor::new(buffer));
        reader.read(17).unwrap();
        assert!(reader.verify().is_err());
    }
}
