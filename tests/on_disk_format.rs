//! Byte-level checks of the on-disk artifacts against Git's formats

mod common;

use byteorder::{BigEndian, ByteOrder};
use common::*;
use pretty_assertions::assert_eq;
use sha1::{Digest, Sha1};
use std::io::Read;

#[test]
fn index_file_is_dirc_v2_with_valid_trailer() {
    let dir = init_repo();
    write_file(&dir, "b.txt", "b");
    write_file(&dir, "a/a.txt", "a");
    add(&dir, ".");

    let bytes = std::fs::read(dir.path().join(".git/index")).unwrap();

    // header: DIRC, version 2, entry count
    assert_eq!(&bytes[0..4], b"DIRC");
    assert_eq!(BigEndian::read_u32(&bytes[4..8]), 2);
    assert_eq!(BigEndian::read_u32(&bytes[8..12]), 2);

    // trailer: SHA-1 of everything before it
    let (payload, trailer) = bytes.split_at(bytes.len() - 20);
    let mut hasher = Sha1::new();
    hasher.update(payload);
    assert_eq!(trailer, hasher.finalize().as_slice());

    // entries are sorted and 8-byte aligned: first path is a/a.txt
    let first_path_start = 12 + 62;
    assert_eq!(&bytes[first_path_start..first_path_start + 7], b"a/a.txt");
    // entry span (62 + 7 + padding) is a multiple of 8
    let flags = BigEndian::read_u16(&bytes[12 + 60..12 + 62]);
    assert_eq!(flags & 0xFFF, 7);
}

#[test]
fn loose_blob_matches_git_object_format() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");

    // the well-known hash of the blob "hello"
    let blob_path = dir
        .path()
        .join(".git/objects/b6/fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
    assert!(blob_path.exists());

    let compressed = std::fs::read(&blob_path).unwrap();
    let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).unwrap();

    assert_eq!(&raw[..], b"blob 5\0hello");
}

#[test]
fn commit_object_has_the_documented_text_form() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");

    let head = read_file(&dir, ".git/refs/heads/main");
    let head = head.trim();
    let commit_path = dir
        .path()
        .join(".git/objects")
        .join(&head[0..2])
        .join(&head[2..]);

    let compressed = std::fs::read(&commit_path).unwrap();
    let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).unwrap();

    // the stored bytes hash back to the commit id
    let mut hasher = Sha1::new();
    hasher.update(&raw);
    let digest = hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>();
    assert_eq!(digest, head);

    let text = String::from_utf8(raw).unwrap();
    let (header, body) = text.split_once('\0').unwrap();
    assert!(header.starts_with("commit "));
    assert!(body.starts_with("tree "));
    assert!(body.contains("\nauthor tester <tester@test.com> "));
    assert!(body.contains("\ncommitter tester <tester@test.com> "));
    assert!(body.contains(" +0000\n"));
    assert!(body.ends_with("\n\nm1\n"));

    // root commit: no parent line
    assert!(!body.contains("\nparent "));
}

#[test]
fn second_commit_references_its_parent() {
    let dir = init_repo();
    write_file(&dir, "hello", "hello");
    add(&dir, "hello");
    commit(&dir, "m1");
    let first_head = read_file(&dir, ".git/refs/heads/main").trim().to_string();

    write_file(&dir, "hello", "hello world");
    add(&dir, "hello");
    commit(&dir, "m2");
    let second_head = read_file(&dir, ".git/refs/heads/main").trim().to_string();

    let commit_path = dir
        .path()
        .join(".git/objects")
        .join(&second_head[0..2])
        .join(&second_head[2..]);
    let compressed = std::fs::read(&commit_path).unwrap();
    let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).unwrap();
    let text = String::from_utf8(raw).unwrap();

    assert!(text.contains(&format!("\nparent {first_head}\n")));
}
