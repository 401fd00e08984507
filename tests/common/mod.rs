#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// One header record: descriptor, content and zero padding.
pub fn record(tag: &[u8; 4], content: &[u8]) -> Vec<u8> {
    record_with_reserved(tag, [0; 4], content)
}

/// The first record of reference files carries `F` in its reserved bytes.
pub fn first_record(tag: &[u8; 4], content: &[u8]) -> Vec<u8> {
    record_with_reserved(tag, [b'F', 0, 0, 0], content)
}

fn record_with_reserved(tag: &[u8; 4], reserved: [u8; 4], content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(tag);
    buf.extend_from_slice(&reserved);
    buf.extend_from_slice(&(content.len() as u64).to_be_bytes());
    buf.extend_from_slice(content);
    while buf.len() % 8 != 0 {
        buf.push(0);
    }
    buf
}

fn chunk_prefix(length: u64, sub_type: &[u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"FOR8");
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(sub_type);
    buf
}

/// A nested group standing in for scene content.
pub fn payload() -> Vec<u8> {
    let body: Vec<u8> = (0..=250u8).collect();
    let mut buf = chunk_prefix(4 + body.len() as u64, b"DAG ");
    buf.extend_from_slice(&body);
    buf
}

/// Assembles `[container][header][records][payload]`.
pub fn binary_scene(records: &[Vec<u8>], payload: &[u8]) -> Vec<u8> {
    let records: Vec<u8> = records.concat();
    let header_length = 4 + records.len() as u64;
    let container_length = 4 + 16 + header_length + payload.len() as u64;

    let mut file = chunk_prefix(container_length, b"Maya");
    file.extend(chunk_prefix(header_length, b"HEAD"));
    file.extend(records);
    file.extend_from_slice(payload);
    file
}

pub fn sample_records() -> Vec<Vec<u8>> {
    vec![
        first_record(b"VERS", b"2022"),
        record(b"UVER", b"undef"),
        record(b"MADE", b"artist"),
        record(b"CHNG", b"Mon Oct 19 10:00:00 2026"),
        record(b"LUNI", b"cm"),
        record(b"TUNI", b"film"),
        record(b"AUNI", b"deg"),
        record(b"FINF", b"application\0maya\0"),
        record(b"FINF", b"Note\0hello\0"),
        record(b"PLUG", b"mtoa\x005.1.0\0"),
    ]
}

pub fn sample_binary() -> Vec<u8> {
    binary_scene(&sample_records(), &payload())
}

pub const SAMPLE_TEXT: &str = "//Maya ASCII 2022 scene
//Name: cube.ma
requires maya \"2022\";
requires -nodeType \"aiOptions\" \"mtoa\" \"5.1.0\";
currentUnit -l centimeter -a degree -t film;
fileInfo \"application\" \"maya\";
fileInfo \"Note\" \"hello\";
createNode transform -n \"pCube1\";
\trename -uid \"9A5F6C80\";
createNode mesh -n \"pCubeShape1\" -p \"pCube1\";
\tsetAttr -k off \".v\";
// End of cube.ma
";

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write(&self, name: &str, bytes: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn be_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_be_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

/// Header length field of a binary scene file.
pub fn header_length(path: &Path) -> u64 {
    be_u64(&fs::read(path).unwrap(), 28)
}
