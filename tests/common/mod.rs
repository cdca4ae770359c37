//! Hand-assembled ZIP archives for tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 2023-07-14 13:45:58
pub const DOS_DATE: u16 = ((2023 - 1980) << 9) | (7 << 5) | 14;
pub const DOS_TIME: u16 = (13 << 11) | (45 << 5) | (58 / 2);

pub struct TestEntry {
    pub name: Vec<u8>,
    pub method: u16,
    pub flags: u16,
    pub data: Vec<u8>,
    pub uncompressed_size: u32,
    pub date: u16,
    pub time: u16,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
}

#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<TestEntry>,
    comment: Vec<u8>,
    prefix: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(TestEntry {
            name: name.as_bytes().to_vec(),
            method: 0,
            flags: 0,
            data: data.to_vec(),
            uncompressed_size: data.len() as u32,
            date: DOS_DATE,
            time: DOS_TIME,
            extra: Vec::new(),
            comment: Vec::new(),
        });
        self
    }

    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::best());
        enc.write_all(data).unwrap();
        self.entries.push(TestEntry {
            name: name.as_bytes().to_vec(),
            method: 8,
            flags: 0,
            data: enc.finish().unwrap(),
            uncompressed_size: data.len() as u32,
            date: DOS_DATE,
            time: DOS_TIME,
            extra: Vec::new(),
            comment: Vec::new(),
        });
        self
    }

    pub fn dir(self, name: &str) -> Self {
        let name = if name.ends_with('/') { name.to_string() } else { format!("{name}/") };
        self.stored(&name, b"")
    }

    /// Add a fully specified entry.
    pub fn raw(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Tweak the most recently added entry.
    pub fn with_last(mut self, f: impl FnOnce(&mut TestEntry)) -> Self {
        f(self.entries.last_mut().expect("no entry to modify"));
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Bytes placed before the first local header (offsets stay correct).
    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.prefix = prefix.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.prefix.clone();
        let mut central = Vec::new();

        for entry in &self.entries {
            let lfh_offset = out.len() as u32;

            out.extend_from_slice(b"PK\x03\x04");
            out.extend_from_slice(&20u16.to_le_bytes());
            out.extend_from_slice(&entry.flags.to_le_bytes());
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&entry.time.to_le_bytes());
            out.extend_from_slice(&entry.date.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.extra);
            out.extend_from_slice(&entry.data);

            central.extend_from_slice(b"PK\x01\x02");
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&entry.flags.to_le_bytes());
            central.extend_from_slice(&entry.method.to_le_bytes());
            central.extend_from_slice(&entry.time.to_le_bytes());
            central.extend_from_slice(&entry.date.to_le_bytes());
            central.extend_from_slice(&0u32.to_le_bytes());
            central.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            central.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            central.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.comment.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u32.to_le_bytes());
            central.extend_from_slice(&lfh_offset.to_le_bytes());
            central.extend_from_slice(&entry.name);
            central.extend_from_slice(&entry.extra);
            central.extend_from_slice(&entry.comment);
        }

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&central);

        let count = self.entries.len() as u16;
        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);
        out
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}
