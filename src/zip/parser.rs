//! Central directory reader.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) in the file's tail
//! 2. Read the whole Central Directory in one request
//! 3. Walk its headers, keeping every entry parsed before the first bad one
//!
//! Entries never touch the local headers here; the extractor reads those
//! on demand.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PeekError, Result};
use crate::io::ReadAt;

use super::date;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Resource-fork folder written by the macOS archiver.
const MACOSX_FOLDER: &str = "__MACOSX";

/// Low-level ZIP central directory parser.
///
/// Generic over the reader type so archives can be parsed from a file on
/// disk or from bytes already in memory.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(Arc::new(LocalFileReader::new(path)?));
/// for entry in parser.list_entries().await? {
///     println!("{} {}", entry.path, entry.uncompressed_size);
/// }
/// ```
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Returns the record together with its offset in the file. Fails with
    /// [`PeekError::ArchiveFormat`] when no signature is found in the last
    /// 65,557 bytes.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            return Err(PeekError::ArchiveFormat(format!(
                "file too small for a ZIP archive ({} bytes)",
                self.size
            )));
        }

        // Common case first: no archive comment, the record ends the file.
        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_exact_at(offset, &mut buf).await?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_exact_at(search_start, &mut buf).await?;

        match locate_signature(&buf) {
            Some(i) => {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                Ok((eocd, search_start + i as u64))
            }
            None => Err(PeekError::ArchiveFormat(
                "end of central directory signature not found".into(),
            )),
        }
    }

    /// List every entry of the central directory.
    ///
    /// A bad header signature or a record running past the directory
    /// truncates the list to the entries already parsed. Entries under
    /// `__MACOSX` or with a dot-prefixed path segment are dropped.
    pub async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        if eocd.is_zip64() {
            return Err(PeekError::ArchiveFormat(
                "ZIP64 archives are not supported".into(),
            ));
        }
        if eocd.is_multi_disk() {
            return Err(PeekError::ArchiveFormat(
                "multi-disk archives are not supported".into(),
            ));
        }

        let cd_offset = eocd.cd_offset as u64;
        if cd_offset > eocd_offset {
            return Err(PeekError::ArchiveFormat(format!(
                "central directory offset {cd_offset} lies past its end record at {eocd_offset}"
            )));
        }

        // Everything between the directory start and the end record, in one read
        let mut cd_data = vec![0u8; (eocd_offset - cd_offset) as usize];
        self.reader.read_exact_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for index in 0..eocd.total_entries {
            match parse_cdfh(&mut cursor, cd_offset, index) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        index,
                        expected = eocd.total_entries,
                        "central directory walk stopped: {e}"
                    );
                    break;
                }
            }
        }

        debug!(entries = entries.len(), "parsed central directory");
        Ok(entries)
    }
}

/// Search backwards for the EOCD signature.
///
/// A candidate whose comment length exactly reaches the end of the buffer
/// wins; failing that, the last candidate whose comment fits at all, and
/// last of all one whose comment was cut short. The directory offset and
/// count come before the comment, so a truncated comment is harmless.
fn locate_signature(buf: &[u8]) -> Option<usize> {
    let size = EndOfCentralDirectory::SIZE;
    if buf.len() < size {
        return None;
    }

    let mut fallback = None;
    let mut truncated = None;
    for i in (0..=buf.len() - size).rev() {
        if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }
        let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
        let trailing = buf.len() - i - size;
        if comment_len == trailing {
            return Some(i);
        }
        if comment_len < trailing {
            fallback.get_or_insert(i);
        } else {
            truncated.get_or_insert(i);
        }
    }

    if fallback.is_some() {
        debug!("end of central directory followed by trailing bytes");
        return fallback;
    }
    if truncated.is_some() {
        debug!("archive comment runs past the end of the file");
    }
    truncated
}

/// Parse one Central Directory File Header.
///
/// Returns `Ok(None)` for entries that are filtered out. `base` is the file
/// offset of the cursor's first byte and only feeds error reports.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>, base: u64, index: u16) -> Result<Option<ArchiveEntry>> {
    let start = cursor.position();
    let available = cursor.get_ref().len() as u64 - start;
    if available < CDFH_MIN_SIZE as u64 {
        return Err(PeekError::TruncatedRead {
            offset: base + start,
            wanted: CDFH_MIN_SIZE,
            got: available as usize,
        });
    }

    // Read and verify the signature (PK\x01\x02)
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(PeekError::ArchiveFormat(format!(
            "bad central directory header signature at offset {}",
            base + start
        )));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let _crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
    let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;
    let file_comment_length = cursor.read_u16::<LittleEndian>()? as u64;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let variable = file_name_length + extra_field_length + file_comment_length;
    if available < CDFH_MIN_SIZE as u64 + variable {
        return Err(PeekError::TruncatedRead {
            offset: base + start,
            wanted: CDFH_MIN_SIZE + variable as usize,
            got: available as usize,
        });
    }

    let name_start = cursor.position() as usize;
    let name_bytes = &cursor.get_ref()[name_start..name_start + file_name_length as usize];
    // Directory entries end with '/'
    let is_directory = name_bytes.ends_with(b"/");
    let file_name = decode_name(name_bytes);
    if std::str::from_utf8(name_bytes).is_err() {
        debug!(index, path = %file_name, "entry name is not UTF-8");
    }

    // Skip name, extra field and comment in one go
    cursor.set_position(cursor.position() + variable);

    if is_junk_path(&file_name) {
        debug!(path = %file_name, "skipping archive metadata entry");
        return Ok(None);
    }

    let path = file_name.trim_matches('/');
    if path.is_empty() {
        return Ok(None);
    }

    Ok(Some(ArchiveEntry {
        path: path.to_owned(),
        is_directory,
        flags,
        modified_at: date::decode_or_now(last_mod_date, last_mod_time),
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        lfh_offset,
    }))
}

/// Decode an entry name segment by segment.
///
/// Bytes that are not UTF-8 (CP437 names from legacy archivers) are kept
/// as `\xNN` escapes inside their own segment, so the entry stays in its
/// folder and equal byte strings always decode to the same path.
fn decode_name(bytes: &[u8]) -> String {
    bytes
        .split(|&b| b == b'/')
        .map(|segment| {
            let mut decoded = String::with_capacity(segment.len());
            for chunk in segment.utf8_chunks() {
                decoded.push_str(chunk.valid());
                for byte in chunk.invalid() {
                    decoded.push_str(&format!("\\x{byte:02X}"));
                }
            }
            decoded
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resource forks and dotfiles that archivers leave behind.
pub fn is_junk_path(path: &str) -> bool {
    path.split('/')
        .any(|segment| segment == MACOSX_FOLDER || segment.starts_with('.'))
}
