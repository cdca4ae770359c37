use byteorder::{ByteOrder, LittleEndian};
use flate2::read::DeflateDecoder;
use std::io::Read;
use tracing::{debug, warn};

use crate::error::{PeekError, Result};
use crate::io::{LocalFileReader, ReadAt};
use crate::item::ArchiveOrigin;

use super::structures::{CompressionMethod, LFH_SIGNATURE, LFH_SIZE};

/// Largest entry the extractor will decompress (50 MiB).
pub const MAX_EXTRACT_SIZE: u64 = 50 * 1024 * 1024;

/// Decompress one archive entry, opening its own handle on the archive.
///
/// Returns `None` on any failure; the caller shows a generic icon instead.
/// Safe to call concurrently for different items of the same archive.
pub async fn extract(origin: &ArchiveOrigin) -> Option<Vec<u8>> {
    let reader = match LocalFileReader::new(&origin.archive_path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(archive = %origin.archive_path.display(), "cannot open archive: {e}");
            return None;
        }
    };
    extract_from(&reader, origin).await
}

/// Decompress one entry from an already open source.
pub async fn extract_from<R: ReadAt>(reader: &R, origin: &ArchiveOrigin) -> Option<Vec<u8>> {
    match try_extract(reader, origin).await {
        Ok(data) => Some(data),
        Err(e) => {
            debug!(offset = origin.lfh_offset, "entry extraction failed: {e}");
            None
        }
    }
}

/// Read the local header at the entry's offset and return where its data starts.
///
/// The local header's name and extra field lengths may differ from the
/// central directory's copy, so they are re-read here.
pub async fn data_offset<R: ReadAt>(reader: &R, lfh_offset: u64) -> Result<u64> {
    let mut lfh_buf = [0u8; LFH_SIZE];
    reader.read_exact_at(lfh_offset, &mut lfh_buf).await?;

    // Verify LFH signature (PK\x03\x04)
    if &lfh_buf[0..4] != LFH_SIGNATURE {
        return Err(PeekError::ArchiveFormat(format!(
            "bad local file header signature at offset {lfh_offset}"
        )));
    }

    let file_name_length = LittleEndian::read_u16(&lfh_buf[26..28]) as u64;
    let extra_field_length = LittleEndian::read_u16(&lfh_buf[28..30]) as u64;

    Ok(lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
}

async fn try_extract<R: ReadAt>(reader: &R, origin: &ArchiveOrigin) -> Result<Vec<u8>> {
    if origin.encrypted {
        return Err(PeekError::Decompression("entry is encrypted".into()));
    }
    // Checked before any payload allocation
    if origin.compressed_size > MAX_EXTRACT_SIZE || origin.uncompressed_size > MAX_EXTRACT_SIZE {
        return Err(PeekError::Decompression(format!(
            "entry of {} bytes exceeds the {MAX_EXTRACT_SIZE} byte limit",
            origin.uncompressed_size.max(origin.compressed_size)
        )));
    }

    let offset = data_offset(reader, origin.lfh_offset).await?;
    let mut payload = vec![0u8; origin.compressed_size as usize];
    reader.read_exact_at(offset, &mut payload).await?;

    match origin.compression_method {
        CompressionMethod::Stored => Ok(payload),
        CompressionMethod::Deflate => inflate(&payload, origin.uncompressed_size),
        CompressionMethod::Unknown(method) => Err(PeekError::Decompression(format!(
            "unsupported compression method {method}"
        ))),
    }
}

/// Inflate a raw deflate stream that must expand to exactly `expected` bytes.
fn inflate(payload: &[u8], expected: u64) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected as usize);
    // One byte of slack so an overlong stream shows up as a size mismatch
    DeflateDecoder::new(payload)
        .take(expected + 1)
        .read_to_end(&mut out)
        .map_err(|e| PeekError::Decompression(format!("corrupt deflate stream: {e}")))?;

    if out.len() as u64 != expected {
        return Err(PeekError::Decompression(format!(
            "inflated to {} bytes, expected {expected}",
            out.len()
        )));
    }
    Ok(out)
}
