//! ZIP archive metadata parsing and single-entry extraction.
//!
//! Written against PKWARE APPNOTE without an archive library.
//!
//! ## Architecture
//!
//! - [`date`]: MS-DOS packed date/time decoding
//! - [`structures`]: ZIP format records (EOCD, header signatures, entries)
//! - [`parser`]: central directory reader producing flat [`ArchiveEntry`] lists
//! - [`extractor`]: on-demand decompression of one entry
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Listing reads only the EOCD and the Central Directory; the local header
//! and payload of an entry are touched only when its bytes are requested.
//!
//! ## Limitations
//!
//! - STORED and DEFLATE only
//! - No encryption, ZIP64 or multi-disk support

pub mod date;
pub mod extractor;
mod parser;
mod structures;

pub use extractor::{MAX_EXTRACT_SIZE, extract, extract_from};
pub use parser::{ZipParser, is_junk_path};
pub use structures::*;
