//! The unified item model shared by directory and archive sources.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::SortSpec;
use crate::sort;
use crate::zip::{ArchiveEntry, CompressionMethod};

/// One node of a listing: a file, a directory, or an archive entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Full logical path; unique within one tree.
    pub id: PathBuf,
    /// Leaf path segment.
    pub name: String,
    pub is_directory: bool,
    pub modified_at: NaiveDateTime,
    /// File length, or the deep size for directories.
    pub size: Option<u64>,
    pub kind: String,
    /// `None` is either a true leaf or a depth cutoff; callers cannot tell
    /// the two apart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Item>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_origin: Option<ArchiveOrigin>,
}

/// Where an archive item's bytes live, for on-demand extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveOrigin {
    pub archive_path: PathBuf,
    pub lfh_offset: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub compression_method: CompressionMethod,
    pub encrypted: bool,
}

impl ArchiveOrigin {
    pub fn from_entry(archive_path: &Path, entry: &ArchiveEntry) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            lfh_offset: entry.lfh_offset,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            compression_method: entry.compression_method,
            encrypted: entry.is_encrypted(),
        }
    }
}

impl Item {
    /// Size used by the size sort key; absent sizes sort as zero.
    pub fn size_for_sorting(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn size_string(&self) -> String {
        match self.size {
            Some(size) => format_size(size),
            None => "--".to_string(),
        }
    }

    pub fn date_string(&self) -> String {
        self.modified_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// This item plus every descendant currently present.
    pub fn flattened_count(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .map_or(0, |kids| kids.iter().map(Item::flattened_count).sum())
    }

    /// Depth of the deepest node below and including this one (this one is 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .as_deref()
            .and_then(|kids| kids.iter().map(Item::depth).max())
            .unwrap_or(0)
    }
}

/// A finished enumeration: the sorted forest plus its status aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub items: Vec<Item>,
    /// Sum of the top-level sizes.
    pub total_size: u64,
    /// Number of top-level items.
    pub item_count: usize,
}

impl Listing {
    pub fn new(items: Vec<Item>) -> Self {
        let total_size = items.iter().map(Item::size_for_sorting).sum();
        let item_count = items.len();
        Self {
            items,
            total_size,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item at every depth.
    pub fn flattened_count(&self) -> usize {
        self.items.iter().map(Item::flattened_count).sum()
    }

    /// Deepest level present, roots being level 1.
    pub fn depth(&self) -> usize {
        self.items.iter().map(Item::depth).max().unwrap_or(0)
    }

    /// Re-apply a sort order without re-enumerating.
    pub fn resorted(self, spec: &SortSpec) -> Self {
        Self {
            items: sort::sort_items(self.items, spec),
            ..self
        }
    }

    /// Status bar text, e.g. `"1.50 KB, 3 items"`.
    pub fn status_description(&self) -> String {
        format!("{}, {} items", format_size(self.total_size), self.item_count)
    }
}

/// Format a byte size into a human-readable string.
///
/// ```
/// use folderpeek::format_size;
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
