//! # folderpeek
//!
//! Enumerate a directory or a ZIP archive into one sorted, size-aggregated
//! item tree, ready for a list or grid view.
//!
//! Directories are walked recursively up to a depth budget, with every
//! folder carrying the deep size of everything beneath it. ZIP archives
//! are read straight from their central directory, without an archive
//! library, and nested into the same tree shape; an archive wrapped in a
//! single top-level folder is shown from inside that folder.
//!
//! ## Features
//!
//! - Depth-limited recursive directory listing with hidden-file filtering
//! - ZIP central directory parsing with junk-entry filtering
//! - Deterministic recursive sorting, optionally with folders on top
//! - On-demand STORED/DEFLATE extraction of single archive entries
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use folderpeek::{ViewConfig, load};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ViewConfig::default();
//!     let listing = load(Path::new("photos.zip"), &config).await;
//!     for item in &listing.items {
//!         println!("{} {}", item.name, item.size_string());
//!     }
//!     println!("{}", listing.status_description());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod item;
pub mod kind;
pub mod preview;
pub mod sort;
pub mod tree;
pub mod walker;
pub mod zip;

pub use cli::Cli;
pub use config::{SortDirection, SortKey, SortSpec, ViewConfig};
pub use error::PeekError;
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use item::{ArchiveOrigin, Item, Listing, format_size};
pub use preview::{PreviewSession, Source, load, load_thumbnail, load_thumbnails};
pub use zip::{ArchiveEntry, ZipParser};
