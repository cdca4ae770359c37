//! Request entry points: classify a path, build its listing off the
//! caller's thread, and fetch thumbnail bytes per item.
//!
//! Every build owns its tree outright. A configuration change is a new
//! build; a result that arrives after a newer request has started is
//! dropped rather than published.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ViewConfig;
use crate::error::{PeekError, Result};
use crate::io::LocalFileReader;
use crate::item::{ArchiveOrigin, Item, Listing};
use crate::kind;
use crate::sort;
use crate::tree;
use crate::walker::{self, WalkOptions};
use crate::zip::{self, ArchiveEntry, ZipParser};

/// What a requested path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Directory,
    Archive,
    Unsupported,
}

pub fn classify(path: &Path) -> Source {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Source::Directory,
        Ok(meta) if meta.is_file() && kind::is_zip(path) => Source::Archive,
        Ok(_) => Source::Unsupported,
        Err(e) => {
            debug!(path = %path.display(), "cannot stat: {e}");
            Source::Unsupported
        }
    }
}

/// Build the sorted listing for a directory or ZIP archive.
///
/// Anything unreadable comes back as an empty listing.
pub async fn load(path: &Path, config: &ViewConfig) -> Listing {
    match classify(path) {
        Source::Directory => list_directory(path, config).await,
        Source::Archive => list_archive(path, config).await,
        Source::Unsupported => {
            info!(path = %path.display(), "not a directory or ZIP archive");
            Listing::default()
        }
    }
}

pub async fn list_directory(path: &Path, config: &ViewConfig) -> Listing {
    let dir = path.to_path_buf();
    let options = WalkOptions {
        depth_budget: config.depth_budget(),
        show_hidden: config.show_hidden_files,
    };
    let spec = config.sort_spec();

    let built = tokio::task::spawn_blocking(move || {
        sort::sort_items(walker::walk(&dir, &options), &spec)
    })
    .await;

    match built {
        Ok(items) => Listing::new(items),
        Err(e) => {
            warn!(path = %path.display(), "directory walk did not finish: {e}");
            Listing::default()
        }
    }
}

pub async fn list_archive(path: &Path, config: &ViewConfig) -> Listing {
    let archive = path.to_path_buf();
    let budget = config.depth_budget();
    let spec = config.sort_spec();
    let handle = Handle::current();

    // Reads, parsing and the freeze all stay on the blocking pool
    let built = tokio::task::spawn_blocking(move || {
        let entries = handle.block_on(read_entries(&archive))?;
        let items = tree::build_tree(&archive, &entries, budget, &spec);
        Ok::<_, PeekError>(sort::sort_items(items, &spec))
    })
    .await;

    match built {
        Ok(Ok(items)) => Listing::new(items),
        Ok(Err(e)) => {
            warn!(archive = %path.display(), "showing archive as empty: {e}");
            Listing::default()
        }
        Err(e) => {
            warn!(archive = %path.display(), "tree build did not finish: {e}");
            Listing::default()
        }
    }
}

/// Flat central directory listing of the archive at `path`.
pub async fn read_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let reader = Arc::new(LocalFileReader::new(path)?);
    ZipParser::new(reader).list_entries().await
}

/// Issues listings and drops those overtaken by a newer request.
#[derive(Debug, Default)]
pub struct PreviewSession {
    generation: AtomicU64,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a listing; `None` if another `load` or `invalidate` happened
    /// before this one finished.
    pub async fn load(&self, path: &Path, config: &ViewConfig) -> Option<Listing> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let path = path.to_path_buf();
        let config = config.clone();
        let listing = match tokio::spawn(async move { load(&path, &config).await }).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("listing task failed: {e}");
                Listing::default()
            }
        };

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "dropping superseded listing");
            return None;
        }
        Some(listing)
    }

    /// Supersede any load in flight.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Where an item's thumbnail bytes would come from.
#[derive(Debug, Clone)]
enum ThumbnailSource {
    Archive(ArchiveOrigin),
    Image(PathBuf),
}

fn thumbnail_source(item: &Item) -> Option<ThumbnailSource> {
    if item.is_directory || !kind::is_image(&item.name) {
        return None;
    }
    Some(match &item.archive_origin {
        Some(origin) => ThumbnailSource::Archive(origin.clone()),
        None => ThumbnailSource::Image(item.id.clone()),
    })
}

async fn fetch(source: ThumbnailSource) -> Option<Vec<u8>> {
    match source {
        ThumbnailSource::Archive(origin) => {
            let handle = Handle::current();
            tokio::task::spawn_blocking(move || handle.block_on(zip::extract(&origin)))
                .await
                .unwrap_or_else(|e| {
                    warn!("extraction task failed: {e}");
                    None
                })
        }
        ThumbnailSource::Image(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %path.display(), "cannot read image: {e}");
                None
            }
        },
    }
}

/// Raw image bytes for one item, `None` when it has no thumbnail.
pub async fn load_thumbnail(item: &Item) -> Option<Vec<u8>> {
    fetch(thumbnail_source(item)?).await
}

/// Thumbnails for several items, fetched concurrently.
///
/// Results arrive in completion order, keyed by item id; items with no
/// image are skipped.
pub async fn load_thumbnails(items: &[Item]) -> Vec<(PathBuf, Option<Vec<u8>>)> {
    let mut tasks = JoinSet::new();
    for item in items {
        if let Some(source) = thumbnail_source(item) {
            let id = item.id.clone();
            tasks.spawn(async move { (id, fetch(source).await) });
        }
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!("thumbnail task failed: {e}"),
        }
    }
    results
}
