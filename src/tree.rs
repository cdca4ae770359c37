//! Nesting flat archive paths into an item tree.
//!
//! Entries are first collected into an owned draft tree (each node owns
//! its child map, no parent links), sizes are aggregated bottom-up once,
//! and the draft is then frozen into sorted [`Item`]s.

use chrono::{Local, NaiveDateTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SortSpec;
use crate::item::{ArchiveOrigin, Item};
use crate::kind;
use crate::sort;
use crate::zip::ArchiveEntry;

#[derive(Debug, Default)]
struct DraftNode {
    id: String,
    name: String,
    is_directory: bool,
    modified_at: Option<NaiveDateTime>,
    /// Own length for files; deep size once aggregated for directories.
    size: u64,
    origin: Option<ArchiveOrigin>,
    children: HashMap<String, DraftNode>,
}

impl DraftNode {
    fn directory(id: String, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_directory: true,
            ..Self::default()
        }
    }

    /// Fill in deep sizes, and give implicit directories the newest
    /// timestamp found beneath them.
    fn aggregate(&mut self) -> (u64, Option<NaiveDateTime>) {
        if self.is_directory {
            let mut total = 0;
            let mut newest = None;
            for child in self.children.values_mut() {
                let (size, modified) = child.aggregate();
                total += size;
                newest = newest.max(modified);
            }
            self.size = total;
            if self.modified_at.is_none() {
                self.modified_at = newest;
            }
        }
        (self.size, self.modified_at)
    }
}

/// Accumulates archive entries for one archive, then freezes them.
#[derive(Debug)]
pub struct TreeBuilder {
    archive_path: PathBuf,
    roots: HashMap<String, DraftNode>,
}

impl TreeBuilder {
    pub fn new(archive_path: &Path) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            roots: HashMap::new(),
        }
    }

    /// Place one entry, creating any missing parent directories.
    ///
    /// A later entry for the same path overwrites the earlier metadata.
    pub fn insert(&mut self, entry: &ArchiveEntry) {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut level = &mut self.roots;
        let mut id = String::new();
        for segment in parents {
            push_segment(&mut id, segment);
            let node = level
                .entry(segment.to_string())
                .or_insert_with(|| DraftNode::directory(id.clone(), segment));
            // A file that turns out to have children is a directory
            node.is_directory = true;
            node.origin = None;
            level = &mut node.children;
        }

        push_segment(&mut id, last);
        let node = level
            .entry(last.to_string())
            .or_insert_with(|| DraftNode::directory(id.clone(), last));
        node.modified_at = Some(entry.modified_at);
        if entry.is_directory || !node.children.is_empty() {
            node.is_directory = true;
            node.origin = None;
        } else {
            node.is_directory = false;
            node.size = entry.uncompressed_size;
            node.origin = Some(ArchiveOrigin::from_entry(&self.archive_path, entry));
        }
    }

    /// Freeze into a sorted forest, unwrapping a lone top-level folder.
    ///
    /// When a wrapper folder is removed the depth budget grows by one, so
    /// the visible levels match an archive without the wrapper.
    pub fn build(mut self, depth_budget: Option<usize>, spec: &SortSpec) -> Vec<Item> {
        for node in self.roots.values_mut() {
            node.aggregate();
        }

        let single_folder = self.roots.len() == 1
            && self.roots.values().next().is_some_and(|n| n.is_directory);

        let (roots, start_depth, budget) = if single_folder {
            let wrapper = self.roots.into_values().next().unwrap_or_default();
            debug!(wrapper = %wrapper.name, "unwrapping single top-level folder");
            (wrapper.children, 2, depth_budget.map(|k| k + 1))
        } else {
            (self.roots, 1, depth_budget)
        };

        let now = Local::now().naive_local();
        freeze(roots, start_depth, budget, spec, now)
    }
}

/// Build the item tree for a flat entry list in one call.
pub fn build_tree(
    archive_path: &Path,
    entries: &[ArchiveEntry],
    depth_budget: Option<usize>,
    spec: &SortSpec,
) -> Vec<Item> {
    let mut builder = TreeBuilder::new(archive_path);
    for entry in entries {
        builder.insert(entry);
    }
    builder.build(depth_budget, spec)
}

fn push_segment(id: &mut String, segment: &str) {
    if !id.is_empty() {
        id.push('/');
    }
    id.push_str(segment);
}

/// `depth` is the level of the nodes in `level`, roots being 1.
fn freeze(
    level: HashMap<String, DraftNode>,
    depth: usize,
    budget: Option<usize>,
    spec: &SortSpec,
    now: NaiveDateTime,
) -> Vec<Item> {
    let items = level
        .into_values()
        .map(|node| {
            let expand = node.is_directory && budget.is_none_or(|limit| depth < limit);
            let children = expand.then(|| freeze(node.children, depth + 1, budget, spec, now));
            Item {
                id: PathBuf::from(node.id),
                kind: kind::describe(&node.name, node.is_directory),
                name: node.name,
                is_directory: node.is_directory,
                modified_at: node.modified_at.unwrap_or(now),
                size: Some(node.size),
                children,
                archive_origin: node.origin,
            }
        })
        .collect();
    sort::order_level(items, spec)
}
