//! Recursive listing of a real directory.
//!
//! Each level is read with `std::fs::read_dir`. Directory sizes come from a
//! separate `walkdir` pass that only sums file lengths, so they are exact
//! even where the item tree stops at the depth budget. Sibling entries are
//! processed in parallel on the rayon pool.

use chrono::{DateTime, Local, NaiveDateTime};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{PeekError, Result};
use crate::item::Item;
use crate::kind;

/// Options for one directory walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Levels to expand, roots being level 1; `None` is unlimited.
    pub depth_budget: Option<usize>,
    pub show_hidden: bool,
}

/// List `dir`'s children, recursing up to the depth budget.
///
/// A directory that cannot be listed yields an empty list; entries that
/// cannot be read are skipped. Children come back in no particular order.
pub fn walk(dir: &Path, options: &WalkOptions) -> Vec<Item> {
    fetch_items(dir, 1, options)
}

fn fetch_items(dir: &Path, depth: usize, options: &WalkOptions) -> Vec<Item> {
    let entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(dir = %dir.display(), "skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| {
                options.show_hidden || !kind::is_hidden(&entry.file_name().to_string_lossy())
            })
            .collect(),
        Err(e) => {
            warn!("{}", PeekError::access(dir, e));
            return Vec::new();
        }
    };

    entries
        .into_par_iter()
        .filter_map(|entry| match build_item(&entry, depth, options) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!("{e}");
                None
            }
        })
        .collect()
}

fn build_item(entry: &fs::DirEntry, depth: usize, options: &WalkOptions) -> Result<Item> {
    let path = entry.path();
    let name = entry.file_name().to_string_lossy().into_owned();
    let metadata = entry
        .metadata()
        .map_err(|e| PeekError::access(&path, e))?;
    let modified_at = metadata
        .modified()
        .map(|t| DateTime::<Local>::from(t).naive_local())
        .unwrap_or_else(|_| now());

    if !metadata.is_dir() {
        return Ok(Item {
            id: path,
            kind: kind::describe(&name, false),
            name,
            is_directory: false,
            modified_at,
            size: Some(metadata.len()),
            children: None,
            archive_origin: None,
        });
    }

    let size = deep_size(&path, options.show_hidden);

    // Packages are shown as one opaque item
    if kind::is_package(&name) {
        return Ok(Item {
            id: path,
            kind: kind::describe(&name, false),
            name,
            is_directory: false,
            modified_at,
            size: Some(size),
            children: None,
            archive_origin: None,
        });
    }

    let expand = options.depth_budget.is_none_or(|limit| depth < limit);
    let children = expand.then(|| fetch_items(&path, depth + 1, options));

    Ok(Item {
        id: path,
        kind: kind::FOLDER_KIND.to_string(),
        name,
        is_directory: true,
        modified_at,
        size: Some(size),
        children,
        archive_origin: None,
    })
}

/// Sum of all file lengths beneath `dir`, without building items.
///
/// Symlinks are not followed. Honours the hidden-file filter so that, with
/// no depth limit, a directory's size equals the sum of its listed files.
pub fn deep_size(dir: &Path, show_hidden: bool) -> u64 {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| show_hidden || !kind::is_hidden(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || e.path_is_symlink())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn options(depth_budget: Option<usize>, show_hidden: bool) -> WalkOptions {
        WalkOptions {
            depth_budget,
            show_hidden,
        }
    }

    fn find<'a>(items: &'a [Item], name: &str) -> &'a Item {
        items.iter().find(|i| i.name == name).unwrap()
    }

    #[test]
    fn hidden_files_filtered() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(".env"), "SECRET=1").unwrap();
        std::fs::write(temp.path().join("note.txt"), "hi").unwrap();

        let items = walk(temp.path(), &options(None, false));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "note.txt");
        assert_eq!(items[0].kind, "Plain Text");

        let items = walk(temp.path(), &options(None, true));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn depth_cutoff_leaves_children_absent() {
        let temp = tempfile::tempdir().unwrap();
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("deep.txt"), "12345").unwrap();

        let items = walk(temp.path(), &options(Some(1), false));
        assert_eq!(items.len(), 1);
        let sub_item = &items[0];
        assert!(sub_item.is_directory);
        assert_eq!(sub_item.children, None);
        // size is still the full deep size
        assert_eq!(sub_item.size, Some(5));
    }

    #[test]
    fn deep_sizes_match_brute_force() {
        let temp = tempfile::tempdir().unwrap();
        let a = temp.path().join("a");
        let b = a.join("b");
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("one"), vec![0u8; 100]).unwrap();
        std::fs::write(b.join("two"), vec![0u8; 250]).unwrap();
        std::fs::write(b.join("three"), vec![0u8; 7]).unwrap();
        std::fs::create_dir(b.join("empty")).unwrap();

        let items = walk(temp.path(), &options(None, false));
        let a_item = find(&items, "a");
        assert_eq!(a_item.size, Some(357));
        let b_item = find(a_item.children.as_ref().unwrap(), "b");
        assert_eq!(b_item.size, Some(257));
        let empty = find(b_item.children.as_ref().unwrap(), "empty");
        assert_eq!(empty.size, Some(0));
        assert_eq!(empty.children, Some(vec![]));
    }

    #[test]
    fn package_directories_are_opaque() {
        let temp = tempfile::tempdir().unwrap();
        let app = temp.path().join("Tool.app").join("Contents");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("Info.plist"), "<plist/>").unwrap();

        let items = walk(temp.path(), &options(None, false));
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_directory);
        assert_eq!(items[0].children, None);
        assert_eq!(items[0].size, Some(8));
        assert_eq!(items[0].kind, "Application");
    }

    #[test]
    fn unreadable_directory_is_empty() {
        let items = walk(&PathBuf::from("/definitely/not/here"), &options(None, true));
        assert!(items.is_empty());
    }

    #[test]
    fn ids_are_full_paths() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("f.bin"), [1u8, 2, 3]).unwrap();
        let items = walk(temp.path(), &options(None, false));
        assert_eq!(items[0].id, temp.path().join("f.bin"));
        assert_eq!(items[0].kind, "BIN file");
    }
}
