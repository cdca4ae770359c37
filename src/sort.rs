//! Recursive, deterministic ordering of item forests.

use std::cmp::Ordering;

use crate::config::{SortDirection, SortKey, SortSpec};
use crate::item::Item;

/// Order `items` and every descendant level by `spec`.
///
/// With `folders_on_top`, each level is partitioned into directories and
/// files, each partition sorted on its own, directories first. Comparison
/// falls back to the item id, so the result is a total order and sorting
/// twice changes nothing.
pub fn sort_items(items: Vec<Item>, spec: &SortSpec) -> Vec<Item> {
    let items = items
        .into_iter()
        .map(|mut item| {
            if let Some(kids) = item.children.take() {
                item.children = Some(sort_items(kids, spec));
            }
            item
        })
        .collect();
    order_level(items, spec)
}

/// Order a single level, leaving children untouched.
pub fn order_level(mut items: Vec<Item>, spec: &SortSpec) -> Vec<Item> {
    if spec.folders_on_top {
        let (mut folders, mut files): (Vec<Item>, Vec<Item>) =
            items.into_iter().partition(|item| item.is_directory);
        sort_level(&mut folders, spec);
        sort_level(&mut files, spec);
        folders.append(&mut files);
        folders
    } else {
        sort_level(&mut items, spec);
        items
    }
}

fn sort_level(items: &mut [Item], spec: &SortSpec) {
    items.sort_by(|a, b| {
        let ord = compare(a, b, spec.key);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare(a: &Item, b: &Item, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::Modified => a.modified_at.cmp(&b.modified_at),
        SortKey::Size => a.size_for_sorting().cmp(&b.size_for_sorting()),
        SortKey::Kind => a.kind.to_lowercase().cmp(&b.kind.to_lowercase()),
    };
    primary
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Case-insensitive first, so `b.txt` lands between `A.txt` and `C.txt`.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
