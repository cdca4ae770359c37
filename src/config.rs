//! Explicit view configuration, passed into every enumeration call.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Smallest and largest accepted folder depth.
pub const MIN_FOLDER_DEPTH: usize = 1;
pub const MAX_FOLDER_DEPTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    #[value(alias = "date")]
    #[serde(alias = "date")]
    Modified,
    Size,
    Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// How every level of a tree is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
    /// Directories precede files at every level.
    pub folders_on_top: bool,
}

/// Preferences consumed by the enumeration core.
///
/// Missing fields in a JSON config take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub show_hidden_files: bool,
    pub keep_folders_on_top: bool,
    /// Presentation only; the core ignores it.
    pub expand_child_folders: bool,
    pub limit_folder_depth: bool,
    pub folder_depth: usize,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_hidden_files: false,
            keep_folders_on_top: true,
            expand_child_folders: true,
            limit_folder_depth: true,
            folder_depth: 7,
            sort_key: SortKey::Name,
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl ViewConfig {
    /// Maximum levels to expand, or `None` when unlimited.
    pub fn depth_budget(&self) -> Option<usize> {
        self.limit_folder_depth
            .then(|| self.folder_depth.clamp(MIN_FOLDER_DEPTH, MAX_FOLDER_DEPTH))
    }

    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            key: self.sort_key,
            direction: self.sort_direction,
            folders_on_top: self.keep_folders_on_top,
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ViewConfig::default();
        assert_eq!(config.depth_budget(), Some(7));
        assert!(config.sort_spec().folders_on_top);
        assert_eq!(config.sort_spec().key, SortKey::Name);
    }

    #[test]
    fn depth_is_clamped() {
        let mut config = ViewConfig {
            folder_depth: 0,
            ..ViewConfig::default()
        };
        assert_eq!(config.depth_budget(), Some(1));
        config.folder_depth = 99;
        assert_eq!(config.depth_budget(), Some(20));
        config.limit_folder_depth = false;
        assert_eq!(config.depth_budget(), None);
    }

    #[test]
    fn partial_json() {
        let config = ViewConfig::from_json(
            r#"{"showHiddenFiles": true, "folderDepth": 3, "sortKey": "date", "sortDirection": "descending"}"#,
        )
        .unwrap();
        assert!(config.show_hidden_files);
        assert!(config.keep_folders_on_top);
        assert_eq!(config.depth_budget(), Some(3));
        assert_eq!(config.sort_key, SortKey::Modified);
        assert_eq!(config.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn rejects_unknown_sort_key() {
        assert!(ViewConfig::from_json(r#"{"sortKey": "colour"}"#).is_err());
    }
}
