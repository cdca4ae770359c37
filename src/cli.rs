use clap::Parser;
use std::path::PathBuf;

use crate::config::{MAX_FOLDER_DEPTH, SortDirection, SortKey, ViewConfig};

#[derive(Parser, Debug)]
#[command(name = "folderpeek")]
#[command(version)]
#[command(about = "Preview the contents of a folder or ZIP archive as a tree", long_about = None)]
#[command(after_help = "Examples:\n  \
  folderpeek ~/Downloads -L 2          two levels of a folder\n  \
  folderpeek photos.zip -s size -r     archive contents, largest first\n  \
  folderpeek photos.zip -p a.jpg > a.jpg   pipe one entry to stdout")]
pub struct Cli {
    /// Folder or ZIP archive to preview
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Show hidden files
    #[arg(short = 'a')]
    pub all: bool,

    /// Sort folders together with files instead of on top
    #[arg(long)]
    pub mixed: bool,

    /// Expand at most this many levels
    #[arg(short = 'L', long = "depth", value_name = "N",
          value_parser = clap::value_parser!(u8).range(1..=MAX_FOLDER_DEPTH as i64))]
    pub depth: Option<u8>,

    /// Expand every level
    #[arg(short = 'U', long, conflicts_with = "depth")]
    pub unlimited: bool,

    /// Sort key
    #[arg(short = 's', long = "sort", value_enum, value_name = "KEY")]
    pub sort: Option<SortKey>,

    /// Reverse the sort order
    #[arg(short = 'r')]
    pub reverse: bool,

    /// Print the listing as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Extract one archive entry to stdout
    #[arg(short = 'p', value_name = "ENTRY")]
    pub pipe: Option<String>,

    /// Read defaults from a JSON config file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode: no status line
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Overlay command-line flags on `base`.
    pub fn view_config(&self, base: ViewConfig) -> ViewConfig {
        let mut config = base;
        if self.all {
            config.show_hidden_files = true;
        }
        if self.mixed {
            config.keep_folders_on_top = false;
        }
        if let Some(depth) = self.depth {
            config.limit_folder_depth = true;
            config.folder_depth = depth.into();
        }
        if self.unlimited {
            config.limit_folder_depth = false;
        }
        if let Some(key) = self.sort {
            config.sort_key = key;
        }
        if self.reverse {
            config.sort_direction = SortDirection::Descending;
        }
        config
    }
}
