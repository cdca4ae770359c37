//! Command-line front end for folderpeek.
//!
//! Stands in for the preview host: it hands a path and a configuration to
//! the library and renders the resulting tree as text or JSON.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use folderpeek::preview::{self, Source};
use folderpeek::{ArchiveOrigin, Cli, Item, Listing, ViewConfig, zip};

/// Width of the name column in tree output.
const NAME_WIDTH: usize = 48;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, replaces the -v default entirely
    let level = if cli.verbose { "folderpeek=debug" } else { "folderpeek=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let base = match &cli.config {
        Some(path) => load_config(path)?,
        None => ViewConfig::default(),
    };
    let config = cli.view_config(base);

    if let Some(entry) = &cli.pipe {
        return pipe_entry(&cli.path, entry).await;
    }

    let listing = preview::load(&cli.path, &config).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    print_listing(&listing, cli.quiet);
    Ok(())
}

fn load_config(path: &Path) -> Result<ViewConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    ViewConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Write one archive entry's decompressed bytes to stdout.
async fn pipe_entry(archive: &Path, wanted: &str) -> Result<()> {
    if preview::classify(archive) != Source::Archive {
        bail!("{} is not a ZIP archive", archive.display());
    }

    let wanted = wanted.trim_matches('/');
    let entries = preview::read_entries(archive).await?;
    let Some(entry) = entries.iter().find(|e| e.path == wanted) else {
        bail!("{wanted}: no such entry in {}", archive.display());
    };
    if entry.is_directory {
        bail!("{wanted} is a directory");
    }

    let origin = ArchiveOrigin::from_entry(archive, entry);
    let Some(data) = zip::extract(&origin).await else {
        bail!("{wanted}: cannot extract (unsupported method, encrypted, too large or corrupt)");
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&data).await?;
    stdout.flush().await?;
    Ok(())
}

fn print_listing(listing: &Listing, quiet: bool) {
    if listing.is_empty() {
        println!("Folder is empty");
    } else {
        println!(
            "{:<w$}  {:>10}  {:>16}  Kind",
            "Name",
            "Size",
            "Date Modified",
            w = NAME_WIDTH
        );
        println!("{}", "-".repeat(NAME_WIDTH + 44));
        print_items(&listing.items, 0);
    }

    if !quiet {
        println!("{}", "-".repeat(NAME_WIDTH + 44));
        println!("{}", listing.status_description());
    }
}

fn print_items(items: &[Item], depth: usize) {
    for item in items {
        let marker = if item.is_directory { "/" } else { "" };
        let label = format!("{}{}{}", "  ".repeat(depth), item.name, marker);
        println!(
            "{:<w$}  {:>10}  {:>16}  {}",
            label,
            item.size_string(),
            item.date_string(),
            item.kind,
            w = NAME_WIDTH
        );
        if let Some(children) = &item.children {
            print_items(children, depth + 1);
        }
    }
}
