pub mod build;
pub mod collections;
pub mod convert;
pub mod inject;
pub mod search;
pub mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use imagepack_core::{Collection, Error};
use indicatif::ProgressStyle;

/// Load a lookup file, pointing at `imagepack build` when it is missing.
pub fn load(path: &Path) -> Result<Collection> {
    match imagepack_core::load_collection(path) {
        Ok(c) => Ok(c),
        Err(e @ Error::NotFound(_)) => Err(e).with_context(|| {
            format!(
                "lookup file not found: {} (run `imagepack build` first)",
                path.display()
            )
        }),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("=>-")
}

/// Format a byte count as a human-readable string.
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} B", b),
    }
}
