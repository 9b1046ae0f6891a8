//! CSV metadata loading.
//!
//! The table needs a `filename` column; `description`, `category`, `tags`
//! (pipe-separated) and `notes` are optional.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{MetadataRecord, UNCATEGORIZED};
use crate::error::{Error, Result};

pub const TAG_DELIMITER: char = '|';

/// Result of loading a metadata table.
#[derive(Debug, Default)]
pub struct MetadataLoad {
    pub records: HashMap<String, MetadataRecord>,
    /// Rows without a filename.
    pub skipped_rows: usize,
    /// Rows that replaced an earlier row with the same key.
    pub overwritten: usize,
}

impl MetadataLoad {
    pub fn get(&self, key: &str) -> Option<&MetadataRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load metadata from a CSV file on disk.
pub fn load_metadata(path: &Path) -> Result<MetadataLoad> {
    let file = std::fs::File::open(path).map_err(|source| Error::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let load = parse_metadata(file, path)?;
    tracing::info!(
        records = load.len(),
        skipped_rows = load.skipped_rows,
        "loaded metadata from {}",
        path.display()
    );
    Ok(load)
}

/// Parse metadata from any reader. `origin` is only used in error messages.
pub fn parse_metadata<R: Read>(reader: R, origin: &Path) -> Result<MetadataLoad> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim_start_matches('\u{feff}') == name);

    let filename_col = column("filename").ok_or_else(|| Error::MissingColumn {
        column: "filename",
        path: origin.to_path_buf(),
    })?;
    let description_col = column("description");
    let category_col = column("category");
    let tags_col = column("tags");
    let notes_col = column("notes");

    let mut load = MetadataLoad::default();

    for (idx, row) in rdr.records().enumerate() {
        let row = row?;
        let field = |col: Option<usize>| col.and_then(|c| row.get(c)).unwrap_or("");

        let filename = field(Some(filename_col)).trim();
        if filename.is_empty() {
            debug!(row = idx + 1, "skipping row with blank filename");
            load.skipped_rows += 1;
            continue;
        }

        let key = stem_of(filename);
        let category = field(category_col).trim();
        let record = MetadataRecord {
            key: key.clone(),
            description: field(description_col).to_string(),
            category: if category.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                category.to_string()
            },
            tags: split_tags(field(tags_col)),
            notes: field(notes_col).to_string(),
            original_filename: filename.to_string(),
        };

        if let Some(previous) = load.records.insert(key.clone(), record) {
            warn!(
                key = %key,
                previous = %previous.original_filename,
                replacement = %filename,
                "duplicate metadata row, keeping the later one"
            );
            load.overwritten += 1;
        }
    }

    Ok(load)
}

/// Split a pipe-delimited tag string, trimming and dropping empty tokens.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Filename without its extension.
pub fn stem_of(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| filename.to_string())
}
