use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::write_text;

/// Default file name of the collections index.
pub const DEFAULT_INDEX_FILE: &str = "collections_index.json";

/// One collection listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    /// Collection file name, relative to the index.
    pub file: String,
    pub count: usize,
}

/// Bookkeeping file that lists several collections and their sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsIndex {
    #[serde(default)]
    pub generated: String,
    #[serde(default)]
    pub total_images: usize,
    #[serde(default)]
    pub collections: Vec<IndexEntry>,
}

impl CollectionsIndex {
    /// Read the index at `path`, or start an empty one if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Read an existing index.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up a collection by display name or file name, ignoring case.
    /// The file name also matches without its `.json` extension.
    pub fn find(&self, name: &str) -> Option<&IndexEntry> {
        let wanted = name.to_lowercase();
        self.collections.iter().find(|c| {
            let file = c.file.to_lowercase();
            c.name.to_lowercase() == wanted
                || file == wanted
                || file.strip_suffix(".json") == Some(wanted.as_str())
        })
    }

    /// Add an entry, replacing any entry for the same file.
    /// Returns true if an existing entry was replaced.
    pub fn upsert(&mut self, entry: IndexEntry) -> bool {
        let replaced = match self.collections.iter_mut().find(|c| c.file == entry.file) {
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                self.collections.push(entry);
                false
            }
        };
        self.total_images = self.collections.iter().map(|c| c.count).sum();
        replaced
    }

    /// Stamp the generation time and write the index.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.total_images = self.collections.iter().map(|c| c.count).sum();
        write_text(path, &serde_json::to_string_pretty(self)?)
    }
}

/// Where a listed collection lives: its file is relative to the index.
pub fn collection_path(index_path: &Path, entry: &IndexEntry) -> PathBuf {
    index_path
        .parent()
        .map(|dir| dir.join(&entry.file))
        .unwrap_or_else(|| PathBuf::from(&entry.file))
}
