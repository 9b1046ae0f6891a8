//! JSON persistence for collections.
//!
//! Two on-disk shapes exist. The enriched shape maps each key to an object
//! (`base64`, `description`, `category`, `tags`, `notes`, `filename`); the
//! simple shape maps each key straight to its data URI. Both are accepted on
//! read and normalized once into [`LookupRecord`]s.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Collection, LookupRecord};
use crate::error::{Error, Result};

/// Default file name of a persisted collection.
pub const DEFAULT_LOOKUP_FILE: &str = "image_base64_lookup.json";

/// Output shape for [`save_collection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Enriched,
    Simple,
}

/// A single value as found on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Simple(String),
    Enriched(LookupRecord),
}

impl From<Entry> for LookupRecord {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Simple(uri) => LookupRecord::bare(uri),
            Entry::Enriched(record) => record,
        }
    }
}

impl Collection {
    /// Parse either shape.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Entry> = serde_json::from_str(text)?;
        Ok(raw
            .into_iter()
            .map(|(k, e)| (k, LookupRecord::from(e)))
            .collect())
    }

    /// Pretty-printed JSON in the given shape.
    pub fn to_json(&self, shape: Shape) -> Result<String> {
        let text = match shape {
            Shape::Enriched => serde_json::to_string_pretty(self)?,
            Shape::Simple => serde_json::to_string_pretty(&self.data_uris())?,
        };
        Ok(text)
    }
}

/// Read a collection from disk.
pub fn load_collection(path: &Path) -> Result<Collection> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| Error::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Collection::from_json(&text).map_err(|e| match e {
        Error::Json(source) => Error::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Write a collection to disk, creating parent directories as needed.
pub fn save_collection(path: &Path, collection: &Collection, shape: Shape) -> Result<()> {
    let text = collection.to_json(shape)?;
    write_text(path, &text)
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    let write_failed = |source| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(path, text).map_err(write_failed)
}
