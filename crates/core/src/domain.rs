use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Category assigned to assets without one.
pub const UNCATEGORIZED: &str = "uncategorized";

/// One row of the metadata table, keyed by the stem of its `filename` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub key: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub original_filename: String,
}

/// An image discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    /// Basename including extension.
    pub name: String,
    /// Lower-cased extension without the dot.
    pub extension: String,
    /// Collection key: the stem for flat scans, the relative path without
    /// extension for recursive scans.
    pub key: String,
}

/// The unit of a collection. The key lives in the enclosing map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    /// Empty when a stored entry carries no payload.
    #[serde(default)]
    pub base64: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub filename: String,
}

impl LookupRecord {
    /// Merge an encoded image with its metadata, if any.
    pub fn merge(data_uri: String, filename: &str, meta: Option<&MetadataRecord>) -> Self {
        match meta {
            Some(meta) => Self {
                base64: data_uri,
                description: meta.description.clone(),
                category: meta.category.clone(),
                tags: meta.tags.clone(),
                notes: meta.notes.clone(),
                filename: filename.to_string(),
            },
            None => Self {
                base64: data_uri,
                description: String::new(),
                category: UNCATEGORIZED.to_string(),
                tags: Vec::new(),
                notes: String::new(),
                filename: filename.to_string(),
            },
        }
    }

    /// A record carrying only a data URI, as read from the simple shape.
    pub fn bare(data_uri: String) -> Self {
        Self {
            base64: data_uri,
            description: String::new(),
            category: String::new(),
            tags: Vec::new(),
            notes: String::new(),
            filename: String::new(),
        }
    }
}

/// Mapping from key to record. Kept sorted so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Collection {
    records: BTreeMap<String, LookupRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns false, leaving the collection untouched, if the
    /// key is already present.
    pub fn insert_new(&mut self, key: String, record: LookupRecord) -> bool {
        use std::collections::btree_map::Entry;
        match self.records.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&LookupRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LookupRecord)> {
        self.records.iter()
    }

    /// Simple shape: key → data URI.
    pub fn data_uris(&self) -> BTreeMap<&str, &str> {
        self.records
            .iter()
            .map(|(k, r)| (k.as_str(), r.base64.as_str()))
            .collect()
    }
}

impl FromIterator<(String, LookupRecord)> for Collection {
    fn from_iter<I: IntoIterator<Item = (String, LookupRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Acceptance summary of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Images encoded into the collection.
    pub processed: usize,
    /// Images that failed to read or encode.
    pub skipped: usize,
    pub with_metadata: usize,
    pub without_metadata: usize,
    /// Images dropped because an earlier image produced the same key.
    pub duplicate_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> MetadataRecord {
        MetadataRecord {
            key: "cat".into(),
            description: "Orange cat".into(),
            category: "animals".into(),
            tags: vec!["pet".into(), "cat".into()],
            notes: "from the shelter shoot".into(),
            original_filename: "cat.png".into(),
        }
    }

    #[test]
    fn test_merge_with_metadata() {
        let r = LookupRecord::merge("data:image/png;base64,AA==".into(), "cat.png", Some(&meta()));
        assert_eq!(r.description, "Orange cat");
        assert_eq!(r.category, "animals");
        assert_eq!(r.tags, vec!["pet", "cat"]);
        assert_eq!(r.notes, "from the shelter shoot");
        assert_eq!(r.filename, "cat.png");
    }

    #[test]
    fn test_merge_without_metadata_defaults() {
        let r = LookupRecord::merge("data:image/png;base64,AA==".into(), "dog.png", None);
        assert_eq!(r.description, "");
        assert_eq!(r.category, UNCATEGORIZED);
        assert!(r.tags.is_empty());
        assert_eq!(r.filename, "dog.png");
    }

    #[test]
    fn test_insert_new_keeps_first() {
        let mut c = Collection::new();
        assert!(c.insert_new("a".into(), LookupRecord::bare("first".into())));
        assert!(!c.insert_new("a".into(), LookupRecord::bare("second".into())));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("a").unwrap().base64, "first");
    }

    #[test]
    fn test_keys_sorted() {
        let c: Collection = ["zebra", "apple", "mango"]
            .into_iter()
            .map(|k| (k.to_string(), LookupRecord::bare(String::new())))
            .collect();
        let keys: Vec<&String> = c.keys().collect();
        assert_eq!(keys, vec!["apple", "mango", "zebra"]);
    }
}
