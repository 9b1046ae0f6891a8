use crate::domain::Collection;
use crate::encoder::estimated_payload_bytes;
use crate::metadata::MetadataLoad;

/// Entries whose data URI is shorter than this are flagged as suspicious.
pub const SHORT_ENTRY_THRESHOLD: usize = 1000;

/// How many entries to list at each end of the size range.
pub const EXTREMES: usize = 5;

/// Size of one entry's data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySize {
    pub key: String,
    /// Characters in the data URI, prefix included.
    pub chars: usize,
    /// Estimated size of the original file.
    pub approx_bytes: usize,
}

/// Size statistics over a collection's data URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub entries: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub mean_chars: usize,
    pub total_chars: usize,
    pub smallest: Vec<EntrySize>,
    pub largest: Vec<EntrySize>,
    pub short: Vec<EntrySize>,
}

pub fn collection_stats(collection: &Collection) -> CollectionStats {
    let mut sizes: Vec<EntrySize> = collection
        .iter()
        .map(|(key, record)| EntrySize {
            key: key.clone(),
            chars: record.base64.len(),
            approx_bytes: estimated_payload_bytes(&record.base64),
        })
        .collect();

    if sizes.is_empty() {
        return CollectionStats::default();
    }

    // Stable sort keeps key order among equal sizes.
    sizes.sort_by_key(|s| s.chars);

    let total_chars: usize = sizes.iter().map(|s| s.chars).sum();
    let entries = sizes.len();

    CollectionStats {
        entries,
        min_chars: sizes[0].chars,
        max_chars: sizes[entries - 1].chars,
        mean_chars: total_chars / entries,
        total_chars,
        smallest: sizes.iter().take(EXTREMES).cloned().collect(),
        largest: sizes.iter().rev().take(EXTREMES).cloned().collect(),
        short: sizes
            .iter()
            .filter(|s| s.chars < SHORT_ENTRY_THRESHOLD)
            .cloned()
            .collect(),
    }
}

/// Metadata keys that have no record in the collection, sorted.
pub fn missing_keys(collection: &Collection, metadata: &MetadataLoad) -> Vec<String> {
    let mut missing: Vec<String> = metadata
        .records
        .keys()
        .filter(|k| !collection.contains_key(k))
        .cloned()
        .collect();
    missing.sort();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LookupRecord, MetadataRecord};

    fn collection(sizes: &[(&str, usize)]) -> Collection {
        sizes
            .iter()
            .map(|(k, n)| (k.to_string(), LookupRecord::bare("x".repeat(*n))))
            .collect()
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(collection_stats(&Collection::new()), CollectionStats::default());
    }

    #[test]
    fn test_basic_stats() {
        let stats = collection_stats(&collection(&[("a", 100), ("b", 3000), ("c", 2000)]));
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.min_chars, 100);
        assert_eq!(stats.max_chars, 3000);
        assert_eq!(stats.mean_chars, 1700);
        assert_eq!(stats.total_chars, 5100);
        assert_eq!(stats.short.len(), 1);
        assert_eq!(stats.short[0].key, "a");
        assert_eq!(stats.largest[0].key, "b");
        assert_eq!(stats.smallest[0].key, "a");
    }

    #[test]
    fn test_extremes_capped() {
        let sizes: Vec<(String, usize)> = (0..12).map(|i| (format!("k{i:02}"), 1000 + i)).collect();
        let refs: Vec<(&str, usize)> = sizes.iter().map(|(k, n)| (k.as_str(), *n)).collect();
        let stats = collection_stats(&collection(&refs));
        assert_eq!(stats.smallest.len(), EXTREMES);
        assert_eq!(stats.largest.len(), EXTREMES);
        assert_eq!(stats.largest[0].key, "k11");
        assert!(stats.short.is_empty());
    }

    #[test]
    fn test_missing_keys() {
        let mut meta = MetadataLoad::default();
        for key in ["b", "a", "z"] {
            meta.records.insert(
                key.into(),
                MetadataRecord {
                    key: key.into(),
                    description: String::new(),
                    category: String::new(),
                    tags: vec![],
                    notes: String::new(),
                    original_filename: format!("{key}.png"),
                },
            );
        }
        let c = collection(&[("a", 10)]);
        assert_eq!(missing_keys(&c, &meta), vec!["b", "z"]);
    }
}
