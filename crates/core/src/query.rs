use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::domain::{Collection, LookupRecord};
use crate::error::{Error, Result};

/// One search criterion. All comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Record carries every listed tag.
    Tags(Vec<String>),
    /// Substring of the description.
    Description(String),
    /// Exact category.
    Category(String),
    /// Substring of description, category, notes and tags combined.
    Keyword(String),
    /// Substring of the key itself.
    Key(String),
}

impl Filter {
    fn matches(&self, key: &str, record: &LookupRecord) -> bool {
        match self {
            Filter::Tags(wanted) => {
                let have: HashSet<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
                wanted.iter().all(|t| have.contains(&t.to_lowercase()))
            }
            Filter::Description(term) => record
                .description
                .to_lowercase()
                .contains(&term.to_lowercase()),
            Filter::Category(category) => record.category.to_lowercase() == category.to_lowercase(),
            Filter::Keyword(term) => searchable_text(record).contains(&term.to_lowercase()),
            Filter::Key(term) => key.to_lowercase().contains(&term.to_lowercase()),
        }
    }
}

/// Lower-cased text searched by [`Filter::Keyword`].
fn searchable_text(record: &LookupRecord) -> String {
    let tags = record.tags.join(" ");
    [
        record.description.as_str(),
        record.category.as_str(),
        record.notes.as_str(),
        tags.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Keys of all records matching every filter. The set is unordered; use
/// [`sorted`] before display.
pub fn search(collection: &Collection, filters: &[Filter]) -> Result<HashSet<String>> {
    if filters.is_empty() {
        return Err(Error::EmptyQuery);
    }
    if filters
        .iter()
        .any(|f| matches!(f, Filter::Tags(tags) if tags.is_empty()))
    {
        return Err(Error::EmptyTagQuery);
    }

    Ok(collection
        .iter()
        .filter(|(key, record)| filters.iter().all(|f| f.matches(key, record)))
        .map(|(key, _)| key.clone())
        .collect())
}

/// Results in lexicographic key order.
pub fn sorted(results: HashSet<String>) -> Vec<String> {
    let mut keys: Vec<String> = results.into_iter().collect();
    keys.sort();
    keys
}

/// Number of records per category.
pub fn category_counts(collection: &Collection) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for (_, record) in collection.iter() {
        *counts.entry(record.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Every distinct tag in the collection.
pub fn all_tags(collection: &Collection) -> BTreeSet<String> {
    collection
        .iter()
        .flat_map(|(_, r)| r.tags.iter().cloned())
        .collect()
}

/// Up to `count` distinct keys picked at random, in key order. The caller
/// owns the random source, so a seeded one gives a repeatable pick.
pub fn sample<R: Rng + ?Sized>(collection: &Collection, count: usize, rng: &mut R) -> Vec<String> {
    let mut picked: Vec<String> = collection.keys().cloned().choose_multiple(rng, count);
    picked.sort();
    picked
}
