use std::path::Path;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use imagepack_core::index::{collection_path, CollectionsIndex, IndexEntry};
use imagepack_core::query::{self, Filter};
use imagepack_core::{load_collection, Collection, Error};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Characters of a data URI shown in search results.
const PREVIEW_CHARS: usize = 60;

/// What to do with the collections index.
pub enum Action<'a> {
    List,
    Search { term: &'a str, limit: usize },
    Sample { count: usize, seed: Option<u64> },
}

pub fn run(index_path: &Path, collection: Option<&str>, action: Action<'_>) -> Result<()> {
    match (collection, action) {
        (_, Action::List) => list(index_path),
        (Some(name), Action::Search { term, limit }) => search(index_path, name, term, limit),
        (Some(name), Action::Sample { count, seed }) => sample(index_path, name, count, seed),
        (None, _) => bail!("--search and --random need --collection <name> (see --list)"),
    }
}

fn list(index_path: &Path) -> Result<()> {
    let index = load_index(index_path)?;

    println!("Generated: {}", index.generated);
    println!("Total images: {}", index.total_images);
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Name"),
        Cell::new("File"),
        Cell::new("Images"),
    ]);
    for (i, entry) in index.collections.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.name),
            Cell::new(&entry.file),
            Cell::new(entry.count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn search(index_path: &Path, name: &str, term: &str, limit: usize) -> Result<()> {
    let (entry, collection) = open(index_path, name)?;
    let hits = query::sorted(query::search(&collection, &[Filter::Key(term.to_string())])?);
    if hits.is_empty() {
        println!("No matches for '{term}' in {}", entry.name);
        return Ok(());
    }

    println!("Found {} match(es) for '{term}' in {}:", hits.len(), entry.name);
    println!();
    for (i, key) in hits.iter().take(limit).enumerate() {
        let uri = collection.get(key).map(|r| r.base64.as_str()).unwrap_or_default();
        println!("{:>3}. {{{{{key}}}}}", i + 1);
        println!("     {}", preview(uri));
    }
    if hits.len() > limit {
        println!("... and {} more matches", hits.len() - limit);
    }
    Ok(())
}

fn sample(index_path: &Path, name: &str, count: usize, seed: Option<u64>) -> Result<()> {
    let (entry, collection) = open(index_path, name)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let picked = query::sample(&collection, count, &mut rng);
    println!("{} random sample(s) from {}:", picked.len(), entry.name);
    for (i, key) in picked.iter().enumerate() {
        println!("{:>3}. {{{{{key}}}}}", i + 1);
    }
    Ok(())
}

fn load_index(path: &Path) -> Result<CollectionsIndex> {
    match CollectionsIndex::load(path) {
        Ok(index) => Ok(index),
        Err(e @ Error::NotFound(_)) => Err(e).with_context(|| {
            format!(
                "collections index not found: {} (run `imagepack convert` first)",
                path.display()
            )
        }),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a collection through the index and load it.
fn open(index_path: &Path, name: &str) -> Result<(IndexEntry, Collection)> {
    let index = load_index(index_path)?;
    let Some(entry) = index.find(name) else {
        let known: Vec<&str> = index.collections.iter().map(|c| c.name.as_str()).collect();
        bail!("unknown collection: {name} (available: {})", known.join(", "));
    };

    let path = collection_path(index_path, entry);
    let collection = load_collection(&path)
        .with_context(|| format!("cannot open collection {}", entry.name))?;
    Ok((entry.clone(), collection))
}

fn preview(uri: &str) -> String {
    if uri.chars().count() > PREVIEW_CHARS {
        format!("{}...", uri.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        uri.to_string()
    }
}
