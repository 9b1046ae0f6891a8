use std::path::Path;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use imagepack_core::metadata::load_metadata;
use imagepack_core::stats::{collection_stats, missing_keys, EntrySize};

use super::format_size;

pub fn run(lookup: &Path, metadata: &Path) -> Result<()> {
    let collection = super::load(lookup)?;
    let file_size = std::fs::metadata(lookup).map(|m| m.len()).unwrap_or(0);

    println!("File: {}", lookup.display());
    println!("Size: {} ({file_size} bytes)", format_size(file_size));
    println!("Entries: {}", collection.len());

    let stats = collection_stats(&collection);
    if stats.entries == 0 {
        println!("No base64 fields found.");
        return Ok(());
    }

    println!();
    println!("Data URI length (characters, prefix included):");
    println!("  Min:   {}", stats.min_chars);
    println!("  Max:   {}", stats.max_chars);
    println!("  Mean:  {}", stats.mean_chars);
    println!("  Total: {}", stats.total_chars);

    println!();
    println!("Smallest entries:");
    println!("{}", size_table(&stats.smallest));
    println!("Largest entries:");
    println!("{}", size_table(&stats.largest));

    if !stats.short.is_empty() {
        println!();
        println!(
            "Entries with unusually short data URIs (<{} chars): {}",
            imagepack_core::stats::SHORT_ENTRY_THRESHOLD,
            stats.short.len()
        );
        for entry in stats.short.iter().take(10) {
            println!("  {} {}", entry.key, entry.chars);
        }
    }

    println!();
    if metadata.exists() {
        let meta = load_metadata(metadata)?;
        let missing = missing_keys(&collection, &meta);
        if missing.is_empty() {
            println!("All metadata keys are present.");
        } else {
            println!("WARNING: missing {} metadata-derived keys:", missing.len());
            for key in &missing {
                println!("  {key}");
            }
        }
    } else {
        println!(
            "Metadata CSV not found for cross-check: {}",
            metadata.display()
        );
    }
    Ok(())
}

fn size_table(entries: &[EntrySize]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Key"), Cell::new("Chars"), Cell::new("Original")]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.key),
            Cell::new(entry.chars).set_alignment(CellAlignment::Right),
            Cell::new(format_size(entry.approx_bytes as u64)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
