use std::path::Path;

use anyhow::{bail, Context, Result};
use imagepack_core::inject::inject;

use super::format_size;

/// How many available keys to suggest when placeholders are unresolved.
const SUGGESTIONS: usize = 20;

pub fn run(template: &Path, output: &Path, lookup: &Path) -> Result<()> {
    if !template.exists() {
        bail!("template file not found: {}", template.display());
    }
    let text = std::fs::read_to_string(template)
        .with_context(|| format!("failed to read template {}", template.display()))?;
    let collection = super::load(lookup)?;

    let result = inject(&text, &collection);

    if result.placeholders.is_empty() {
        println!("WARNING: no {{{{placeholders}}}} found in {}", template.display());
        println!("Use format: <img src=\"{{{{image-name}}}}\" alt=\"...\">");
        return Ok(());
    }

    println!(
        "Found {} placeholder(s): {}",
        result.placeholders.len(),
        result.placeholders.join(", ")
    );
    println!();

    for name in &result.placeholders {
        match collection.get(name) {
            Some(record) if !record.description.is_empty() => {
                println!("  ✓ {{{{{name}}}}} - {}", record.description)
            }
            Some(_) => println!("  ✓ {{{{{name}}}}}"),
            None => println!("  ✗ no data for {{{{{name}}}}}"),
        }
    }

    if !result.unresolved.is_empty() {
        println!();
        println!(
            "WARNING: {} image(s) not found in lookup:",
            result.unresolved.len()
        );
        for name in &result.unresolved {
            println!("  - {name}");
        }
        println!();
        println!("Available images:");
        for (key, record) in collection.iter().take(SUGGESTIONS) {
            if record.description.is_empty() {
                println!("  - {key}");
            } else {
                println!("  - {key} ({})", record.description);
            }
        }
        if collection.len() > SUGGESTIONS {
            println!("  ... and {} more", collection.len() - SUGGESTIONS);
        }
        println!();
        println!("TIP: use `imagepack search` to find images by tags or description");
    }

    std::fs::write(output, &result.output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!();
    println!("Created: {}", output.display());
    println!("  Replacements: {}", result.resolved);
    println!("  File size: {}", format_size(result.output.len() as u64));
    Ok(())
}
