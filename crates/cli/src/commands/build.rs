use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use imagepack_core::builder::{BuildProgress, BuildReport};
use imagepack_core::{query, save_collection, BuildOptions, Collection, Pipeline, Shape};
use indicatif::ProgressBar;

use super::{bar_style, format_size};

/// How many tags to print in the post-build summary.
const TAG_PREVIEW: usize = 30;

pub fn run(
    metadata: PathBuf,
    images: Option<PathBuf>,
    output: &Path,
    limit: Option<usize>,
    list_only: bool,
) -> Result<()> {
    let started = Instant::now();

    let mut opts = BuildOptions::new(&metadata).limit(limit);
    if let Some(dir) = images {
        opts = opts.images(dir);
    }

    let pipeline = Pipeline::prepare(&opts).with_context(|| {
        format!(
            "cannot start build (metadata: {}, working directory: {})",
            metadata.display(),
            std::env::current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|_| ".".into())
        )
    })?;

    println!(
        "Loaded metadata for {} images from {}",
        pipeline.metadata().len(),
        metadata.display()
    );
    if pipeline.metadata().skipped_rows > 0 {
        println!("  {} rows without a filename skipped", pipeline.metadata().skipped_rows);
    }
    println!(
        "Found {} image files in {}",
        pipeline.images().len(),
        pipeline.image_dir().display()
    );
    println!();

    if list_only {
        return list_alignment(&pipeline);
    }

    let report = encode(&pipeline);
    print_summary(&report);

    if report.collection.is_empty() {
        bail!(
            "no images were converted; check that PNG/JPG files are in {}",
            pipeline.image_dir().display()
        );
    }

    save_collection(output, &report.collection, Shape::Enriched)
        .with_context(|| format!("failed to save lookup to {}", output.display()))?;

    let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    println!();
    println!("Saved enriched lookup: {} ({})", output.display(), format_size(size));

    print_catalogue(&report.collection);

    println!();
    println!("Next steps:");
    println!("  imagepack search --tag <tag>         find images by tag or description");
    println!("  imagepack inject <template> <out>    apply data URIs to a template");
    println!();
    println!("Done in {:.2} s", started.elapsed().as_secs_f64());
    Ok(())
}

fn list_alignment(pipeline: &Pipeline) -> Result<()> {
    let aligned = pipeline.alignment();
    if aligned.is_empty() {
        bail!("no PNG/JPG files in {}", pipeline.image_dir().display());
    }
    let matches = aligned.iter().filter(|(_, has)| *has).count();

    for (img, has_meta) in &aligned {
        println!("{} | {}", if *has_meta { "META" } else { "----" }, img.name);
    }
    println!();
    println!(
        "Total images: {} | With metadata: {} | Without: {}",
        aligned.len(),
        matches,
        aligned.len() - matches
    );
    Ok(())
}

fn encode(pipeline: &Pipeline) -> BuildReport {
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());

    pipeline.build(Some(&mut |progress| match progress {
        BuildProgress::Start { total } => {
            pb.set_length(total as u64);
            pb.set_position(0);
            pb.set_message("Converting to base64...");
        }
        BuildProgress::Encoded {
            name,
            bytes,
            has_metadata,
        } => {
            let status = if has_metadata { "with metadata" } else { "no metadata" };
            pb.println(format!(
                "  {:<14} | {:<40} | {:>9}",
                status,
                name,
                format_size(bytes as u64)
            ));
            pb.inc(1);
        }
        BuildProgress::Failed { name, error } => {
            pb.println(format!("  {:<14} | {:<40} | {}", "ERROR", name, error));
            pb.inc(1);
        }
        BuildProgress::Complete { summary } => {
            pb.finish_with_message(format!(
                "{} converted, {} skipped",
                summary.processed, summary.skipped
            ));
        }
    }))
}

fn print_summary(report: &BuildReport) {
    let s = &report.summary;
    println!();
    println!("  Processed:        {}", s.processed);
    println!("  Skipped:          {}", s.skipped);
    println!("  With metadata:    {}", s.with_metadata);
    println!("  Without metadata: {}", s.without_metadata);
    if s.duplicate_keys > 0 {
        println!("  Duplicate keys:   {}", s.duplicate_keys);
    }
    for (path, error) in &report.failures {
        println!("  failed: {} ({error})", path.display());
    }
}

fn print_catalogue(collection: &Collection) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Category"), Cell::new("Images")]);
    for (category, count) in query::category_counts(collection) {
        table.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    println!();
    println!("{table}");

    let tags = query::all_tags(collection);
    println!();
    println!("  Unique tags: {}", tags.len());
    for chunk in tags
        .iter()
        .take(TAG_PREVIEW)
        .collect::<Vec<_>>()
        .chunks(3)
    {
        let row: Vec<String> = chunk.iter().map(|t| format!("{t:<25}")).collect();
        println!("  {}", row.join(" ").trim_end());
    }
    if tags.len() > TAG_PREVIEW {
        println!("  ... and {} more tags", tags.len() - TAG_PREVIEW);
    }
}
