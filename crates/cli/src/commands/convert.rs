use std::path::Path;

use anyhow::{bail, Context, Result};
use imagepack_core::builder::{build_collection, BuildProgress};
use imagepack_core::index::{CollectionsIndex, IndexEntry};
use imagepack_core::metadata::MetadataLoad;
use imagepack_core::scanner::{scan_tree, ALL_EXTENSIONS};
use imagepack_core::{save_collection, Shape};
use indicatif::ProgressBar;

use super::bar_style;

/// Convert every image under `source` into a simple-shape collection and
/// record it in the collections index.
pub fn run(
    source: &Path,
    output: &Path,
    name: Option<String>,
    index: Option<&Path>,
    limit: Option<usize>,
) -> Result<()> {
    let images = scan_tree(source, ALL_EXTENSIONS, limit)
        .with_context(|| format!("cannot scan {}", source.display()))?;
    if images.is_empty() {
        bail!("no images found in {}", source.display());
    }

    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());

    let report = build_collection(
        &MetadataLoad::default(),
        &images,
        Some(&mut |progress| match progress {
            BuildProgress::Start { total } => {
                pb.set_length(total as u64);
                pb.set_message(format!("Converting {}...", source.display()));
            }
            BuildProgress::Encoded { .. } => pb.inc(1),
            BuildProgress::Failed { name, error } => {
                pb.println(format!("  error processing {name}: {error}"));
                pb.inc(1);
            }
            BuildProgress::Complete { summary } => {
                pb.finish_with_message(format!("{} images converted", summary.processed));
            }
        }),
    );

    if report.collection.is_empty() {
        bail!("no images could be converted from {}", source.display());
    }

    save_collection(output, &report.collection, Shape::Simple)
        .with_context(|| format!("failed to save {}", output.display()))?;
    println!("Saved {} ({} images)", output.display(), report.collection.len());
    if report.summary.duplicate_keys > 0 {
        println!("  {} images skipped for duplicate keys", report.summary.duplicate_keys);
    }

    if let Some(index_path) = index {
        let file = output
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = name.unwrap_or_else(|| {
            source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.clone())
        });

        let mut idx = CollectionsIndex::load_or_default(index_path)?;
        let replaced = idx.upsert(IndexEntry {
            name,
            file,
            count: report.collection.len(),
        });
        idx.save(index_path)?;
        println!(
            "{} collections index {}: {} total images",
            if replaced { "Updated" } else { "Added to" },
            index_path.display(),
            idx.total_images
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagepack_core::load_collection;
    use std::fs;

    #[test]
    fn test_convert_writes_collection_and_index() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("icons");
        fs::create_dir_all(src.join("filled")).unwrap();
        fs::write(src.join("filled/star.svg"), b"<svg/>").unwrap();
        fs::write(src.join("home.png"), b"\x89PNG").unwrap();

        let out = tmp.path().join("collections/icons.json");
        let index = tmp.path().join("collections/collections_index.json");
        run(&src, &out, Some("Icons".into()), Some(index.as_path()), None).unwrap();

        let collection = load_collection(&out).unwrap();
        assert_eq!(collection.len(), 2);
        assert!(collection
            .get("filled/star")
            .unwrap()
            .base64
            .starts_with("data:image/svg+xml;base64,"));

        let idx = CollectionsIndex::load_or_default(&index).unwrap();
        assert_eq!(idx.collections[0].file, "icons.json");
        assert_eq!(idx.total_images, 2);
    }

    #[test]
    fn test_convert_empty_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = run(tmp.path(), &tmp.path().join("out.json"), None, None, None).unwrap_err();
        assert!(err.to_string().contains("no images found"));
    }
}
