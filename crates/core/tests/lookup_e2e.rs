use std::fs;
use std::path::Path;

use imagepack_core::builder::BuildProgress;
use imagepack_core::inject::inject;
use imagepack_core::query::{self, Filter};
use imagepack_core::{
    load_collection, save_collection, BuildOptions, Collection, Error, ErrorKind, Pipeline, Shape,
    UNCATEGORIZED,
};

const PNG_MAGIC: &[u8] = b"\x89PNG";

/// Lay out the cat/dog workspace: one metadata row for `cat.png`, none for `dog.png`.
fn cat_and_dog(root: &Path) -> BuildOptions {
    let images = root.join("images");
    fs::create_dir_all(&images).unwrap();
    fs::write(images.join("cat.png"), PNG_MAGIC).unwrap();
    fs::write(images.join("dog.png"), PNG_MAGIC).unwrap();
    fs::write(
        root.join("catalogue.csv"),
        "filename,description,category,tags,notes\ncat.png,Orange cat,animals,pet|cat,\n",
    )
    .unwrap();
    BuildOptions::new(root.join("catalogue.csv")).base_dir(root)
}

fn build(opts: &BuildOptions) -> Collection {
    let pipeline = Pipeline::prepare(opts).unwrap();
    pipeline.build(None).collection
}

// ── Pipeline::prepare ────────────────────────────────────────────

#[test]
fn test_prepare_finds_images_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());

    let pipeline = Pipeline::prepare(&opts).unwrap();
    assert_eq!(pipeline.image_dir(), tmp.path().join("images"));
    assert_eq!(pipeline.images().len(), 2);
    assert_eq!(pipeline.metadata().len(), 1);
}

#[test]
fn test_prepare_missing_metadata_file() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());
    let opts = BuildOptions {
        metadata: tmp.path().join("nope.csv"),
        ..opts
    };

    let err = Pipeline::prepare(&opts).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn test_prepare_missing_filename_column_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());
    fs::write(&opts.metadata, "name,description\ncat.png,Orange cat\n").unwrap();

    let err = Pipeline::prepare(&opts).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_prepare_explicit_image_dir_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path()).images(tmp.path().join("elsewhere"));

    let err = Pipeline::prepare(&opts).err().unwrap();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_prepare_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path()).limit(Some(1));

    let pipeline = Pipeline::prepare(&opts).unwrap();
    assert_eq!(pipeline.images().len(), 1);
    assert_eq!(pipeline.images()[0].name, "cat.png");
}

// ── Build scenario: cat with metadata, dog without ───────────────

#[test]
fn test_build_cat_and_dog() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());
    let pipeline = Pipeline::prepare(&opts).unwrap();
    let report = pipeline.build(None);

    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.summary.skipped, 0);
    assert_eq!(report.summary.with_metadata, 1);
    assert_eq!(report.summary.without_metadata, 1);

    let cat = report.collection.get("cat").unwrap();
    assert!(cat.base64.starts_with("data:image/png;base64,"));
    assert_eq!(cat.description, "Orange cat");
    assert_eq!(cat.category, "animals");
    assert_eq!(cat.tags, vec!["pet", "cat"]);

    let dog = report.collection.get("dog").unwrap();
    assert!(dog.base64.starts_with("data:image/png;base64,"));
    assert_eq!(dog.description, "");
    assert_eq!(dog.category, UNCATEGORIZED);
    assert!(dog.tags.is_empty());
}

#[test]
fn test_list_only_matches_build_counts() {
    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::prepare(&cat_and_dog(tmp.path())).unwrap();

    let aligned = pipeline.alignment();
    let with_meta = aligned.iter().filter(|(_, has)| *has).count();
    let report = pipeline.build(None);
    assert_eq!(with_meta, report.summary.with_metadata);
    assert_eq!(aligned.len() - with_meta, report.summary.without_metadata);
}

#[test]
fn test_build_reports_progress() {
    let tmp = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::prepare(&cat_and_dog(tmp.path())).unwrap();

    let mut encoded = Vec::new();
    let mut completed = None;
    pipeline.build(Some(&mut |p| match p {
        BuildProgress::Encoded { name, has_metadata, .. } => encoded.push((name, has_metadata)),
        BuildProgress::Complete { summary } => completed = Some(summary),
        _ => {}
    }));

    assert_eq!(
        encoded,
        vec![("cat.png".to_string(), true), ("dog.png".to_string(), false)]
    );
    assert_eq!(completed.unwrap().processed, 2);
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn test_build_is_idempotent_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());
    let first = tmp.path().join("first.json");
    let second = tmp.path().join("second.json");

    save_collection(&first, &build(&opts), Shape::Enriched).unwrap();
    save_collection(&second, &build(&opts), Shape::Enriched).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_saved_collection_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let collection = build(&cat_and_dog(tmp.path()));
    let path = tmp.path().join("image_base64_lookup.json");

    save_collection(&path, &collection, Shape::Enriched).unwrap();
    assert_eq!(load_collection(&path).unwrap(), collection);
}

#[test]
fn test_simple_shape_file_reloads_with_same_payloads() {
    let tmp = tempfile::tempdir().unwrap();
    let collection = build(&cat_and_dog(tmp.path()));
    let path = tmp.path().join("simple.json");

    save_collection(&path, &collection, Shape::Simple).unwrap();
    let reloaded = load_collection(&path).unwrap();
    for (key, record) in collection.iter() {
        assert_eq!(reloaded.get(key).unwrap().base64, record.base64);
    }
    assert_eq!(reloaded.get("cat").unwrap().description, "");
}

// ── Key uniqueness ───────────────────────────────────────────────

#[test]
fn test_one_record_per_stem() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = cat_and_dog(tmp.path());
    fs::write(tmp.path().join("images/cat.jpg"), b"\xff\xd8\xff").unwrap();

    let report = Pipeline::prepare(&opts).unwrap().build(None);
    assert_eq!(report.collection.len(), 2);
    assert_eq!(report.summary.duplicate_keys, 1);
    // "cat.jpg" sorts before "cat.png".
    let cat = report.collection.get("cat").unwrap();
    assert_eq!(cat.filename, "cat.jpg");
    assert!(cat.base64.starts_with("data:image/jpeg;base64,"));
}

// ── Search ───────────────────────────────────────────────────────

#[test]
fn test_category_search_is_case_insensitive_exact() {
    let tmp = tempfile::tempdir().unwrap();
    let collection = build(&cat_and_dog(tmp.path()));

    let search = |c: &str| query::sorted(query::search(&collection, &[Filter::Category(c.into())]).unwrap());
    assert_eq!(search("animals"), vec!["cat"]);
    assert_eq!(search("ANIMALS"), vec!["cat"]);
    assert!(search("anim").is_empty());
    assert_eq!(search("uncategorized"), vec!["dog"]);
}

#[test]
fn test_tag_search_superset() {
    let tmp = tempfile::tempdir().unwrap();
    let collection = build(&cat_and_dog(tmp.path()));

    let hits = query::search(&collection, &[Filter::Tags(vec!["PET".into(), "cat".into()])]).unwrap();
    assert_eq!(query::sorted(hits), vec!["cat"]);
    let hits = query::search(&collection, &[Filter::Tags(vec!["pet".into(), "dog".into()])]).unwrap();
    assert!(hits.is_empty());
}

// ── Inject ───────────────────────────────────────────────────────

#[test]
fn test_inject_from_persisted_collection() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("lookup.json");
    save_collection(&path, &build(&cat_and_dog(tmp.path())), Shape::Enriched).unwrap();

    let collection = load_collection(&path).unwrap();
    let result = inject(r#"<img src="{{cat}}"><img src="{{missing_key}}">"#, &collection);

    assert!(result
        .output
        .starts_with(r#"<img src="data:image/png;base64,iVBORw==">"#));
    assert!(result.output.contains("{{missing_key}}"));
    assert_eq!(result.resolved, 1);
    assert_eq!(result.unresolved, vec!["missing_key"]);
}
