use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{BuildSummary, Collection, ImageFile, LookupRecord};
use crate::encoder;
use crate::metadata::MetadataLoad;

/// Progress callback events for building a collection.
pub enum BuildProgress {
    /// Encoding is about to start.
    Start { total: usize },
    /// An image was encoded and added.
    Encoded {
        name: String,
        /// Approximate size of the original file.
        bytes: usize,
        has_metadata: bool,
    },
    /// An image could not be read; it is left out of the collection.
    Failed { name: String, error: String },
    /// All images handled.
    Complete { summary: BuildSummary },
}

/// Output of a build: the collection plus its acceptance summary.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub collection: Collection,
    pub summary: BuildSummary,
    /// Files that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

/// Encode every image and merge it with its metadata.
///
/// Reads run on the rayon pool and stream back as they finish. Results are
/// merged, and progress reported, in the order of `images`, so the outcome
/// matches a sequential run. A file that fails to read is recorded and
/// skipped. When two images map to the same key the first one wins.
pub fn build_collection(
    metadata: &MetadataLoad,
    images: &[ImageFile],
    mut progress_cb: Option<&mut dyn FnMut(BuildProgress)>,
) -> BuildReport {
    if let Some(ref mut cb) = progress_cb {
        cb(BuildProgress::Start {
            total: images.len(),
        });
    }

    let mut report = BuildReport::default();
    let (tx, rx) = mpsc::channel::<(usize, io::Result<String>)>();

    thread::scope(|s| {
        s.spawn(move || {
            images
                .par_iter()
                .enumerate()
                .for_each_with(tx, |tx, (i, img)| {
                    // The receiver lives until every sender is dropped.
                    let _ = tx.send((i, encoder::encode_file(&img.path)));
                });
        });

        // Hold out-of-order results until their predecessors arrive.
        let mut pending: Vec<Option<io::Result<String>>> = images.iter().map(|_| None).collect();
        let mut next = 0;
        for (i, result) in rx {
            pending[i] = Some(result);
            while let Some(result) = pending.get_mut(next).and_then(Option::take) {
                merge_one(&mut report, metadata, &images[next], result, &mut progress_cb);
                next += 1;
            }
        }
    });

    if let Some(ref mut cb) = progress_cb {
        cb(BuildProgress::Complete {
            summary: report.summary,
        });
    }

    report
}

fn merge_one(
    report: &mut BuildReport,
    metadata: &MetadataLoad,
    img: &ImageFile,
    result: io::Result<String>,
    progress_cb: &mut Option<&mut dyn FnMut(BuildProgress)>,
) {
    let data_uri = match result {
        Ok(uri) => uri,
        Err(e) => {
            warn!(file = %img.name, "failed to read image: {e}");
            report.summary.skipped += 1;
            report.failures.push((img.path.clone(), e.to_string()));
            if let Some(cb) = progress_cb.as_mut() {
                cb(BuildProgress::Failed {
                    name: img.name.clone(),
                    error: e.to_string(),
                });
            }
            return;
        }
    };

    let meta = metadata.get(&img.key);
    let bytes = encoder::estimated_payload_bytes(&data_uri);
    let record = LookupRecord::merge(data_uri, &img.name, meta);

    if !report.collection.insert_new(img.key.clone(), record) {
        warn!(key = %img.key, dropped = %img.name, "another image already uses this key, skipping");
        report.summary.duplicate_keys += 1;
        return;
    }

    report.summary.processed += 1;
    if meta.is_some() {
        report.summary.with_metadata += 1;
    } else {
        report.summary.without_metadata += 1;
    }
    debug!(file = %img.name, bytes, has_metadata = meta.is_some(), "encoded");

    if let Some(cb) = progress_cb.as_mut() {
        cb(BuildProgress::Encoded {
            name: img.name.clone(),
            bytes,
            has_metadata: meta.is_some(),
        });
    }
}

/// Pair each image with whether metadata exists for its key, without
/// reading any file contents.
pub fn align<'a>(metadata: &MetadataLoad, images: &'a [ImageFile]) -> Vec<(&'a ImageFile, bool)> {
    images
        .iter()
        .map(|img| (img, metadata.get(&img.key).is_some()))
        .collect()
}
