pub mod builder;
pub mod domain;
pub mod encoder;
pub mod error;
pub mod index;
pub mod inject;
pub mod metadata;
pub mod query;
pub mod scanner;
pub mod stats;
pub mod store;

use std::path::{Path, PathBuf};

use builder::{BuildProgress, BuildReport};
use domain::ImageFile;
use error::Result;
use metadata::MetadataLoad;

pub use domain::{BuildSummary, Collection, LookupRecord, MetadataRecord, UNCATEGORIZED};
pub use error::{Error, ErrorKind};
pub use store::{load_collection, save_collection, Shape};

/// Inputs of an enriched build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Metadata CSV.
    pub metadata: PathBuf,
    /// Image folder. When unset, [`scanner::CANDIDATE_DIRS`] are probed under `base_dir`.
    pub images: Option<PathBuf>,
    pub base_dir: PathBuf,
    /// Only take the first N images.
    pub limit: Option<usize>,
}

impl BuildOptions {
    pub fn new(metadata: impl Into<PathBuf>) -> Self {
        Self {
            metadata: metadata.into(),
            images: None,
            base_dir: PathBuf::from("."),
            limit: None,
        }
    }

    pub fn images(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images = Some(dir.into());
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// The metadata-enriched lookup pipeline with its inputs resolved.
///
/// [`Pipeline::prepare`] runs the stages that abort the run on failure
/// (loading metadata, locating and listing images). Building never fails as a
/// whole: per-file errors are reported in the [`BuildReport`].
pub struct Pipeline {
    metadata: MetadataLoad,
    image_dir: PathBuf,
    images: Vec<ImageFile>,
}

impl Pipeline {
    pub fn prepare(opts: &BuildOptions) -> Result<Self> {
        let metadata = metadata::load_metadata(&opts.metadata)?;

        let image_dir = scanner::locate_image_dir(
            opts.images.as_deref(),
            &opts.base_dir,
            scanner::ENRICHED_EXTENSIONS,
        )?;
        let images =
            scanner::enumerate_images(&image_dir, scanner::ENRICHED_EXTENSIONS, opts.limit)?;
        tracing::info!(count = images.len(), "found images in {}", image_dir.display());

        Ok(Self {
            metadata,
            image_dir,
            images,
        })
    }

    pub fn metadata(&self) -> &MetadataLoad {
        &self.metadata
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn images(&self) -> &[ImageFile] {
        &self.images
    }

    /// Each image paired with whether it has metadata. Reads no file contents.
    pub fn alignment(&self) -> Vec<(&ImageFile, bool)> {
        builder::align(&self.metadata, &self.images)
    }

    /// Encode all images and merge their metadata.
    pub fn build(&self, progress_cb: Option<&mut dyn FnMut(BuildProgress)>) -> BuildReport {
        builder::build_collection(&self.metadata, &self.images, progress_cb)
    }
}
