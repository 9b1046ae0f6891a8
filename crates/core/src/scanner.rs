use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::ImageFile;
use crate::error::{Error, Result};

/// Extensions accepted by the metadata-enriched pipeline.
pub const ENRICHED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extensions accepted by batch conversion.
pub const ALL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "webp"];

/// Folders probed, in order, when no image directory is given.
pub const CANDIDATE_DIRS: &[&str] = &["images", "assets", "."];

/// List the image files directly inside `dir` (no recursion).
///
/// Files are ordered case-insensitively by name, ties broken by the exact
/// name. Names that collide case-insensitively keep only the first file.
/// `limit` truncates after ordering.
pub fn enumerate_images(dir: &Path, extensions: &[&str], limit: Option<usize>) -> Result<Vec<ImageFile>> {
    check_dir(dir)?;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(extension) = accepted_extension(&path, extensions) {
            let name = file_name(&path);
            let key = crate::metadata::stem_of(&name);
            files.push(ImageFile {
                path,
                name,
                extension,
                key,
            });
        }
    }

    let found = files.len();
    let mut files = order_and_dedupe(files);
    debug!(found, unique = files.len(), "enumerated {}", dir.display());

    if let Some(limit) = limit {
        files.truncate(limit);
    }
    Ok(files)
}

/// Recursively list image files under `root`. Keys are the relative path
/// without extension, `/`-separated.
///
/// Entries that cannot be visited (dangling links, unreadable folders, link
/// loops) are logged and skipped.
pub fn scan_tree(root: &Path, extensions: &[&str], limit: Option<usize>) -> Result<Vec<ImageFile>> {
    check_dir(root)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let at = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(path = %at, "skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(extension) = accepted_extension(path, extensions) else {
            continue;
        };
        let rel = path.strip_prefix(root).unwrap_or(path).with_extension("");
        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ImageFile {
            path: path.to_path_buf(),
            name: file_name(path),
            extension,
            key,
        });
    }

    files.sort_by(|a, b| {
        a.key
            .to_lowercase()
            .cmp(&b.key.to_lowercase())
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| a.name.cmp(&b.name))
    });
    if let Some(limit) = limit {
        files.truncate(limit);
    }
    Ok(files)
}

/// Pick the image directory: the explicit one if given, otherwise the first
/// candidate under `base` that holds at least one accepted file.
pub fn locate_image_dir(explicit: Option<&Path>, base: &Path, extensions: &[&str]) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        check_dir(dir)?;
        return Ok(dir.to_path_buf());
    }

    for candidate in CANDIDATE_DIRS {
        let dir = base.join(candidate);
        if !dir.is_dir() {
            debug!("not a directory: {}", dir.display());
            continue;
        }
        match enumerate_images(&dir, extensions, Some(1)) {
            Ok(found) if !found.is_empty() => return Ok(dir),
            Ok(_) => debug!("no image files in {}", dir.display()),
            Err(e) => debug!("cannot list {}: {e}", dir.display()),
        }
    }

    Err(Error::NoImageDirectory {
        searched: CANDIDATE_DIRS.iter().map(|d| d.to_string()).collect(),
    })
}

fn check_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}

fn accepted_extension(path: &Path, extensions: &[&str]) -> Option<String> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    extensions.contains(&ext.as_str()).then_some(ext)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn order_and_dedupe(mut files: Vec<ImageFile>) -> Vec<ImageFile> {
    files.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut seen: HashSet<String> = HashSet::new();
    files
        .into_iter()
        .filter(|f| {
            let fresh = seen.insert(f.name.to_lowercase());
            if !fresh {
                debug!(dropped = %f.name, "case-insensitive duplicate filename, keeping the first");
            }
            fresh
        })
        .collect()
}
