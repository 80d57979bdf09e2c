use std::fs;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::info;

use crate::error::{Result, VoxclipError};

/// Resolve the metadata source to a directory of speaker subdirectories.
///
/// Accepts either a directory (used as-is, or its `meta/` child if present)
/// or a `.tar.gz` archive, which is extracted into `tmp_dir` once; a
/// non-empty `tmp_dir/meta` from a previous run is reused.
pub fn resolve_meta_dir(meta_src: &Path, tmp_dir: &Path) -> Result<PathBuf> {
    if meta_src.is_file() {
        let name = meta_src.file_name().unwrap_or_default().to_string_lossy();
        if !name.to_lowercase().ends_with(".tar.gz") {
            return Err(VoxclipError::MetaSource(format!(
                "Metadata file must be a .tar.gz archive: {}",
                meta_src.display()
            )));
        }

        let extracted = tmp_dir.join("meta");
        if dir_is_nonempty(&extracted) {
            info!("Reusing extracted metadata at {}", extracted.display());
            return Ok(extracted);
        }

        info!("Extracting {} -> {}", meta_src.display(), tmp_dir.display());
        fs::create_dir_all(tmp_dir)?;
        extract_tarball(meta_src, tmp_dir)?;

        return find_meta_dir(tmp_dir).ok_or_else(|| {
            VoxclipError::MetaSource(format!(
                "No meta/ directory found after extracting {}",
                meta_src.display()
            ))
        });
    }

    if meta_src.join("meta").is_dir() {
        return Ok(meta_src.join("meta"));
    }
    if meta_src.is_dir() {
        return Ok(meta_src.to_path_buf());
    }

    Err(VoxclipError::MetaSource(format!(
        "Invalid metadata source: {}",
        meta_src.display()
    )))
}

fn dir_is_nonempty(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn extract_tarball(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    archive
        .unpack(dest)
        .map_err(|e| VoxclipError::MetaSource(format!("Archive extraction failed: {e}")))?;

    Ok(())
}

/// Depth-first search for a directory literally named `meta`.
fn find_meta_dir(root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "meta") {
                return Some(path);
            }
            subdirs.push(path);
        }
    }
    subdirs.iter().find_map(|d| find_meta_dir(d))
}
