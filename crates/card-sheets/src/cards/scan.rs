use crate::constants::IMAGE_EXTENSIONS;
use crate::types::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Whether a path has one of the accepted image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Image files under `root`, sorted by path.
///
/// Hidden files and folders are skipped, as is anything without an image extension.
/// A missing `root` yields no files.
pub fn find_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(root).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut images = Vec::new();
    for entry in walker.into_iter().filter_entry(|entry| !is_hidden(entry)) {
        let entry = entry.map_err(|e| SheetError::Io(e.into()))?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    Ok(images)
}
