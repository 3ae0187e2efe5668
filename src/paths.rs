use crate::config::MirrorLayout;
use crate::constants::{OPTIMIZED_COPYRIGHT_SUFFIX, OPTIMIZED_SUFFIX};
use crate::error::{CompressionError, Result};
use std::path::{Path, PathBuf};

/// Returns the directory an image's artifact is written to.
///
/// Images directly inside `input_root` go to `output_root`. Anything deeper
/// goes to the mirrored directory for its parent, which under
/// [`MirrorLayout::Flatten`] is keyed by the parent's name only.
pub fn resolve_output_dir(
    image_path: &Path,
    input_root: &Path,
    output_root: &Path,
    layout: MirrorLayout,
) -> PathBuf {
    let parent = match image_path.parent() {
        Some(parent) if parent != input_root => parent,
        _ => return output_root.to_path_buf(),
    };

    match layout {
        MirrorLayout::Flatten => match parent.file_name() {
            Some(name) => output_root.join(name),
            None => output_root.to_path_buf(),
        },
        MirrorLayout::Relative => match parent.strip_prefix(input_root) {
            Ok(relative) => output_root.join(relative),
            Err(_) => match parent.file_name() {
                Some(name) => output_root.join(name),
                None => output_root.to_path_buf(),
            },
        },
    }
}

/// Builds `<stem>_optimized.<ext>` or `<stem>_optimized_copyright.<ext>`.
///
/// The extension is whatever follows the last `.`, so `photo.v2.jpg` keeps
/// `photo.v2` as its stem.
pub fn artifact_file_name(image_path: &Path, metadata: bool) -> Result<String> {
    let invalid = || CompressionError::InvalidFileName(image_path.to_path_buf());

    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;
    let extension = image_path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;

    let suffix = if metadata {
        OPTIMIZED_COPYRIGHT_SUFFIX
    } else {
        OPTIMIZED_SUFFIX
    };

    Ok(format!("{}{}.{}", stem, suffix, extension))
}

pub fn artifact_path(image_path: &Path, output_dir: &Path, metadata: bool) -> Result<PathBuf> {
    Ok(output_dir.join(artifact_file_name(image_path, metadata)?))
}
