use crate::config::MirrorLayout;
use crate::error::{CompressionError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Prepares the input and output trees before discovery.
///
/// Creates `input_root` if it is missing, then makes sure `output_root` and a
/// mirrored directory for every subdirectory of `input_root` exist. Returns
/// the mirrored directories in walk order, without duplicates. Stale mirrored
/// directories are left alone.
pub fn create_dirs(
    input_root: &Path,
    output_root: &Path,
    layout: MirrorLayout,
) -> Result<Vec<PathBuf>> {
    ensure_dir(input_root)?;

    let mut mirrored: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input_root).min_depth(1) {
        let entry = entry?;
        // Symlinked directories are mirrored but not descended into.
        if !entry.path().is_dir() {
            continue;
        }

        let target = match layout {
            MirrorLayout::Flatten => output_root.join(entry.file_name()),
            MirrorLayout::Relative => match entry.path().strip_prefix(input_root) {
                Ok(relative) => output_root.join(relative),
                Err(_) => output_root.join(entry.file_name()),
            },
        };

        if !mirrored.contains(&target) {
            mirrored.push(target);
        }
    }

    ensure_dir(output_root)?;
    for dir in &mirrored {
        ensure_dir(dir)?;
    }

    crate::verbose!(
        "Mirrored {} directories into {}",
        mirrored.len(),
        output_root.display()
    );

    Ok(mirrored)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))
}
