use crate::error::{CompressionError, Result};
use std::fs;
use std::path::Path;

/// Removes `input_root` and everything under it, then recreates it empty.
///
/// A missing root is not an error.
pub fn delete_after_compress(input_root: &Path) -> Result<()> {
    if let Err(e) = fs::remove_dir_all(input_root) {
        crate::verbose!("Ignoring removal error for {}: {}", input_root.display(), e);
    }
    if !input_root.is_dir() {
        fs::create_dir_all(input_root)
            .map_err(|_| CompressionError::DirectoryCreationFailed(input_root.to_path_buf()))?;
    }
    Ok(())
}
