use crate::cleanup::delete_after_compress;
use crate::config::{FailurePolicy, Settings};
use crate::constants::{
    COMPRESS_PREFIX, DELETE_PREFIX, HIDDEN_FILE_PREFIX, PROGRESS_BAR_TEMPLATE, SAVE_PREFIX,
    SEARCH_PREFIX, SKIP_PREFIX, SUCCESS_PREFIX, SUPPORTED_IMAGE_EXTENSIONS,
};
use crate::error::{CompressionError, Result};
use crate::mirror::create_dirs;
use crate::paths::{artifact_path, resolve_output_dir};
use crate::tinify::{Compressor, Preserve, METADATA_FIELDS};
use crate::utils::print_batch_summary;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// What happened to one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Compressed {
        artifact: PathBuf,
        original_size: u64,
        compressed_size: u64,
    },
    /// The artifact already existed, so the service was not called.
    Skipped { artifact: PathBuf },
}

#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub result: Result<SaveOutcome>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub compression_count: Option<u64>,
    pub cleaned_up: bool,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn compressed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(SaveOutcome::Compressed { .. })))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(SaveOutcome::Skipped { .. })))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &CompressionError)> {
        self.files.iter().filter_map(|f| match &f.result {
            Err(e) => Some((f.source.as_path(), e)),
            Ok(_) => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Byte totals over compressed files only.
    pub fn size_totals(&self) -> (u64, u64) {
        self.files
            .iter()
            .fold((0, 0), |(before, after), f| match &f.result {
                Ok(SaveOutcome::Compressed {
                    original_size,
                    compressed_size,
                    ..
                }) => (before + original_size, after + compressed_size),
                _ => (before, after),
            })
    }
}

/// A discovered image and where its artifact would land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub exists: bool,
}

/// Runs a whole batch: validate, mirror, discover, compress, clean up.
///
/// With [`FailurePolicy::Abort`] the first failing file stops the batch and
/// its error is returned. With [`FailurePolicy::Continue`] failures are
/// recorded in the report and the input tree is never deleted.
pub fn batch_compress_images(
    settings: &Settings,
    compressor: &dyn Compressor,
) -> Result<BatchReport> {
    let start_time = Instant::now();
    let input_root = settings.input_path.as_path();
    let output_root = settings.output_path.as_path();

    crate::verbose!("Validating API credentials");
    compressor.validate()?;

    create_dirs(input_root, output_root, settings.layout)?;

    crate::info!("\n{} Looking for images...\n", SEARCH_PREFIX);
    let image_files = collect_image_files(input_root)?;
    crate::verbose!("Found {} image files", image_files.len());

    let progress = create_progress_bar(image_files.len() as u64);
    let mut report = BatchReport::default();

    for image in image_files {
        let output_dir = resolve_output_dir(&image, input_root, output_root, settings.layout);
        let name = display_name(&image);
        progress.set_message(name.clone());

        let pending = artifact_path(&image, &output_dir, settings.metadata)
            .map(|artifact| !artifact.is_file())
            .unwrap_or(false);
        if pending {
            progress.suspend(|| crate::info!("{} Compressing {}", COMPRESS_PREFIX, name));
        }

        let result = match compress_and_save(compressor, &image, &output_dir, settings.metadata) {
            Err(e) if settings.failure_policy == FailurePolicy::Abort => {
                progress.abandon();
                return Err(e);
            }
            other => other,
        };
        match &result {
            Ok(SaveOutcome::Compressed { artifact, .. }) => {
                progress.suspend(|| {
                    crate::info!("{} Saving {}\n", SAVE_PREFIX, display_name(artifact));
                });
            }
            Ok(SaveOutcome::Skipped { artifact }) => {
                crate::verbose!("{} Skipping {}, already optimized", SKIP_PREFIX, display_name(artifact));
            }
            Err(e) => {
                crate::error!("Failed to process {}: {}", image.display(), e);
            }
        }
        progress.inc(1);
        report.files.push(FileReport {
            source: image,
            result,
        });
    }
    progress.finish_and_clear();

    report.compression_count = compressor.compression_count();

    if report.failed_count() == 0 {
        crate::info!("{} All optimized images have been saved", SUCCESS_PREFIX);
        if settings.delete_raw_after_compress {
            delete_after_compress(input_root)?;
            report.cleaned_up = true;
            crate::info!(
                "\n{} All the uncompressed images have been removed\n",
                DELETE_PREFIX
            );
        }
    } else {
        crate::warn!(
            "{} of {} images failed, uncompressed images were kept",
            report.failed_count(),
            report.files.len()
        );
    }

    report.elapsed = start_time.elapsed();
    print_batch_summary(&report);

    Ok(report)
}

/// Compresses one image into `output_dir` unless its artifact already exists.
pub fn compress_and_save(
    compressor: &dyn Compressor,
    image_path: &Path,
    output_dir: &Path,
    metadata: bool,
) -> Result<SaveOutcome> {
    let artifact = artifact_path(image_path, output_dir, metadata)?;
    if artifact.is_file() {
        return Ok(SaveOutcome::Skipped { artifact });
    }

    let source = fs::read(image_path)?;
    let preserve: &[Preserve] = if metadata { METADATA_FIELDS } else { &[] };
    let compressed = compressor.compress(&source, preserve)?;

    fs::create_dir_all(output_dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output_dir.to_path_buf()))?;
    fs::write(&artifact, &compressed)?;

    Ok(SaveOutcome::Compressed {
        artifact,
        original_size: source.len() as u64,
        compressed_size: compressed.len() as u64,
    })
}

/// Lists supported images under `input_root` in walk order.
///
/// Fails with [`CompressionError::NoImageFilesFound`] when nothing matches.
pub fn collect_image_files(input_root: &Path) -> Result<Vec<PathBuf>> {
    if !input_root.is_dir() {
        return Err(CompressionError::NoImageFilesFound(input_root.to_path_buf()));
    }

    let mut image_files = Vec::new();
    for entry in WalkDir::new(input_root) {
        let entry = entry?;
        // `Path::is_file` follows symlinks, `DirEntry::file_type` does not.
        if entry.path().is_file() && is_image_file(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    if image_files.is_empty() {
        return Err(CompressionError::NoImageFilesFound(input_root.to_path_buf()));
    }

    Ok(image_files)
}

/// True for non-hidden files with a lowercase `jpg`, `jpeg` or `png` extension.
pub fn is_image_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    if file_name.starts_with(HIDDEN_FILE_PREFIX) {
        return false;
    }
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Resolves every discoverable image without touching the filesystem or the service.
pub fn plan_batch(settings: &Settings) -> Result<Vec<PlannedFile>> {
    let input_root = settings.input_path.as_path();
    let output_root = settings.output_path.as_path();

    collect_image_files(input_root)?
        .into_iter()
        .map(|source| {
            let output_dir = resolve_output_dir(&source, input_root, output_root, settings.layout);
            let artifact = artifact_path(&source, &output_dir, settings.metadata)?;
            let exists = artifact.is_file();
            Ok(PlannedFile {
                source,
                artifact,
                exists,
            })
        })
        .collect()
}

fn create_progress_bar(len: u64) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        progress.set_style(style.progress_chars("#>-"));
    }
    progress
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
