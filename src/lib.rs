pub mod batch;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod mirror;
pub mod paths;
pub mod tinify;
pub mod utils;

pub use batch::{
    batch_compress_images, collect_image_files, compress_and_save, is_image_file, plan_batch,
    BatchReport, FileReport, PlannedFile, SaveOutcome,
};
pub use cleanup::delete_after_compress;
pub use config::{FailurePolicy, MirrorLayout, Settings, SettingsOverrides};
pub use error::{CompressionError, ErrorCategory, Result};
pub use mirror::create_dirs;
pub use paths::{artifact_file_name, artifact_path, resolve_output_dir};
pub use tinify::{Compressor, Preserve, TinifyClient, TinifyOptions};
