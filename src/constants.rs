/// Extensions accepted by discovery. Matching is case-sensitive.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub const HIDDEN_FILE_PREFIX: char = '.';

pub const OPTIMIZED_SUFFIX: &str = "_optimized";
pub const OPTIMIZED_COPYRIGHT_SUFFIX: &str = "_optimized_copyright";

pub const DEFAULT_INPUT_DIR: &str = "raw_images";
pub const DEFAULT_OUTPUT_DIR: &str = "compressed_images";
pub const DEFAULT_CONFIG_FILE: &str = "tiny-squeeze.toml";

pub const TINIFY_API_ENDPOINT: &str = "https://api.tinify.com";
pub const TINIFY_SHRINK_PATH: &str = "/shrink";
pub const TINIFY_AUTH_USER: &str = "api";
pub const COMPRESSION_COUNT_HEADER: &str = "Compression-Count";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const SEARCH_PREFIX: &str = "🔍";
pub const COMPRESS_PREFIX: &str = "🗜️ ";
pub const SAVE_PREFIX: &str = "💾";
pub const SKIP_PREFIX: &str = "⏭️ ";
pub const DELETE_PREFIX: &str = "🗑️ ";
pub const SIZE_PREFIX: &str = "📊";
