//! Run settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! whatever the command line overrides. Once [`Settings::finalize`] has run
//! the value is read-only for the rest of the run.

use crate::constants::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::error::{CompressionError, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How input subdirectories are mirrored under the output root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MirrorLayout {
    /// Every subdirectory, at any depth, maps to `output/<dir name>`.
    #[default]
    Flatten,
    /// Subdirectories keep their full path relative to the input root.
    Relative,
}

/// What happens to the rest of the batch after one file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_key: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Keep copyright and creation date in the compressed output.
    pub metadata: bool,
    pub delete_raw_after_compress: bool,
    pub layout: MirrorLayout,
    pub failure_policy: FailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            input_path: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            metadata: false,
            delete_raw_after_compress: false,
            layout: MirrorLayout::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Values supplied on the command line. `None`/`false` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_key: Option<String>,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub metadata: bool,
    pub delete_raw_after_compress: bool,
    pub layout: Option<MirrorLayout>,
    pub keep_going: bool,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads `path` if it exists, otherwise starts from defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            crate::verbose!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        crate::verbose!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn apply(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(key) = overrides.api_key {
            self.api_key = key;
        }
        if let Some(input) = overrides.input_path {
            self.input_path = input;
        }
        if let Some(output) = overrides.output_path {
            self.output_path = output;
        }
        self.metadata |= overrides.metadata;
        self.delete_raw_after_compress |= overrides.delete_raw_after_compress;
        if let Some(layout) = overrides.layout {
            self.layout = layout;
        }
        if overrides.keep_going {
            self.failure_policy = FailurePolicy::Continue;
        }
        self
    }

    /// Makes both roots absolute against `base` and checks they can coexist.
    pub fn finalize(mut self, base: &Path) -> Result<Self> {
        self.input_path = absolutize(&self.input_path, base);
        self.output_path = absolutize(&self.output_path, base);
        self.validate_paths()?;
        Ok(self)
    }

    pub fn validate_paths(&self) -> Result<()> {
        if self.input_path == self.output_path {
            return Err(CompressionError::Config(
                "input_path and output_path must be different directories".to_string(),
            ));
        }
        if self.output_path.starts_with(&self.input_path) {
            return Err(CompressionError::Config(format!(
                "output_path {} must not be inside input_path {}",
                self.output_path.display(),
                self.input_path.display()
            )));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(CompressionError::Config(
                "no Tinify API key configured (set api_key, --api-key or TINIFY_API_KEY)"
                    .to_string(),
            ));
        }
        Ok(key)
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
