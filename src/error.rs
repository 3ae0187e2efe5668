use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(PathBuf),

    #[error("Invalid image file name: {0}")]
    InvalidFileName(PathBuf),

    #[error("Failed to create directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    /// Credentials rejected or monthly limit reached.
    #[error("Account error: {0}")]
    Account(String),

    /// The service refused the request, usually because of the source image.
    #[error("Client error: {0}")]
    Client(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

/// Categories the user sees when a run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NoImagesFound,
    Account,
    Client,
    Server,
    Connection,
    Unknown,
}

impl CompressionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompressionError::NoImageFilesFound(_) => ErrorCategory::NoImagesFound,
            CompressionError::Account(_) => ErrorCategory::Account,
            CompressionError::Client(_) => ErrorCategory::Client,
            CompressionError::Server(_) => ErrorCategory::Server,
            CompressionError::Connection(_) => ErrorCategory::Connection,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Single diagnostic line printed when a run is aborted by this error.
    pub fn user_message(&self) -> String {
        match self {
            CompressionError::NoImageFilesFound(dir) => {
                let dir_name = dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.display().to_string());
                format!("Please add images to “{}” and try again...", dir_name)
            }
            CompressionError::Account(_) => {
                "[AccountError]: Please verify your Tinify API key and account limit.".to_string()
            }
            CompressionError::Client(_) => {
                "[ClientError]: Please check your source image.".to_string()
            }
            CompressionError::Server(_) => {
                "[ServerError]: Temporary issue with the Tinify API.".to_string()
            }
            CompressionError::Connection(_) => {
                "[ConnectionError]: A network connection error occurred.".to_string()
            }
            other => format!(
                "[UnknownError]: Something went wrong. Please try again... {}",
                other
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
