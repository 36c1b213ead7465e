//! Error Handling Module
//!
//! Defines the crate-wide error type for training and export operations.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for imagefold operations
#[derive(Error, Debug)]
pub enum ImagefoldError {
    /// Error loading or decoding an image
    #[error("Failed to load image at '{0}': {1}")]
    ImageLoad(PathBuf, String),

    /// Error with dataset discovery or splitting
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error with model construction or weight loading
    #[error("Model error: {0}")]
    Model(String),

    /// Error during training
    #[error("Training error: {0}")]
    Training(String),

    /// Error writing or reading the exported artifact
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Convenience Result type for imagefold operations
pub type Result<T> = std::result::Result<T, ImagefoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImagefoldError::Dataset("no class subdirectories".to_string());
        assert_eq!(
            format!("{}", err),
            "Dataset error: no class subdirectories"
        );
    }

    #[test]
    fn test_image_load_error_mentions_path() {
        let path = PathBuf::from("/data/cats/img.jpg");
        let err = ImagefoldError::ImageLoad(path, "decode failed".to_string());
        assert!(format!("{}", err).contains("img.jpg"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ImagefoldError = io.into();
        assert!(matches!(err, ImagefoldError::Io(_)));
    }
}
