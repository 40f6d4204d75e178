//! Custom error types for styleprep.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the styleprep library.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// File suffix is not accepted by the requested operation.
    #[error("unsupported format for {operation}: {path}")]
    UnsupportedFormat {
        path: PathBuf,
        operation: &'static str,
    },

    /// Operation invoked before its prerequisites were met.
    #[error("cannot {operation}: {reason}")]
    InvalidState {
        operation: &'static str,
        reason: String,
    },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The segmentation backend rejected its input.
    #[error("segmentation ({mode}) failed: {reason}")]
    Segmentation { mode: String, reason: String },

    /// A collaborator returned an array of the wrong shape.
    #[error("array shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for styleprep operations.
pub type Result<T> = std::result::Result<T, Error>;
