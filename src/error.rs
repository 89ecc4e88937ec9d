//! Error type shared by every toolbox operation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the dataset preparation operations
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// A required file or directory does not exist
    #[error("{0} does not exist on filesystem")]
    PathNotFound(PathBuf),

    /// A path expected to be a directory is something else
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// A parameter failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The toolbox was built without an annotation catalog
    #[error("Annotations file not loaded: {0}")]
    AnnotationsNotLoaded(PathBuf),

    /// The image does not carry red, green and blue channels
    #[error("Image {path} has {channels} channel(s), at least 3 are required")]
    UnsupportedColorType { path: PathBuf, channels: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to parse annotations: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, ToolboxError>;
