//! Error types for the ebook capture library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ebook capture library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF construction error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image decoding/encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Screen capture or key injection failure
    #[error("Capture error: {0}")]
    Capture(String),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No capture sessions available to process
    #[error("No capture sessions found in: {}", .0.display())]
    NoSessions(PathBuf),

    /// A session folder contains no screenshots
    #[error("No PNG screenshots found in: {}", .0.display())]
    NoScreenshots(PathBuf),

    /// Crop rectangle rejected by validation
    #[error("Invalid crop rectangle: {0}")]
    InvalidCrop(String),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}
