//! eBook Capture Library
//!
//! A cross-platform library for digitizing an on-screen e-book reader.
//! This library provides functionality to:
//! - Plan and run a timed screenshot loop (two book pages per shot)
//! - Discover capture sessions in the suite directory
//! - Crop every screenshot to a fixed content rectangle
//! - Assemble the cropped images into a single multi-page PDF
//!
//! # Example
//!
//! ```no_run
//! use ebook_capture::pdf::{AssembleOptions, assemble_pdf};
//! use std::path::PathBuf;
//!
//! let options = AssembleOptions {
//!     image_paths: vec![
//!         PathBuf::from("pages_001-002_frame.png"),
//!         PathBuf::from("pages_003-004_frame.png"),
//!     ],
//!     output_path: PathBuf::from("book.pdf"),
//!     ..AssembleOptions::default()
//! };
//!
//! assemble_pdf(&options).expect("Failed to assemble PDF");
//! ```

pub mod capture;
pub mod crop;
pub mod error;
pub mod pdf;
pub mod suite;

// Re-export commonly used items
pub use error::{Error, Result};
