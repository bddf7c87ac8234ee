//! PDF assembly module

pub mod assemble;
pub mod metadata;

// Re-export commonly used items
pub use assemble::{assemble_pdf, AssembleOptions, DEFAULT_AUTHOR, DEFAULT_DPI};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
