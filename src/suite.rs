//! Suite directory layout and capture session discovery
//!
//! All flat-file state lives under `<Documents>/ebook_suite`:
//! - `book_<timestamp>/` holds the raw screenshots of one capture run
//! - `pdf_book_<timestamp>/` holds the cropped frames for that run
//!
//! Finished PDFs default to `<Documents>/ebooks`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use glob::glob;

use crate::error::{Error, Result};

/// Prefix used for capture session directory names
pub const SESSION_PREFIX: &str = "book_";

/// Prefix used for processed-output directory names
pub const OUTPUT_PREFIX: &str = "pdf_";

/// Base directory for all suite files: `<Documents>/ebook_suite`
///
/// Falls back to the home directory, then the current directory, when the
/// platform documents folder cannot be determined.
pub fn base_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ebook_suite")
}

/// Default directory for finished PDFs: `<Documents>/ebooks`
pub fn default_pdf_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ebooks")
}

/// Create a fresh timestamped session directory under `base`
///
/// Returns the created path, e.g. `<base>/book_20260829_101500`.
pub fn create_session_dir(base: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let session_dir = base.join(format!("{SESSION_PREFIX}{timestamp}"));
    fs::create_dir_all(&session_dir)?;
    Ok(session_dir)
}

/// List capture session directories under `base`, sorted by name
///
/// Session names embed their creation timestamp, so name order is
/// chronological order. A missing base directory yields an empty list.
pub fn find_sessions(base: &Path) -> Result<Vec<PathBuf>> {
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        let path = entry.path();
        let is_session = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(SESSION_PREFIX))
                .unwrap_or(false);
        if is_session {
            sessions.push(path);
        }
    }

    sessions.sort();
    Ok(sessions)
}

/// Output directory for a session's cropped frames: `pdf_<session-name>`
///
/// Created beside the session directory.
pub fn output_dir_for(session_dir: &Path) -> Result<PathBuf> {
    let session_name = session_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::General(format!("Invalid session path: {}", session_dir.display())))?;

    let parent = session_dir.parent().unwrap_or_else(|| Path::new("."));
    let output_dir = parent.join(format!("{OUTPUT_PREFIX}{session_name}"));
    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

/// List the PNG screenshots inside a session folder, sorted by filename
///
/// Shot filenames embed zero-padded page numbers, so name order is page
/// order. Returns [`Error::NoScreenshots`] when the folder has no PNGs.
pub fn list_screenshots(session_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = session_dir.join("*.png");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| Error::General(format!("Invalid path: {}", session_dir.display())))?;

    let mut files = Vec::new();
    for entry in glob(pattern).map_err(|e| Error::General(e.to_string()))? {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => eprintln!("Warning: glob error in {}: {}", session_dir.display(), e),
        }
    }

    if files.is_empty() {
        return Err(Error::NoScreenshots(session_dir.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Build a PDF filename from a user-supplied book title
///
/// Keeps alphanumerics, spaces, dashes and underscores, then replaces
/// spaces with underscores. A title that sanitizes to nothing falls back
/// to `<session-name>_book.pdf`.
pub fn pdf_filename(title: Option<&str>, session_dir: &Path) -> String {
    if let Some(title) = title {
        let clean: String = title
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect();
        let clean = clean.trim();
        if !clean.is_empty() {
            return format!("{}.pdf", clean.replace(' ', "_"));
        }
    }

    let session_name = session_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("book");
    format!("{session_name}_book.pdf")
}
