//! PDF metadata readback
//!
//! Used by the `info` command and by tests to verify assembled books.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};

/// Metadata of an assembled PDF
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Follow a reference in `doc` down to a dictionary
fn deref_dict<'a>(doc: &'a Document, obj: &Object, what: &str) -> Result<&'a Dictionary> {
    let id = match obj {
        Object::Reference(id) => *id,
        _ => return Err(Error::General(format!("{what} is not a reference"))),
    };
    match doc.get_object(id)? {
        Object::Dictionary(dict) => Ok(dict),
        _ => Err(Error::General(format!("{what} is not a dictionary"))),
    }
}

/// Count pages by reading the Count field from the Pages dictionary
///
/// More reliable than walking the page tree, which may be nested.
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let root = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;
    let catalog = deref_dict(doc, root, "Root")?;

    let pages_ref = catalog
        .get(b"Pages")
        .map_err(|_| Error::General("No Pages in catalog".to_string()))?;
    let pages = deref_dict(doc, pages_ref, "Pages")?;

    match pages
        .get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?
    {
        Object::Integer(n) => Ok(*n as usize),
        _ => Err(Error::General("Count is not an integer".to_string())),
    }
}

/// Read a UTF-8 string entry out of the Info dictionary
fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;
    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| deref_dict(&doc, obj, "Info").ok());

    Ok(PdfMetadata {
        page_count,
        title: info.and_then(|d| info_string(d, b"Title")),
        author: info.and_then(|d| info_string(d, b"Author")),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;
    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}
