//! Multi-page PDF assembly from cropped page images using lopdf
//!
//! Each image becomes one PDF page: the pixels are re-encoded as JPEG and
//! embedded as a DCTDecode image XObject, with the page MediaBox sized so
//! the image renders at the configured DPI.

use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// Author written into the PDF Info dictionary
pub const DEFAULT_AUTHOR: &str = "Book Scanner";

/// Subject written into the PDF Info dictionary
const SUBJECT: &str = "Scanned Book Content";

/// Default rendering resolution for page sizing
pub const DEFAULT_DPI: f32 = 100.0;

/// JPEG quality for embedded page images
const JPEG_QUALITY: u8 = 90;

/// Options for assembling images into a PDF
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Page images in reading order
    pub image_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
    /// Document title (defaults to "Book")
    pub title: Option<String>,
    /// Resolution used to convert pixel sizes to page sizes
    pub dpi: f32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            image_paths: Vec::new(),
            output_path: PathBuf::new(),
            title: None,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Assemble page images into a single multi-page PDF
///
/// Unreadable images are skipped with a warning; assembling zero readable
/// images is an error. Page order follows `image_paths` order.
///
/// # Example
///
/// ```no_run
/// use ebook_capture::pdf::{AssembleOptions, assemble_pdf};
/// use std::path::PathBuf;
///
/// let options = AssembleOptions {
///     image_paths: vec![PathBuf::from("page1.png"), PathBuf::from("page2.png")],
///     output_path: PathBuf::from("book.pdf"),
///     ..AssembleOptions::default()
/// };
///
/// assemble_pdf(&options).expect("Failed to assemble");
/// ```
pub fn assemble_pdf(options: &AssembleOptions) -> Result<()> {
    if options.image_paths.is_empty() {
        return Err(Error::General("No input images provided".to_string()));
    }
    if options.dpi <= 0.0 {
        return Err(Error::General(format!("Invalid DPI: {}", options.dpi)));
    }

    let mut doc = Document::with_version("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for (i, path) in options.image_paths.iter().enumerate() {
        eprintln!(
            "Adding page {}/{}: {}",
            i + 1,
            options.image_paths.len(),
            path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
        );

        match add_image_page(&mut doc, path, options.dpi) {
            Ok(page_id) => page_ids.push(page_id),
            Err(e) => eprintln!("Warning: skipping {}: {}", path.display(), e),
        }
    }

    if page_ids.is_empty() {
        return Err(Error::General(
            "No valid images to assemble into a PDF".to_string(),
        ));
    }

    // Build the page tree the same way a merge does: pages first, then the
    // Pages node and Catalog with fresh object IDs
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    let catalog_id = doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    doc.objects.insert(catalog_id, Object::Dictionary(catalog));

    doc.trailer.set("Root", Object::Reference(catalog_id));

    // Document metadata
    let mut info = Dictionary::new();
    info.set(
        "Title",
        Object::string_literal(options.title.as_deref().unwrap_or("Book")),
    );
    info.set("Author", Object::string_literal(DEFAULT_AUTHOR));
    info.set("Subject", Object::string_literal(SUBJECT));
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    // Set parent references on all pages
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    doc.compress();
    doc.save(&options.output_path)?;

    Ok(())
}

/// Add one image as a full-bleed PDF page, returning the page object ID
fn add_image_page(doc: &mut Document, path: &std::path::Path, dpi: f32) -> Result<ObjectId> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    // PDF image XObjects want RGB; convert whatever the crop stage wrote
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg_data = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY);
    encoder.encode_image(&rgb)?;

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(width as i64));
    image_dict.set("Height", Object::Integer(height as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

    let image_id = doc.add_object(Stream::new(image_dict, jpeg_data));
    let image_name = format!("Im{}", image_id.0);

    // Page size in points at the configured DPI
    let page_width = width as f32 * 72.0 / dpi;
    let page_height = height as f32 * 72.0 / dpi;

    // Scale the unit image square up to the full page
    let content = format!(
        "q\n{page_width} 0 0 {page_height} 0 0 cm\n/{image_name} Do\nQ\n"
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set(image_name, Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            0.into(),
            0.into(),
            page_width.into(),
            page_height.into(),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(doc.add_object(Object::Dictionary(page_dict)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::metadata::{count_pages, extract_metadata};
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_test_image(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(120, 80, Rgba([180, 180, 180, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_assemble_empty_input_list() {
        let temp = TempDir::new().unwrap();
        let options = AssembleOptions {
            output_path: temp.path().join("empty.pdf"),
            ..AssembleOptions::default()
        };
        let result = assemble_pdf(&options);
        assert!(result.is_err(), "Should fail with empty input list");
    }

    #[test]
    fn test_assemble_page_count_matches_inputs() {
        let temp = TempDir::new().unwrap();
        let images = vec![
            write_test_image(temp.path(), "pages_001-002_frame.png"),
            write_test_image(temp.path(), "pages_003-004_frame.png"),
            write_test_image(temp.path(), "pages_005-006_frame.png"),
        ];
        let output = temp.path().join("book.pdf");

        let options = AssembleOptions {
            image_paths: images,
            output_path: output.clone(),
            title: Some("Test Book".to_string()),
            dpi: DEFAULT_DPI,
        };
        assemble_pdf(&options).expect("Failed to assemble PDF");

        assert!(output.exists());
        assert_eq!(count_pages(&output).unwrap(), 3);
    }

    #[test]
    fn test_assemble_writes_metadata() {
        let temp = TempDir::new().unwrap();
        let images = vec![write_test_image(temp.path(), "page.png")];
        let output = temp.path().join("titled.pdf");

        let options = AssembleOptions {
            image_paths: images,
            output_path: output.clone(),
            title: Some("My Book".to_string()),
            dpi: DEFAULT_DPI,
        };
        assemble_pdf(&options).unwrap();

        let metadata = extract_metadata(&output).unwrap();
        assert_eq!(metadata.page_count, 1);
        assert_eq!(metadata.title.as_deref(), Some("My Book"));
        assert_eq!(metadata.author.as_deref(), Some(DEFAULT_AUTHOR));
    }

    #[test]
    fn test_assemble_skips_unreadable_images() {
        let temp = TempDir::new().unwrap();
        let good = write_test_image(temp.path(), "good.png");
        let bad = temp.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();
        let output = temp.path().join("partial.pdf");

        let options = AssembleOptions {
            image_paths: vec![good, bad],
            output_path: output.clone(),
            ..AssembleOptions::default()
        };
        assemble_pdf(&options).unwrap();

        assert_eq!(count_pages(&output).unwrap(), 1);
    }

    #[test]
    fn test_assemble_all_unreadable_is_error() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let options = AssembleOptions {
            image_paths: vec![bad],
            output_path: temp.path().join("none.pdf"),
            ..AssembleOptions::default()
        };
        assert!(assemble_pdf(&options).is_err());
    }
}
