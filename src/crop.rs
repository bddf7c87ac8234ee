//! Fixed-rectangle cropping of captured screenshots
//!
//! Every screenshot of a session gets the same crop: the rectangle that
//! bounds the reader's content frame, cutting away browser chrome and
//! navigation panels. The rectangle is a constant, not a detection; the
//! user can preview it and type in a replacement.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Outline thickness of the preview rectangle, in pixels
const PREVIEW_OUTLINE: u32 = 3;

/// Preview outline color (green)
const PREVIEW_COLOR: Rgba<u8> = Rgba([0, 128, 0, 255]);

/// Crop rectangle in pixel coordinates
///
/// `left`/`top` are inclusive, `right`/`bottom` exclusive, matching the
/// usual image-crop convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Default for CropRect {
    /// The content-frame rectangle of the reader layout this tool was
    /// built against
    fn default() -> Self {
        Self {
            left: 215,
            top: 48,
            right: 2785,
            bottom: 1660,
        }
    }
}

impl CropRect {
    /// Build a rectangle, rejecting degenerate coordinates
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Result<Self> {
        if left >= right {
            return Err(Error::InvalidCrop(format!(
                "left ({left}) must be less than right ({right})"
            )));
        }
        if top >= bottom {
            return Err(Error::InvalidCrop(format!(
                "top ({top}) must be less than bottom ({bottom})"
            )));
        }
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Rectangle width in pixels
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Rectangle height in pixels
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Clamp the rectangle to an image of the given dimensions
    ///
    /// Right/bottom edges that overshoot are pulled in; a rectangle whose
    /// top-left corner lies outside the image is an error.
    pub fn clamped_to(&self, image_width: u32, image_height: u32) -> Result<Self> {
        if self.left >= image_width || self.top >= image_height {
            return Err(Error::InvalidCrop(format!(
                "rectangle starts at ({}, {}) but image is only {}x{}",
                self.left, self.top, image_width, image_height
            )));
        }
        Self::new(
            self.left,
            self.top,
            self.right.min(image_width),
            self.bottom.min(image_height),
        )
    }
}

/// Crop an image to the rectangle (clamped to the image bounds)
pub fn crop_image(img: &DynamicImage, rect: &CropRect) -> Result<DynamicImage> {
    let rect = rect.clamped_to(img.width(), img.height())?;
    Ok(img.crop_imm(rect.left, rect.top, rect.width(), rect.height()))
}

/// Crop one screenshot file, writing `<stem>_frame.png` into `output_dir`
pub fn crop_file(input: &Path, rect: &CropRect, output_dir: &Path) -> Result<PathBuf> {
    let img = image::open(input)?;
    let cropped = crop_image(&img, rect)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::General(format!("Invalid filename: {}", input.display())))?;
    let output_path = output_dir.join(format!("{stem}_frame.png"));
    cropped.save(&output_path)?;

    Ok(output_path)
}

/// Crop every screenshot in `files`, skipping failures
///
/// Returns the paths of the successfully cropped files, in input order.
pub fn crop_all(files: &[PathBuf], rect: &CropRect, output_dir: &Path) -> Vec<PathBuf> {
    let mut cropped = Vec::new();

    for (i, input) in files.iter().enumerate() {
        let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        eprint!("Processing {}/{}: {} - ", i + 1, files.len(), name);

        match crop_file(input, rect, output_dir) {
            Ok(path) => {
                let out_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                eprintln!("created {out_name}");
                cropped.push(path);
            }
            Err(e) => eprintln!("failed: {e}"),
        }
    }

    cropped
}

/// Write a preview of the crop rectangle drawn over a screenshot
///
/// The preview (`crop_preview.png` in `output_dir`) shows a green outline
/// around the area that will be kept.
pub fn write_preview(input: &Path, rect: &CropRect, output_dir: &Path) -> Result<PathBuf> {
    let img = image::open(input)?;
    let mut preview = img.to_rgba8();
    let rect = rect.clamped_to(preview.width(), preview.height())?;

    draw_outline(&mut preview, &rect);

    let preview_path = output_dir.join("crop_preview.png");
    preview.save(&preview_path)?;
    Ok(preview_path)
}

/// Draw a rectangle outline by painting border pixels
fn draw_outline(img: &mut RgbaImage, rect: &CropRect) {
    for t in 0..PREVIEW_OUTLINE {
        // Horizontal edges
        for x in rect.left..rect.right {
            let top_y = rect.top + t;
            let bottom_y = rect.bottom.saturating_sub(1 + t);
            if top_y < img.height() {
                img.put_pixel(x, top_y, PREVIEW_COLOR);
            }
            if bottom_y < img.height() {
                img.put_pixel(x, bottom_y, PREVIEW_COLOR);
            }
        }
        // Vertical edges
        for y in rect.top..rect.bottom {
            let left_x = rect.left + t;
            let right_x = rect.right.saturating_sub(1 + t);
            if left_x < img.width() {
                img.put_pixel(left_x, y, PREVIEW_COLOR);
            }
            if right_x < img.width() {
                img.put_pixel(right_x, y, PREVIEW_COLOR);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn solid_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 200, 200, 255]),
        ))
    }

    #[test]
    fn test_default_rect_matches_reader_frame() {
        let rect = CropRect::default();
        assert_eq!((rect.left, rect.top, rect.right, rect.bottom), (215, 48, 2785, 1660));
        assert_eq!(rect.width(), 2570);
        assert_eq!(rect.height(), 1612);
    }

    #[test]
    fn test_new_rejects_degenerate_rects() {
        assert!(CropRect::new(100, 0, 100, 50).is_err());
        assert!(CropRect::new(200, 0, 100, 50).is_err());
        assert!(CropRect::new(0, 50, 100, 50).is_err());
        assert!(CropRect::new(0, 0, 100, 50).is_ok());
    }

    #[test]
    fn test_clamp_pulls_in_overshooting_edges() {
        let rect = CropRect::new(10, 10, 5000, 5000).unwrap();
        let clamped = rect.clamped_to(640, 480).unwrap();
        assert_eq!(clamped.right, 640);
        assert_eq!(clamped.bottom, 480);
    }

    #[test]
    fn test_clamp_rejects_rect_outside_image() {
        let rect = CropRect::new(700, 10, 800, 100).unwrap();
        assert!(matches!(
            rect.clamped_to(640, 480),
            Err(Error::InvalidCrop(_))
        ));
    }

    #[test]
    fn test_crop_image_dimensions() {
        let img = solid_image(800, 600);
        let rect = CropRect::new(100, 50, 700, 550).unwrap();
        let cropped = crop_image(&img, &rect).unwrap();
        assert_eq!(cropped.width(), 600);
        assert_eq!(cropped.height(), 500);
    }

    #[test]
    fn test_crop_file_names_output_frame() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("pages_001-002.png");
        solid_image(400, 300).save(&input).unwrap();

        let rect = CropRect::new(10, 10, 200, 200).unwrap();
        let output = crop_file(&input, &rect, temp.path()).unwrap();
        assert_eq!(
            output.file_name().unwrap().to_str().unwrap(),
            "pages_001-002_frame.png"
        );

        let cropped = image::open(&output).unwrap();
        assert_eq!(cropped.width(), 190);
        assert_eq!(cropped.height(), 190);
    }

    #[test]
    fn test_crop_all_skips_unreadable_files() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("pages_001-002.png");
        solid_image(400, 300).save(&good).unwrap();
        let bad = temp.path().join("pages_003-004.png");
        std::fs::write(&bad, b"not a png").unwrap();

        let out_dir = temp.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let rect = CropRect::new(0, 0, 100, 100).unwrap();

        let cropped = crop_all(&[good, bad], &rect, &out_dir);
        assert_eq!(cropped.len(), 1);
        assert!(out_dir.join("pages_001-002_frame.png").exists());
    }

    #[test]
    fn test_preview_draws_green_outline() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("shot.png");
        solid_image(200, 150).save(&input).unwrap();

        let rect = CropRect::new(20, 20, 180, 130).unwrap();
        let preview_path = write_preview(&input, &rect, temp.path()).unwrap();
        assert_eq!(
            preview_path.file_name().unwrap().to_str().unwrap(),
            "crop_preview.png"
        );

        let preview = image::open(&preview_path).unwrap().to_rgba8();
        // Corner of the outline is green, center of the image untouched
        assert_eq!(*preview.get_pixel(20, 20), PREVIEW_COLOR);
        assert_eq!(*preview.get_pixel(100, 75), Rgba([200, 200, 200, 255]));
    }
}
