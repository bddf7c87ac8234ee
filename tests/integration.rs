//! Integration tests for the ebook capture library
//!
//! Exercises the full pipeline on generated screenshots: capture loop
//! (with mock screen/turner), session discovery, cropping, and PDF
//! assembly, verified by reading the PDF back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use ebook_capture::capture::{
    run_capture, CaptureOptions, CapturePlan, PageTurner, ScreenSource,
};
use ebook_capture::crop::{crop_all, write_preview, CropRect};
use ebook_capture::error::Result;
use ebook_capture::pdf::{assemble_pdf, count_pages, extract_metadata, AssembleOptions};
use ebook_capture::suite;

/// Screen source producing a synthetic "reader window" frame
struct FakeReader;

impl ScreenSource for FakeReader {
    fn grab(&mut self) -> Result<RgbaImage> {
        // Light border with a darker content region, large enough that the
        // test crop rectangle fits inside
        let mut img = RgbaImage::from_pixel(640, 480, Rgba([230, 230, 230, 255]));
        for y in 40..440 {
            for x in 60..580 {
                img.put_pixel(x, y, Rgba([120, 120, 120, 255]));
            }
        }
        Ok(img)
    }
}

struct CountingTurner {
    turns: u32,
}

impl PageTurner for CountingTurner {
    fn next_page(&mut self) -> Result<()> {
        self.turns += 1;
        Ok(())
    }
}

fn capture_session(suite_dir: &Path, total_pages: u32) -> PathBuf {
    let session_dir = suite::create_session_dir(suite_dir).expect("Failed to create session");
    let plan = CapturePlan::for_pages(total_pages).expect("Failed to plan capture");
    let options = CaptureOptions {
        session_dir: session_dir.clone(),
        delay: Duration::ZERO,
        countdown: Duration::ZERO,
    };

    let mut screen = FakeReader;
    let mut turner = CountingTurner { turns: 0 };
    let report =
        run_capture(&plan, &options, &mut screen, &mut turner).expect("Capture loop failed");

    assert_eq!(report.saved, plan.shots);
    assert_eq!(turner.turns, plan.shots - 1, "No page turn after last shot");

    session_dir
}

#[test]
fn test_full_pipeline_capture_to_pdf() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let suite_dir = temp.path().join("ebook_suite");

    // Capture: 7 pages -> 4 shots
    let session_dir = capture_session(&suite_dir, 7);
    let screenshots = suite::list_screenshots(&session_dir).expect("No screenshots found");
    assert_eq!(screenshots.len(), 4);
    assert_eq!(
        screenshots[3].file_name().unwrap().to_str().unwrap(),
        "pages_007-007.png"
    );

    // Process: crop every shot with a rectangle inside the fake frame
    let output_dir = suite::output_dir_for(&session_dir).expect("Failed to create output dir");
    let rect = CropRect::new(60, 40, 580, 440).expect("Invalid rect");

    let preview = write_preview(&screenshots[0], &rect, &output_dir).expect("Preview failed");
    assert!(preview.ends_with("crop_preview.png"));

    let cropped = crop_all(&screenshots, &rect, &output_dir);
    assert_eq!(cropped.len(), 4);
    for path in &cropped {
        let img = image::open(path).expect("Failed to open cropped frame");
        assert_eq!(img.width(), 520);
        assert_eq!(img.height(), 400);
    }

    // PDF: assemble and read back
    let pdf_dir = temp.path().join("ebooks");
    fs::create_dir_all(&pdf_dir).unwrap();
    let pdf_path = pdf_dir.join(suite::pdf_filename(Some("Test Book"), &session_dir));

    let options = AssembleOptions {
        image_paths: cropped,
        output_path: pdf_path.clone(),
        title: Some("Test Book".to_string()),
        ..AssembleOptions::default()
    };
    assemble_pdf(&options).expect("Failed to assemble PDF");

    assert!(pdf_path.exists(), "PDF was not created");
    assert_eq!(pdf_path.file_name().unwrap().to_str().unwrap(), "Test_Book.pdf");
    assert_eq!(count_pages(&pdf_path).expect("Failed to count pages"), 4);

    let metadata = extract_metadata(&pdf_path).expect("Failed to read metadata");
    assert_eq!(metadata.title.as_deref(), Some("Test Book"));
    assert_eq!(metadata.author.as_deref(), Some("Book Scanner"));
}

#[test]
fn test_session_discovery_after_capture() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let suite_dir = temp.path().join("ebook_suite");

    let session_dir = capture_session(&suite_dir, 4);
    // Processed output beside the session must not be listed as a session
    suite::output_dir_for(&session_dir).unwrap();

    let sessions = suite::find_sessions(&suite_dir).expect("Discovery failed");
    assert_eq!(sessions, vec![session_dir]);
}

#[test]
fn test_crop_rectangle_wider_than_screenshot_is_clamped() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let suite_dir = temp.path().join("ebook_suite");

    let session_dir = capture_session(&suite_dir, 2);
    let screenshots = suite::list_screenshots(&session_dir).unwrap();
    let output_dir = suite::output_dir_for(&session_dir).unwrap();

    // The default reader rectangle overshoots the 640x480 fake screen;
    // the crop clamps instead of failing
    let cropped = crop_all(&screenshots, &CropRect::default(), &output_dir);
    assert_eq!(cropped.len(), 1);

    let img = image::open(&cropped[0]).unwrap();
    assert_eq!(img.width(), 640 - 215);
    assert_eq!(img.height(), 480 - 48);
}

#[test]
fn test_assemble_rejects_empty_session_output() {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let options = AssembleOptions {
        image_paths: vec![],
        output_path: temp.path().join("nothing.pdf"),
        ..AssembleOptions::default()
    };

    let result = assemble_pdf(&options);
    assert!(result.is_err(), "Should fail with no input images");
    if let Err(e) = result {
        assert!(
            e.to_string().contains("No input images"),
            "Error message should mention missing inputs: {e}"
        );
    }
}
