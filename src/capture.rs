//! Timed screenshot loop for book page capture
//!
//! Each shot covers two facing pages. The loop saves a screenshot, sends a
//! "next page" key press, then waits a fixed delay for the reader to turn
//! the page. Screen access and key injection sit behind traits so the loop
//! logic is testable without a display.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use image::RgbaImage;
use xcap::Monitor;

use crate::error::{Error, Result};

/// Default wait between shots, giving the reader time to render the next spread
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// Default countdown before the first shot, giving the user time to focus
/// the reader window
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(15);

/// Pages visible in one screenshot (a two-page spread)
pub const PAGES_PER_SHOT: u32 = 2;

/// Source of screen images
pub trait ScreenSource {
    /// Grab the current screen contents
    fn grab(&mut self) -> Result<RgbaImage>;
}

/// Advances the e-book reader to the next page spread
pub trait PageTurner {
    /// Send one "next page" input to the reader
    fn next_page(&mut self) -> Result<()>;
}

/// Screen source backed by the primary monitor
pub struct PrimaryMonitor {
    monitor: Monitor,
}

impl PrimaryMonitor {
    /// Open the primary monitor, falling back to the first one listed
    pub fn new() -> Result<Self> {
        let monitors = Monitor::all().map_err(|e| Error::Capture(e.to_string()))?;

        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(Self { monitor });
            }
            if fallback.is_none() {
                fallback = Some(monitor);
            }
        }

        fallback
            .map(|monitor| Self { monitor })
            .ok_or_else(|| Error::Capture("No monitors found".to_string()))
    }
}

impl ScreenSource for PrimaryMonitor {
    fn grab(&mut self) -> Result<RgbaImage> {
        self.monitor
            .capture_image()
            .map_err(|e| Error::Capture(e.to_string()))
    }
}

/// Page turner that presses the right-arrow key
pub struct ArrowKeyTurner {
    enigo: Enigo,
}

impl ArrowKeyTurner {
    /// Connect to the platform input system
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| Error::Capture(format!("Failed to init input: {e}")))?;
        Ok(Self { enigo })
    }
}

impl PageTurner for ArrowKeyTurner {
    fn next_page(&mut self) -> Result<()> {
        self.enigo
            .key(Key::RightArrow, Direction::Click)
            .map_err(|e| Error::Capture(format!("Failed to press key: {e}")))
    }
}

/// Shot schedule for a book of a known page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePlan {
    /// Total pages in the book
    pub total_pages: u32,
    /// Number of screenshots needed (two pages per shot, rounded up)
    pub shots: u32,
}

impl CapturePlan {
    /// Build a plan for a book with `total_pages` pages
    pub fn for_pages(total_pages: u32) -> Result<Self> {
        if total_pages == 0 {
            return Err(Error::General(
                "Page count must be a positive number".to_string(),
            ));
        }
        let shots = total_pages.div_ceil(PAGES_PER_SHOT);
        Ok(Self { total_pages, shots })
    }

    /// Page range covered by shot `shot` (1-based): `(first, last)` inclusive
    ///
    /// The final shot of an odd-length book covers a single page, so
    /// `first == last` there.
    pub fn page_range(&self, shot: u32) -> (u32, u32) {
        let first = (shot - 1) * PAGES_PER_SHOT + 1;
        let last = (shot * PAGES_PER_SHOT).min(self.total_pages);
        (first, last)
    }

    /// Human-readable label for a shot, e.g. "pages 3-4" or "page 9"
    pub fn page_label(&self, shot: u32) -> String {
        let (first, last) = self.page_range(shot);
        if first == last {
            format!("page {first}")
        } else {
            format!("pages {first}-{last}")
        }
    }

    /// Screenshot filename for a shot, e.g. `pages_003-004.png`
    pub fn shot_filename(&self, shot: u32) -> String {
        let (first, last) = self.page_range(shot);
        format!("pages_{first:03}-{last:03}.png")
    }

    /// Rough run time: one delay per shot
    pub fn estimated_duration(&self, delay: Duration) -> Duration {
        delay * self.shots
    }
}

/// Options controlling a capture run
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Directory where screenshots are written
    pub session_dir: PathBuf,
    /// Wait after each page turn
    pub delay: Duration,
    /// Wait before the first shot
    pub countdown: Duration,
}

/// Outcome of a capture run
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Shots attempted
    pub attempted: u32,
    /// Screenshots written to disk
    pub saved: u32,
    /// Paths of the saved screenshots, in shot order
    pub files: Vec<PathBuf>,
}

/// Run the capture loop
///
/// For every shot: grab the screen, save it, then press "next" and wait —
/// except after the final shot, which needs no page turn. A failed shot is
/// reported and the loop moves on, so one bad frame never loses the rest
/// of the book.
pub fn run_capture(
    plan: &CapturePlan,
    options: &CaptureOptions,
    source: &mut dyn ScreenSource,
    turner: &mut dyn PageTurner,
) -> Result<CaptureReport> {
    if !options.countdown.is_zero() {
        eprintln!(
            "Starting in {} seconds... focus the reader window on page 1",
            options.countdown.as_secs()
        );
        thread::sleep(options.countdown);
    }

    let mut report = CaptureReport {
        attempted: 0,
        saved: 0,
        files: Vec::new(),
    };

    for shot in 1..=plan.shots {
        report.attempted += 1;
        eprint!(
            "Screenshot {}/{} ({}) - ",
            shot,
            plan.shots,
            plan.page_label(shot)
        );

        match capture_one(plan, options, source, shot) {
            Ok(path) => {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
                eprintln!("saved {name}");
                report.saved += 1;
                report.files.push(path);
            }
            Err(e) => {
                eprintln!("failed: {e}");
            }
        }

        // No page turn after the last spread
        if shot < plan.shots {
            if let Err(e) = turner.next_page() {
                eprintln!("Warning: could not turn page: {e}");
            }
            thread::sleep(options.delay);
        }
    }

    Ok(report)
}

fn capture_one(
    plan: &CapturePlan,
    options: &CaptureOptions,
    source: &mut dyn ScreenSource,
    shot: u32,
) -> Result<PathBuf> {
    let screenshot = source.grab()?;
    let path = options.session_dir.join(plan.shot_filename(shot));
    screenshot.save(&path)?;
    Ok(path)
}
