//! eBook Capture CLI tool
//!
//! A console tool for capturing e-book reader screenshots, cropping them to
//! the content frame, and assembling the result into a PDF. Run with no
//! subcommand for the interactive menu.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use ebook_capture::capture::{
    run_capture, ArrowKeyTurner, CaptureOptions, CapturePlan, PrimaryMonitor, DEFAULT_COUNTDOWN,
    DEFAULT_DELAY,
};
use ebook_capture::crop::{crop_all, write_preview, CropRect};
use ebook_capture::pdf::{assemble_pdf, extract_metadata, AssembleOptions};
use ebook_capture::suite;

/// eBook Capture - screenshot, crop, and PDF a book from an on-screen reader
#[derive(Parser)]
#[command(name = "ebook-capture")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Interactive menu
    ebook-capture

    # Capture a 320-page book with a 5 second page-turn delay
    ebook-capture capture --pages 320 --delay 5 --yes

    # Crop an existing session with an explicit rectangle, no prompts
    ebook-capture process --session ~/Documents/ebook_suite/book_20260829_101500 \\
        --left 215 --top 48 --right 2785 --bottom 1660 --yes --title \"My Book\"

    # Full workflow in one go
    ebook-capture run --pages 320 --yes

    # Inspect a finished PDF
    ebook-capture info ~/Documents/ebooks/My_Book.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture book page screenshots only
    Capture {
        /// Total number of pages in the book (prompted when omitted)
        #[arg(long)]
        pages: Option<u32>,

        /// Seconds to wait after each page turn
        #[arg(long, default_value_t = DEFAULT_DELAY.as_secs())]
        delay: u64,

        /// Seconds before the first shot, to focus the reader window
        #[arg(long, default_value_t = DEFAULT_COUNTDOWN.as_secs())]
        countdown: u64,

        /// Suite directory to create the session in (default: Documents/ebook_suite)
        #[arg(long)]
        suite_dir: Option<PathBuf>,

        /// Skip confirmation prompts
        #[arg(long)]
        yes: bool,
    },

    /// Crop an existing session's screenshots and optionally build a PDF
    Process {
        /// Session directory (selected interactively when omitted)
        #[arg(long)]
        session: Option<PathBuf>,

        /// Suite directory to search for sessions (default: Documents/ebook_suite)
        #[arg(long)]
        suite_dir: Option<PathBuf>,

        /// Crop rectangle left edge in pixels
        #[arg(long)]
        left: Option<u32>,

        /// Crop rectangle top edge in pixels
        #[arg(long)]
        top: Option<u32>,

        /// Crop rectangle right edge in pixels
        #[arg(long)]
        right: Option<u32>,

        /// Crop rectangle bottom edge in pixels
        #[arg(long)]
        bottom: Option<u32>,

        /// Book title for the PDF metadata and filename
        #[arg(long)]
        title: Option<String>,

        /// Directory for the finished PDF (default: Documents/ebooks)
        #[arg(long)]
        pdf_dir: Option<PathBuf>,

        /// Skip PDF creation
        #[arg(long)]
        no_pdf: bool,

        /// Skip confirmation prompts and accept the crop rectangle as-is
        #[arg(long)]
        yes: bool,
    },

    /// Full workflow: capture, then crop and build the PDF
    Run {
        /// Total number of pages in the book (prompted when omitted)
        #[arg(long)]
        pages: Option<u32>,

        /// Seconds to wait after each page turn
        #[arg(long, default_value_t = DEFAULT_DELAY.as_secs())]
        delay: u64,

        /// Seconds before the first shot, to focus the reader window
        #[arg(long, default_value_t = DEFAULT_COUNTDOWN.as_secs())]
        countdown: u64,

        /// Suite directory (default: Documents/ebook_suite)
        #[arg(long)]
        suite_dir: Option<PathBuf>,

        /// Book title for the PDF metadata and filename
        #[arg(long)]
        title: Option<String>,

        /// Directory for the finished PDF (default: Documents/ebooks)
        #[arg(long)]
        pdf_dir: Option<PathBuf>,

        /// Skip PDF creation
        #[arg(long)]
        no_pdf: bool,

        /// Skip confirmation prompts
        #[arg(long)]
        yes: bool,
    },

    /// Show page count and metadata of a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Capture {
            pages,
            delay,
            countdown,
            suite_dir,
            yes,
        }) => cmd_capture(pages, delay, countdown, suite_dir, yes).map(|_| ()),
        Some(Commands::Process {
            session,
            suite_dir,
            left,
            top,
            right,
            bottom,
            title,
            pdf_dir,
            no_pdf,
            yes,
        }) => rect_from_flags(left, top, right, bottom).and_then(|rect| {
            cmd_process(ProcessArgs {
                session,
                suite_dir,
                rect,
                title,
                pdf_dir,
                no_pdf,
                yes,
            })
        }),
        Some(Commands::Run {
            pages,
            delay,
            countdown,
            suite_dir,
            title,
            pdf_dir,
            no_pdf,
            yes,
        }) => cmd_run(pages, delay, countdown, suite_dir, title, pdf_dir, no_pdf, yes),
        Some(Commands::Info { input }) => cmd_info(input),
        None => run_menu(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Interactive main menu shown when no subcommand is given
fn run_menu() -> anyhow::Result<()> {
    println!("==================================================");
    println!("eBook Capture Suite");
    println!("==================================================");

    loop {
        println!();
        println!("What would you like to do?");
        println!("  1. Full workflow (Capture -> Process -> PDF)");
        println!("  2. Capture screenshots only");
        println!("  3. Process existing screenshots");
        println!("  4. Exit");
        println!();

        let choice = prompt("Select option (1-4): ")?;
        let result = match choice.as_str() {
            "1" => cmd_run(
                None,
                DEFAULT_DELAY.as_secs(),
                DEFAULT_COUNTDOWN.as_secs(),
                None,
                None,
                None,
                false,
                false,
            ),
            "2" => cmd_capture(
                None,
                DEFAULT_DELAY.as_secs(),
                DEFAULT_COUNTDOWN.as_secs(),
                None,
                false,
            )
            .map(|_| ()),
            "3" => cmd_process(ProcessArgs::default()),
            "4" => return Ok(()),
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3, or 4.");
                continue;
            }
        };

        // A failed stage returns to the menu rather than exiting
        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
    }
}

/// Run the capture stage; returns the session directory for chaining
fn cmd_capture(
    pages: Option<u32>,
    delay_secs: u64,
    countdown_secs: u64,
    suite_dir: Option<PathBuf>,
    yes: bool,
) -> anyhow::Result<PathBuf> {
    println!("\nCapture Screenshots");
    println!("--------------------------------------------------");
    println!("Each screenshot covers a two-page spread; the right arrow");
    println!("key advances the reader between shots.\n");

    let total_pages = match pages {
        Some(n) => n,
        None => prompt_u32("Enter the total number of pages in the book: ")?,
    };

    let plan = CapturePlan::for_pages(total_pages)?;
    let delay = Duration::from_secs(delay_secs);

    println!("\nBook details:");
    println!("Total pages: {}", plan.total_pages);
    println!("Screenshots needed: {}", plan.shots);
    let minutes = plan.estimated_duration(delay).as_secs_f64() / 60.0;
    println!("Estimated time: {minutes:.1} minutes");

    if !yes && !prompt_yes_no("\nContinue? (y/n): ")? {
        bail!("Operation cancelled");
    }

    let base = suite_dir.unwrap_or_else(suite::base_dir);
    let session_dir = suite::create_session_dir(&base)?;
    println!("\nScreenshots will be saved to: {}", session_dir.display());
    println!("Make sure the reader window is active and on the first page.");

    let mut screen = PrimaryMonitor::new()?;
    let mut turner = ArrowKeyTurner::new()?;
    let options = CaptureOptions {
        session_dir: session_dir.clone(),
        delay,
        countdown: Duration::from_secs(countdown_secs),
    };

    let report = run_capture(&plan, &options, &mut screen, &mut turner)?;

    println!("\nCapture completed!");
    println!(
        "Captured {}/{} screenshots covering {} pages",
        report.saved, report.attempted, plan.total_pages
    );
    println!("All files saved in: {}", session_dir.display());

    Ok(session_dir)
}

/// Arguments for the process stage
#[derive(Default)]
struct ProcessArgs {
    session: Option<PathBuf>,
    suite_dir: Option<PathBuf>,
    rect: Option<CropRect>,
    title: Option<String>,
    pdf_dir: Option<PathBuf>,
    no_pdf: bool,
    yes: bool,
}

/// Run the process stage: crop every screenshot, optionally build the PDF
fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    println!("\nProcess Screenshots");
    println!("--------------------------------------------------");

    let base = args.suite_dir.clone().unwrap_or_else(suite::base_dir);
    let session_dir = match args.session {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("Session directory not found: {}", dir.display());
            }
            dir
        }
        None => select_session(&base)?,
    };
    println!("Selected session: {}", session_dir.display());

    let screenshots = suite::list_screenshots(&session_dir)?;
    println!("Found {} images to process", screenshots.len());

    let output_dir = suite::output_dir_for(&session_dir)?;

    // Preview the rectangle on the first screenshot before committing
    let mut rect = args.rect.unwrap_or_default();
    let first = &screenshots[0];
    match write_preview(first, &rect, &output_dir) {
        Ok(path) => {
            println!("\nPreview saved as: {}", path.display());
            println!("The green rectangle shows what will be kept.");
        }
        Err(e) => eprintln!("Warning: could not create preview: {e}"),
    }
    println!(
        "Frame boundaries: left={}, top={}, right={}, bottom={}",
        rect.left, rect.top, rect.right, rect.bottom
    );

    if !args.yes {
        match prompt("\nDoes this frame look good? (y/n/a to adjust): ")?
            .to_lowercase()
            .as_str()
        {
            "y" | "yes" => {}
            "a" | "adjust" => rect = adjust_rect_interactively(first, &output_dir)?,
            _ => bail!("Operation cancelled"),
        }
    }

    // Decide on PDF creation before the long cropping run
    let make_pdf = if args.no_pdf {
        false
    } else if args.yes {
        true
    } else {
        prompt_yes_no("\nCreate a single PDF from the cropped pages? (y/n): ")?
    };

    let title = if make_pdf && args.title.is_none() && !args.yes {
        let entered = prompt("Enter book title for the PDF (or press Enter to skip): ")?;
        if entered.is_empty() { None } else { Some(entered) }
    } else {
        args.title.clone()
    };

    let pdf_dir = if make_pdf {
        Some(resolve_pdf_dir(args.pdf_dir, args.yes)?)
    } else {
        None
    };

    println!("\nCropping {} images...", screenshots.len());
    let cropped = crop_all(&screenshots, &rect, &output_dir);

    println!("\nFrame cropping completed!");
    println!(
        "Successfully processed: {}/{} images",
        cropped.len(),
        screenshots.len()
    );
    println!("Cropped frames saved in: {}", output_dir.display());

    if cropped.is_empty() {
        bail!("No images could be cropped");
    }

    if let Some(pdf_dir) = pdf_dir {
        let filename = suite::pdf_filename(title.as_deref(), &session_dir);
        let output_path = pdf_dir.join(&filename);

        println!("\nCreating PDF with {} pages...", cropped.len());
        let options = AssembleOptions {
            image_paths: cropped,
            output_path: output_path.clone(),
            title,
            ..AssembleOptions::default()
        };
        assemble_pdf(&options)?;

        println!("\nPDF created: {}", output_path.display());
    }

    Ok(())
}

/// Full workflow: capture then process
fn cmd_run(
    pages: Option<u32>,
    delay_secs: u64,
    countdown_secs: u64,
    suite_dir: Option<PathBuf>,
    title: Option<String>,
    pdf_dir: Option<PathBuf>,
    no_pdf: bool,
    yes: bool,
) -> anyhow::Result<()> {
    println!("\n==================================================");
    println!("FULL WORKFLOW: Capture -> Process -> PDF");
    println!("==================================================");

    let session_dir = cmd_capture(pages, delay_secs, countdown_secs, suite_dir.clone(), yes)?;

    if !yes {
        prompt("\nPress Enter to continue to processing...")?;
    }

    cmd_process(ProcessArgs {
        session: Some(session_dir),
        suite_dir,
        rect: None,
        title,
        pdf_dir,
        no_pdf,
        yes,
    })?;

    println!("\nFull workflow completed successfully!");
    Ok(())
}

/// Show page count and metadata of a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);
    if let Some(title) = metadata.title {
        println!("Title: {title}");
    }
    if let Some(author) = metadata.author {
        println!("Author: {author}");
    }

    Ok(())
}

/// Build a crop rectangle from CLI flags
///
/// All four edges must be given together; a partial set falls back to the
/// default rectangle, a degenerate set is an error.
fn rect_from_flags(
    left: Option<u32>,
    top: Option<u32>,
    right: Option<u32>,
    bottom: Option<u32>,
) -> anyhow::Result<Option<CropRect>> {
    match (left, top, right, bottom) {
        (Some(l), Some(t), Some(r), Some(b)) => Ok(Some(CropRect::new(l, t, r, b)?)),
        (None, None, None, None) => Ok(None),
        _ => bail!("Crop flags --left, --top, --right and --bottom must be given together"),
    }
}

/// Pick a capture session, prompting when several exist
fn select_session(base: &PathBuf) -> anyhow::Result<PathBuf> {
    let mut sessions = suite::find_sessions(base)?;

    if sessions.is_empty() {
        eprintln!("Run the capture stage first to create a session.");
        return Err(ebook_capture::Error::NoSessions(base.clone()).into());
    }

    if sessions.len() == 1 {
        return Ok(sessions.remove(0));
    }

    println!("Found multiple capture sessions:");
    for (i, session) in sessions.iter().enumerate() {
        let name = session.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        println!("  {}. {}", i + 1, name);
    }

    loop {
        let choice = prompt("\nSelect session number: ")?;
        match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= sessions.len() => {
                return Ok(sessions[n - 1].clone());
            }
            _ => println!("Invalid selection. Please try again."),
        }
    }
}

/// Interactive crop adjustment: enter coordinates, preview, repeat until accepted
fn adjust_rect_interactively(
    first_screenshot: &PathBuf,
    output_dir: &PathBuf,
) -> anyhow::Result<CropRect> {
    let img = image::open(first_screenshot)
        .with_context(|| format!("Failed to open {}", first_screenshot.display()))?;
    let (w, h) = (img.width(), img.height());
    println!("Image size: {w} x {h}");

    loop {
        let left = prompt_u32(&format!("Left edge (0-{w}): "))?;
        let top = prompt_u32(&format!("Top edge (0-{h}): "))?;
        let right = prompt_u32(&format!("Right edge ({left}-{w}): "))?;
        let bottom = prompt_u32(&format!("Bottom edge ({top}-{h}): "))?;

        let rect = match CropRect::new(left, top, right, bottom) {
            Ok(rect) => rect,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match write_preview(first_screenshot, &rect, output_dir) {
            Ok(path) => println!("Updated preview saved as: {}", path.display()),
            Err(e) => {
                println!("{e}");
                continue;
            }
        }

        if prompt_yes_no("Use this frame? (y/n): ")? {
            return Ok(rect);
        }
    }
}

/// Resolve the PDF output directory, prompting unless running unattended
fn resolve_pdf_dir(pdf_dir: Option<PathBuf>, yes: bool) -> anyhow::Result<PathBuf> {
    let dir = match pdf_dir {
        Some(dir) => dir,
        None if yes => suite::default_pdf_dir(),
        None => {
            let default_dir = suite::default_pdf_dir();
            println!("\nWhere should the PDF be saved?");
            println!("   Default: {}", default_dir.display());
            let entered = prompt("   Enter path (or press Enter for default): ")?;
            if entered.is_empty() {
                default_dir
            } else {
                PathBuf::from(entered)
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create PDF directory {}", dir.display()))?;
    println!("PDF will be saved to: {}", dir.display());
    Ok(dir)
}

/// Print a prompt and read one trimmed line from stdin
fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Yes/no prompt; anything but y/yes counts as no
fn prompt_yes_no(message: &str) -> anyhow::Result<bool> {
    let answer = prompt(message)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Prompt until the user enters a valid non-negative number
fn prompt_u32(message: &str) -> anyhow::Result<u32> {
    loop {
        let answer = prompt(message)?;
        match answer.parse::<u32>() {
            Ok(n) => return Ok(n),
            Err(_) => println!("Please enter a valid number."),
        }
    }
}
