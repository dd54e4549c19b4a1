//! # CLI Module
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! # Check a directory for duplicates
//! find-duplicate-images ~/Photos
//!
//! # Stricter similarity profile, nested directories included
//! find-duplicate-images ~/Photos --profile strict --recursive
//!
//! # Review every match before it is reported
//! find-duplicate-images ~/Photos --manual-validation
//!
//! # JSON output
//! find-duplicate-images ~/Photos --output json
//! ```

use clap::{Parser, ValueEnum};
use console::Term;
use duplicate_image_finder::core::cache::{default_cache_path, JsonFileStore, ResultCache};
use duplicate_image_finder::core::pipeline::{Pipeline, PipelineResult};
use duplicate_image_finder::core::reporter::{DuplicateReport, ReportBuilder, TerminalConfirmer};
use duplicate_image_finder::core::tools::{FfmpegSsim, MagickPreview, MagickTransform, Toolkit};
use duplicate_image_finder::core::SimilarityThreshold;
use duplicate_image_finder::error::{ReportError, Result};
use duplicate_image_finder::events::{
    CompareEvent, Event, EventChannel, EventReceiver, ScanEvent, StageEvent,
};
use duplicate_image_finder::init_tracing;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Find visually duplicate JPEG photos
#[derive(Parser, Debug)]
#[command(name = "find-duplicate-images")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Image files and directories to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Confirm every match interactively, with a side-by-side preview
    #[arg(short, long)]
    manual_validation: bool,

    /// Similarity profile
    #[arg(short, long, default_value = "balanced")]
    profile: Profile,

    /// Minimum similarity score (0-1); overrides the profile
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Descend into nested directories
    #[arg(short, long)]
    recursive: bool,

    /// Include hidden directory entries
    #[arg(long)]
    include_hidden: bool,

    /// Number of parallel workers (default: one per CPU)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Cache file path
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// ImageMagick `convert` binary
    #[arg(long, default_value = MagickTransform::DEFAULT_BIN)]
    magick: String,

    /// ffmpeg binary
    #[arg(long, default_value = FfmpegSsim::DEFAULT_BIN)]
    ffmpeg: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Profile {
    /// SSIM >= 0.9
    Strict,
    /// SSIM >= 0.8 (default)
    Balanced,
}

impl From<Profile> for SimilarityThreshold {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Strict => SimilarityThreshold::strict(),
            Profile::Balanced => SimilarityThreshold::balanced(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Progress counters and a line-oriented listing
    Text,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let threshold = match cli.threshold {
        Some(minimum) => SimilarityThreshold::new(minimum)?,
        None => cli.profile.into(),
    };

    let cache_path = cli.cache.clone().unwrap_or_else(default_cache_path);
    let cache = ResultCache::open(Box::new(JsonFileStore::new(cache_path)))?;
    let tools = Toolkit::system(&cli.magick, &cli.ffmpeg);

    let mut builder = Pipeline::builder()
        .paths(cli.paths.clone())
        .recursive(cli.recursive)
        .include_hidden(cli.include_hidden)
        .tools(tools.clone())
        .cache(cache);
    if let Some(jobs) = cli.jobs {
        builder = builder.workers(jobs);
    }
    let mut pipeline = builder.build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();
    let show_progress = cli.output == OutputFormat::Text;
    let event_thread = thread::spawn(move || render_events(receiver, show_progress));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    let result = result?;

    let reporter = ReportBuilder::new(threshold, tools.inspector.clone());
    let report = if cli.manual_validation {
        let mut confirmer = TerminalConfirmer::new(Term::stderr())
            .with_preview(Arc::new(MagickPreview::new(cli.magick.as_str())));
        reporter.build(&result.scored, Some(&mut confirmer))?
    } else {
        reporter.build(&result.scored, None)?
    };

    match cli.output {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => print_json_results(&result, &report)?,
    }

    Ok(())
}

/// Prints the stage counters and drives one progress bar per pooled stage
fn render_events(receiver: EventReceiver, show_progress: bool) {
    let term = Term::stdout();
    let mut bar: Option<ProgressBar> = None;

    for event in receiver.iter() {
        if !show_progress {
            continue;
        }

        match event {
            Event::Scan(ScanEvent::Completed { total_files }) => {
                term.write_line(&format!("Found {total_files} JPEG files to check"))
                    .ok();
            }
            Event::Fingerprint(StageEvent::Started { to_compute, cached }) => {
                term.write_line(&format!(
                    "Computing {to_compute} visually-tolerant fingerprints of images \
                     (found {cached} in cache)…"
                ))
                .ok();
                bar = stage_bar(to_compute);
            }
            Event::Compare(CompareEvent::Completed {
                candidate_images, ..
            }) => {
                term.write_line(&format!(
                    "Found {candidate_images} potentially identical images"
                ))
                .ok();
            }
            Event::Verify(StageEvent::Started { to_compute, cached }) => {
                term.write_line(&format!(
                    "Computing structural similarity of {to_compute} pairs of images \
                     (found {cached} in cache)…"
                ))
                .ok();
                bar = stage_bar(to_compute);
            }
            Event::Fingerprint(StageEvent::Progress(p)) | Event::Verify(StageEvent::Progress(p)) => {
                if let Some(ref pb) = bar {
                    pb.set_position(p.completed as u64);
                    pb.set_message(
                        p.current_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
            }
            Event::Fingerprint(StageEvent::Completed { .. })
            | Event::Verify(StageEvent::Completed { .. }) => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}

fn stage_bar(total: usize) -> Option<ProgressBar> {
    if total == 0 {
        return None;
    }

    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    Some(pb)
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: usize,
    fingerprints_computed: usize,
    fingerprints_cached: usize,
    candidate_images: usize,
    clusters: usize,
    pairs: usize,
    similarities_computed: usize,
    similarities_cached: usize,
    duration_ms: u64,
    report: &'a DuplicateReport,
}

fn print_json_results(result: &PipelineResult, report: &DuplicateReport) -> Result<()> {
    let output = JsonOutput {
        files: result.files.len(),
        fingerprints_computed: result.fingerprints_computed,
        fingerprints_cached: result.fingerprints_cached,
        candidate_images: result.candidate_images(),
        clusters: result.clusters.len(),
        pairs: result.pair_count,
        similarities_computed: result.similarities_computed,
        similarities_cached: result.similarities_cached,
        duration_ms: result.duration_ms,
        report,
    };

    let json = serde_json::to_string_pretty(&output).map_err(ReportError::Serialize)?;
    println!("{json}");
    Ok(())
}
