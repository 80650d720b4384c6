//! One-shot scrape pipeline: markup in, aligned dataset and chart out.
//!
//! Stages run strictly in sequence. Every stage's output is recorded on the
//! [`ScrapeContext`] so the run's intermediate state lives in one explicit
//! place instead of ambient bindings.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use scraper::Html;
use tracing::{info, instrument};
use url::Url;

use reeltab_dataset::{Dataset, align};
use reeltab_scrape::{FetchOptions, FetchedListing, Fetcher, extract, normalize};
use reeltab_shared::{
    PageSnapshot, ReeltabError, Result, RunId, ScrapeProfile, Value,
};

// ---------------------------------------------------------------------------
// Configuration and results
// ---------------------------------------------------------------------------

/// Where the listing markup comes from.
#[derive(Debug, Clone)]
pub enum ListingSource {
    /// Fetch over HTTP.
    Url(Url),
    /// Read pre-fetched markup from a local file.
    Markup(PathBuf),
}

impl ListingSource {
    /// Human-readable source description for logs and summaries.
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.to_string(),
            Self::Markup(path) => path.display().to_string(),
        }
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Markup source (URL or local file).
    pub source: ListingSource,
    /// The scrape profile to apply.
    pub profile: ScrapeProfile,
    /// Directory for the chart artifact.
    pub output_dir: PathBuf,
    /// HTTP timeout for the fetch, in seconds.
    pub timeout_secs: u64,
    /// Whether to render the chart artifact.
    pub render_chart: bool,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct ScrapeReport {
    /// Run identifier.
    pub run_id: RunId,
    /// Where the markup came from.
    pub source: String,
    /// Records in the final dataset.
    pub record_count: usize,
    /// Column names in profile order.
    pub field_names: Vec<String>,
    /// Path of the written chart, when rendering was requested.
    pub chart_path: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each field extraction with the match count.
    fn field_extracted(&self, name: &str, matched: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ScrapeReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn field_extracted(&self, _name: &str, _matched: usize) {}
    fn done(&self, _report: &ScrapeReport) {}
}

// ---------------------------------------------------------------------------
// Scrape context
// ---------------------------------------------------------------------------

/// Accumulated per-run state, one entry per profile field in profile order.
///
/// Raw and normalized sequences are written once by their stage and read by
/// the next; nothing mutates a stage's output after it completes.
#[derive(Debug)]
pub struct ScrapeContext {
    /// Snapshot metadata of the scraped page.
    pub snapshot: PageSnapshot,
    /// Extracted text fragments per field.
    pub raw: Vec<(String, Vec<String>)>,
    /// Typed values per field, same cardinality as `raw`.
    pub normalized: Vec<(String, Vec<Value>)>,
    /// Sentinel-aligned columns, each `expected_records` long.
    pub aligned: Vec<(String, Vec<Value>)>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full scrape pipeline.
///
/// 1. Fetch the listing markup (or read it from disk)
/// 2. Extract every profile field in document order
/// 3. Normalize raw fragments into typed values
/// 4. Align fields with declared gaps, then validate cardinality
/// 5. Assemble the dataset and drop configured records
/// 6. Render the box-plot artifact
#[instrument(skip_all, fields(profile = %config.profile.name))]
pub async fn run(
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeReport> {
    let start = Instant::now();
    let run_id = RunId::new();
    let profile = &config.profile;

    if profile.fields.is_empty() {
        return Err(ReeltabError::config("profile has no fields"));
    }

    info!(%run_id, source = %config.source.describe(), "starting scrape");

    // --- Phase 1: obtain markup ---
    progress.phase("Fetching listing");
    let listing = match &config.source {
        ListingSource::Url(url) => {
            let fetcher = Fetcher::new(&FetchOptions {
                timeout_secs: config.timeout_secs,
            })?;
            fetcher.fetch(url).await?
        }
        ListingSource::Markup(path) => {
            let html =
                std::fs::read_to_string(path).map_err(|e| ReeltabError::io(path, e))?;
            FetchedListing::from_markup(html, &path.display().to_string())
        }
    };

    let mut context = ScrapeContext {
        snapshot: listing.snapshot.clone(),
        raw: Vec::with_capacity(profile.fields.len()),
        normalized: Vec::with_capacity(profile.fields.len()),
        aligned: Vec::with_capacity(profile.fields.len()),
    };

    // --- Phase 2: extract ---
    progress.phase("Extracting fields");
    {
        let doc = Html::parse_document(&listing.html);
        for field in &profile.fields {
            let raw = extract(&doc, &field.selector)?;
            progress.field_extracted(&field.name, raw.len());
            context.raw.push((field.name.clone(), raw));
        }
    }

    // --- Phase 3: normalize ---
    progress.phase("Normalizing fields");
    for (field, (name, raw)) in profile.fields.iter().zip(&context.raw) {
        let values = normalize(name, field.kind, raw)?;
        context.normalized.push((name.clone(), values));
    }

    // --- Phase 4: align and validate ---
    progress.phase("Aligning columns");
    for (field, (name, values)) in profile.fields.iter().zip(&context.normalized) {
        let aligned = match &field.missing {
            Some(missing) => {
                let sentinels = vec![Value::Missing; missing.positions.len()];
                align(values, &missing.positions, &sentinels)?
            }
            None => values.clone(),
        };

        // Page structure drift is fatal; there is no fallback.
        if aligned.len() != profile.expected_records {
            return Err(ReeltabError::validation(format!(
                "field '{name}' has {} records after alignment, expected {}",
                aligned.len(),
                profile.expected_records
            )));
        }

        context.aligned.push((name.clone(), aligned));
    }

    // --- Phase 5: assemble and drop ---
    progress.phase("Assembling dataset");
    let mut dataset = Dataset::assemble(context.aligned.clone())?;

    // Highest index first so earlier drops do not shift later ones.
    let mut drops = profile.drop_records.clone();
    drops.sort_unstable();
    drops.dedup();
    for &index in drops.iter().rev() {
        dataset.remove_record(index)?;
    }

    info!(
        records = dataset.len(),
        dropped = drops.len(),
        "dataset assembled"
    );

    // --- Phase 6: chart ---
    let chart_path = if config.render_chart {
        progress.phase("Rendering chart");
        std::fs::create_dir_all(&config.output_dir)
            .map_err(|e| ReeltabError::io(&config.output_dir, e))?;

        let plot = reeltab_chart::render(
            &dataset,
            &profile.chart.x_field,
            &profile.chart.y_field,
            profile.chart.group_field.as_deref(),
        )?;
        let path = config.output_dir.join(&profile.chart.file_name);
        reeltab_chart::write_html(&plot, &path)?;
        Some(path)
    } else {
        None
    };

    let report = ScrapeReport {
        run_id,
        source: config.source.describe(),
        record_count: dataset.len(),
        field_names: dataset.field_names().iter().map(|s| s.to_string()).collect(),
        chart_path,
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        run_id = %report.run_id,
        records = report.record_count,
        elapsed_ms = report.elapsed.as_millis(),
        "scrape complete"
    );

    Ok(report)
}
