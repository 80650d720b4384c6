//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use reeltab_core::{ListingSource, PipelineConfig, ProgressReporter, ScrapeReport};
use reeltab_shared::{AppConfig, init_config, load_config, load_profile_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// reeltab: scrape one movie listing page into an aligned dataset and chart.
#[derive(Parser)]
#[command(
    name = "reeltab",
    version,
    about = "Scrape a static movie-listing page into a tabular dataset and a box-plot.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape the listing page and render the chart.
    Scrape {
        /// Listing page URL (defaults to the profile's URL).
        url: Option<String>,

        /// Read pre-fetched markup from a local file instead of fetching.
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Path to a standalone scrape profile (TOML).
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Output directory for the chart artifact.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip rendering the chart.
        #[arg(long)]
        no_chart: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "reeltab=info",
        1 => "reeltab=debug",
        _ => "reeltab=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            url,
            file,
            profile,
            out,
            no_chart,
        } => {
            cmd_scrape(
                url.as_deref(),
                file.as_deref(),
                profile.as_deref(),
                out.as_deref(),
                no_chart,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_scrape(
    url: Option<&str>,
    file: Option<&std::path::Path>,
    profile_path: Option<&std::path::Path>,
    out: Option<&std::path::Path>,
    no_chart: bool,
) -> Result<()> {
    let config = load_config()?;

    let profile = match profile_path {
        Some(path) => load_profile_from(path)?,
        None => config.profile.clone(),
    };

    // Source precedence: --file, then positional URL, then the profile URL.
    let source = if let Some(path) = file {
        ListingSource::Markup(path.to_path_buf())
    } else {
        let raw = url.unwrap_or(&profile.url);
        if raw.is_empty() {
            return Err(eyre!("no URL given and the profile has none"));
        }
        let parsed = Url::parse(raw).map_err(|e| eyre!("invalid URL '{raw}': {e}"))?;
        ListingSource::Url(parsed)
    };

    let output_dir = match out {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(&config.defaults.output_dir),
    };

    let pipeline_config = PipelineConfig {
        source,
        profile,
        output_dir,
        timeout_secs: config.defaults.timeout_secs,
        render_chart: !no_chart,
    };

    info!(
        source = %pipeline_config.source.describe(),
        profile = %pipeline_config.profile.name,
        "scraping listing"
    );

    let reporter = CliProgress::new();
    let report = reeltab_core::run(&pipeline_config, &reporter).await?;

    // Print summary
    println!();
    println!("  Scrape complete!");
    println!("  Run:     {}", report.run_id);
    println!("  Source:  {}", report.source);
    println!("  Records: {}", report.record_count);
    println!("  Fields:  {}", report.field_names.join(", "));
    if let Some(chart) = &report.chart_path {
        println!("  Chart:   {}", chart.display());
    }
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn field_extracted(&self, name: &str, matched: usize) {
        self.spinner
            .set_message(format!("Extracting {name} ({matched} matched)"));
    }

    fn done(&self, _report: &ScrapeReport) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
