//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use trendcast_core::{
    AiStage, AssembleOptions, EnrichmentProgress, TitleFilter, assemble, load_frequency_words,
};
use trendcast_markup::{Platform, format_for_platform};
use trendcast_shared::{
    AppConfig, ReportInput, ReportMode, ReportPayload, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Trendcast: trending news into reports, video scripts and notifications.
#[derive(Parser)]
#[command(
    name = "trendcast",
    version,
    about = "Turn aggregated trending news into reports, video scripts and channel-ready notifications.",
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
    /// Assemble a report payload from aggregated statistics.
    Report {
        /// Report input JSON (stats, new_titles, id_to_name, failed_ids).
        #[arg(short, long)]
        input: PathBuf,

        /// Report mode: daily, current or incremental (overrides config).
        #[arg(short, long)]
        mode: Option<ReportMode>,

        /// Frequency-word file used to filter new titles (overrides config).
        #[arg(long)]
        frequency_words: Option<PathBuf>,

        /// Skip AI enrichment even if enabled in config.
        #[arg(long)]
        no_ai: bool,

        /// Write output here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the AI document formatted for this channel instead of the
        /// payload JSON.
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// Adapt a Markdown document for a notification channel.
    Format {
        /// Target channel (feishu, dingtalk, wework, telegram, bark, ntfy, slack, ...).
        #[arg(short, long)]
        platform: String,

        /// Document to read (defaults to stdin).
        #[arg(short, long)]
        input: Option<PathBuf>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean for payloads.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "trendcast=info",
        1 => "trendcast=debug",
        _ => "trendcast=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report {
            input,
            mode,
            frequency_words,
            no_ai,
            out,
            platform,
        } => {
            let mut config = load_config()?;
            if let Some(mode) = mode {
                config.report.mode = mode;
            }
            if frequency_words.is_some() {
                config.report.frequency_words = frequency_words;
            }
            if no_ai {
                config.enrichment.enabled = false;
            }
            cmd_report(config, &input, out.as_deref(), platform.as_deref()).await
        }
        Command::Format { platform, input } => cmd_format(&platform, input.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_report(
    config: AppConfig,
    input: &Path,
    out: Option<&Path>,
    platform: Option<&str>,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .wrap_err_with(|| format!("cannot read report input '{}'", input.display()))?;
    let report_input: ReportInput = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("invalid report input '{}'", input.display()))?;

    let words = config
        .report
        .frequency_words
        .as_deref()
        .map(load_frequency_words)
        .transpose()?;

    info!(
        input = %input.display(),
        mode = %config.report.mode,
        ai = config.enrichment.enabled,
        filtered = words.is_some(),
        "assembling report"
    );

    // The enrichment client does blocking HTTP, so the whole pipeline runs
    // off the async runtime.
    let progress = CliProgress::new();
    let payload = tokio::task::spawn_blocking(move || {
        let ai = AiStage::from_config(&config);
        let options = AssembleOptions::from(&config.report);
        let filter = words.as_ref().map(|w| w as &dyn TitleFilter);

        let payload = assemble(&report_input, &options, filter, Some(&ai), &progress);
        progress.finish();
        payload
    })
    .await
    .map_err(|e| eyre!("report task failed: {e}"))?;

    print_summary(&payload);

    let output = match platform {
        Some(name) => {
            let content = payload.ai_content().ok_or_else(|| {
                eyre!(
                    "report has no AI document to format; enable [enrichment] with video_format = true"
                )
            })?;
            format_for_platform(content, &Platform::from_name(name))
        }
        None => serde_json::to_string_pretty(&payload)?,
    };

    write_output(out, &output)
}

fn print_summary(payload: &ReportPayload) {
    info!(
        stats = payload.stats.len(),
        new_titles = payload.total_new_count,
        failed_sources = payload.failed_ids.len(),
        ai_processed = payload.ai_processed(),
        "report ready"
    );

    if let Some(ai) = &payload.ai {
        let enriched = ai
            .ai_categories
            .non_empty()
            .flat_map(|(_, items)| items)
            .filter(|item| item.enrichment.is_some())
            .count();
        let total = ai.ai_categories.total();
        if enriched < total {
            warn!(enriched, total, "some items were not enriched");
        }
    }
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .wrap_err_with(|| format!("cannot write '{}'", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

async fn cmd_format(platform: &str, input: Option<&Path>) -> Result<()> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("cannot read stdin")?;
            buf
        }
    };

    let platform = Platform::from_name(platform);
    info!(platform = %platform, chars = content.chars().count(), "formatting document");

    println!("{}", format_for_platform(&content, &platform));
    Ok(())
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
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl EnrichmentProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn task_progress(&self, current: usize, total: usize, detail: &str) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {detail}"));
    }
}
