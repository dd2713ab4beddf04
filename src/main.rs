//! CLI entry point for the NYC 311 dashboard.
//!
//! Loads complaints from the live open-data endpoint or an uploaded CSV,
//! then emits the dashboard view as JSON, exports the normalized dataset,
//! or runs an interactive filter loop over a cached dataset.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use nyc311_dashboard::analyzers::{DerivedPolicy, Filters};
use nyc311_dashboard::cache::DatasetCache;
use nyc311_dashboard::config::Config;
use nyc311_dashboard::dashboard::{DashboardView, build_view};
use nyc311_dashboard::infra::{OpenDataClient, UploadSource};
use nyc311_dashboard::output::{export_records, log_summary, print_pretty, save_json, write_json};
use nyc311_dashboard::services::{Dataset, load_dataset};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nyc311_dashboard")]
#[command(about = "Complaint demand, backlog and same-day closure views for NYC 311", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// CSV file to use instead of the live endpoint (may be gzip-compressed)
    #[arg(short, long, value_name = "FILE")]
    file: Option<String>,

    /// Recompute hour/is_closed/closed_same_day even if the file already has them
    #[arg(long, default_value_t = false)]
    recompute_derived: bool,
}

impl SourceArgs {
    fn policy(&self) -> DerivedPolicy {
        if self.recompute_derived {
            DerivedPolicy::Recompute
        } else {
            DerivedPolicy::Preserve
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard view for one set of filters
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        /// Complaint type to keep, or "All"
        #[arg(short = 't', long, default_value = "All")]
        complaint_type: String,

        /// Borough to keep, or "All"
        #[arg(short, long, default_value = "All")]
        borough: String,

        /// Creation hour (0-23) to keep, or "All"
        #[arg(long, default_value = "All")]
        hour: String,

        /// Write the JSON view here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print the JSON view
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Write the normalized dataset, derived columns included, to CSV
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "nyc311_normalized.csv")]
        output: String,
    },
    /// Read filter commands from stdin and print a view after each one
    ///
    /// Commands: type=<value>, borough=<value>, hour=<value>, reset,
    /// refresh, show, quit
    Explore {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&config.log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&config.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nyc311_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let cache = DatasetCache::new();

    match cli.command {
        Commands::Dashboard {
            source,
            complaint_type,
            borough,
            hour,
            output,
            pretty,
        } => {
            let filters = Filters::new(&complaint_type, &borough, &hour)?;
            let input = Source::new(&config, &source)?;
            let dataset = load(&input, &cache, source.policy(), false).await?;
            let view = build_view(&dataset, &filters);

            log_summary(&view);
            print_pretty(&view);
            match output {
                Some(path) => save_json(&path, &view, pretty)?,
                None => write_json(std::io::stdout().lock(), &view, pretty)?,
            }
        }
        Commands::Export { source, output } => {
            let input = Source::new(&config, &source)?;
            let dataset = load(&input, &cache, source.policy(), false).await?;
            export_records(&output, &dataset.records)?;
        }
        Commands::Explore { source } => {
            let input = Source::new(&config, &source)?;
            explore(&input, &cache, source.policy()).await?;
        }
    }

    Ok(())
}

/// Where a command reads its dataset from, built once per command.
enum Source {
    Upload(UploadSource),
    Live(OpenDataClient),
}

impl Source {
    fn new(config: &Config, args: &SourceArgs) -> Result<Self> {
        match &args.file {
            Some(path) => Ok(Self::Upload(UploadSource::new(path))),
            None => Ok(Self::Live(OpenDataClient::from_config(config)?)),
        }
    }
}

/// Loads the dataset: an uploaded file is read fresh every time, the live
/// endpoint goes through the cache.
#[tracing::instrument(skip_all, fields(refresh = refresh))]
async fn load(
    source: &Source,
    cache: &DatasetCache,
    policy: DerivedPolicy,
    refresh: bool,
) -> Result<Arc<Dataset>> {
    let client = match source {
        Source::Upload(upload) => return Ok(Arc::new(load_dataset(upload, policy).await?)),
        Source::Live(client) => client,
    };

    let key = client.fetch_key();
    let fetch = load_dataset(client, policy);

    if refresh {
        cache.refresh(key, fetch).await
    } else {
        cache.get_or_load(key, fetch).await
    }
}

/// Interactive loop: every filter change recomputes the view from the
/// current snapshot.
async fn explore(source: &Source, cache: &DatasetCache, policy: DerivedPolicy) -> Result<()> {
    let mut filters = Filters::default();
    let mut dataset = match load(source, cache, policy, false).await {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Load failed; use 'refresh' to retry");
            None
        }
    };
    render(dataset.as_deref(), &filters)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "show" => {}
            "reset" => filters = Filters::default(),
            "refresh" => {
                dataset = match load(source, cache, policy, true).await {
                    Ok(dataset) => Some(dataset),
                    Err(e) => {
                        error!(error = %format!("{e:#}"), "Refresh failed");
                        None
                    }
                };
            }
            command => {
                let Some((field, value)) = command.split_once('=') else {
                    warn!(command, "Unknown command");
                    continue;
                };
                if let Err(e) = filters.set(field, value) {
                    warn!(error = %e, "Filter not changed");
                    continue;
                }
            }
        }

        render(dataset.as_deref(), &filters)?;
    }

    info!("Explore session ended");
    Ok(())
}

fn render(dataset: Option<&Dataset>, filters: &Filters) -> Result<()> {
    let Some(dataset) = dataset else {
        warn!("No dataset loaded; nothing to show");
        return Ok(());
    };

    let view: DashboardView = build_view(dataset, filters);
    log_summary(&view);
    write_json(std::io::stdout().lock(), &view, false)
}
