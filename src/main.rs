//! telemscope: live view over a tab-separated telemetry stream.
//!
//! Reads records from stdin, keeps a sliding window per channel and emits
//! one frame per tick describing which channels changed.
//!
//! ```bash
//! synth_feed --rate-hz 200 | telemscope --output json > frames.jsonl
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use telemscope::config::{LogFormat, ScopeConfig};
use telemscope::engine::{FrameScheduler, RunOutcome, ScopeRuntime, StopReason, StreamEndPolicy};
use telemscope::ingest::IngestPipeline;
use telemscope::logging;
use telemscope::observability::{PipelineMetrics, PipelineMonitor};
use telemscope::render::{JsonLinesRenderer, NullRenderer, Renderer};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// One JSON object per line on stdout
    Json,
    /// Discard frames (metrics only)
    None,
}

#[derive(Parser)]
#[command(name = "telemscope")]
#[command(about = "Sliding-window scope over a line-oriented telemetry stream", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Samples kept per channel
    #[arg(long)]
    window: Option<usize>,

    #[arg(long, value_enum, default_value = "json")]
    output: OutputKind,

    /// Keep the last window after the input ends, until Ctrl-C
    #[arg(long)]
    hold: bool,

    /// Exit with status 1 if reading the input fails
    #[arg(long)]
    fail_on_read_error: bool,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Compact,
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    fn apply(&self, config: &mut ScopeConfig) {
        if let Some(ms) = self.tick_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(window) = self.window {
            config.window_len = window;
        }
        if self.hold {
            config.on_stream_end = StreamEndPolicy::Hold;
        }
        if self.fail_on_read_error {
            config.fail_on_read_error = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format.into();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScopeConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScopeConfig::default(),
    };
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    logging::init(&config.logging)?;

    let outcome = match cli.output {
        OutputKind::Json => {
            let renderer = JsonLinesRenderer::new(tokio::io::stdout(), config.scales())
                .with_empty_frames(config.write_empty_frames);
            run_scope(&config, renderer).await?
        }
        OutputKind::None => run_scope(&config, NullRenderer::new(config.scales())).await?,
    };

    Ok(exit_code(&config, &outcome))
}

async fn run_scope<R: Renderer>(config: &ScopeConfig, renderer: R) -> Result<RunOutcome> {
    let table = Arc::new(config.table()?);
    let metrics = Arc::new(PipelineMetrics::new());

    let (ingest, consumer) =
        IngestPipeline::spawn(BufReader::new(std::io::stdin()), metrics.clone())
            .context("Failed to start stream reader")?;
    let scheduler = FrameScheduler::new(table, config.window_len, consumer, metrics.clone())?;

    let mut runtime = ScopeRuntime::new(
        ingest,
        scheduler,
        renderer,
        metrics.clone(),
        config.runtime_options(),
    );
    let outcome = runtime.run().await?;

    info!(reason = ?outcome.reason, ticks = outcome.ticks, "scope stopped");
    info!("\n{}", PipelineMonitor::new(metrics).generate_report());
    Ok(outcome)
}

fn exit_code(config: &ScopeConfig, outcome: &RunOutcome) -> ExitCode {
    if let StopReason::ReadFailed(e) = &outcome.reason {
        error!(error = %e, "input stream failed");
    } else if outcome.read_failed() {
        error!("input stream failed before the run ended");
    }

    if outcome.read_failed() && config.fail_on_read_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
