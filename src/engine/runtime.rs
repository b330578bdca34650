use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::engine::{FrameScheduler, PipelineState};
use crate::ingest::{IngestPipeline, ReaderExit};
use crate::observability::{MetricsSnapshot, PipelineMetrics};
use crate::render::Renderer;

/// What the host does once the input has ended and the queue is flushed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEndPolicy {
    /// End the run.
    #[default]
    Exit,
    /// Keep ticking so the last window stays presented, until interrupted.
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    StreamEnded,
    ReadFailed(String),
    Interrupted,
    OutputClosed,
    ReaderStopped,
    ConsumerGone,
}

impl From<ReaderExit> for StopReason {
    fn from(exit: ReaderExit) -> Self {
        match exit {
            ReaderExit::EndOfStream => StopReason::StreamEnded,
            ReaderExit::Failed(e) => StopReason::ReadFailed(e),
            ReaderExit::Stopped => StopReason::ReaderStopped,
            ReaderExit::ConsumerGone => StopReason::ConsumerGone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reason: StopReason,
    /// How the reader ended, if it ended before the run did
    pub reader_exit: Option<ReaderExit>,
    pub ticks: u64,
    pub metrics: MetricsSnapshot,
}

impl RunOutcome {
    pub fn read_failed(&self) -> bool {
        matches!(self.reader_exit, Some(ReaderExit::Failed(_)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub tick_interval: Duration,
    pub on_stream_end: StreamEndPolicy,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            on_stream_end: StreamEndPolicy::Exit,
        }
    }
}

/// Drives the scheduler from a fixed-period timer and feeds a renderer.
pub struct ScopeRuntime<R> {
    ingest: IngestPipeline,
    scheduler: FrameScheduler,
    renderer: R,
    options: RuntimeOptions,
    metrics: Arc<PipelineMetrics>,
    state: PipelineState,
}

impl<R: Renderer> ScopeRuntime<R> {
    pub fn new(
        ingest: IngestPipeline,
        scheduler: FrameScheduler,
        renderer: R,
        metrics: Arc<PipelineMetrics>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            ingest,
            scheduler,
            renderer,
            options,
            metrics,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn transition_to(&mut self, new_state: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid state transition: {} -> {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    /// Run until the input ends (per policy), the output closes, or Ctrl-C.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("cannot listen for Ctrl-C; run ends with the input only");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Like [`run`](Self::run) but ends when `shutdown` resolves instead of
    /// on Ctrl-C.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<RunOutcome>
    where
        F: Future<Output = ()>,
    {
        let autoscale = self.renderer.autoscale_channels();
        for name in self.scheduler.set_autoscale(&autoscale) {
            warn!(channel = %name, "autoscale channel is not in the table");
        }

        let layout = self.scheduler.layout();
        self.renderer
            .start(&layout)
            .await
            .context("Renderer failed to start")?;

        let started = Instant::now();
        self.transition_to(PipelineState::Running {
            start_time: Some(started),
            ticks: 0,
        })?;
        info!(
            channels = layout.channel_names.len(),
            window = layout.window_len,
            interval_ms = self.options.tick_interval.as_millis() as u64,
            "scope running"
        );

        let mut interval = tokio::time::interval(self.options.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut reader_exit: Option<ReaderExit> = None;

        let reason = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    self.ingest.stop();
                    break StopReason::Interrupted;
                }
                _ = interval.tick() => {}
            }

            if reader_exit.is_none() {
                if let Some(exit) = self.ingest.poll_exit() {
                    if let ReaderExit::Failed(ref e) = exit {
                        warn!(error = %e, "input failed; treating as end of stream");
                    }
                    // Everything the reader produced is queued by now.
                    self.transition_to(PipelineState::Draining)?;
                    self.emit_tick().await?;
                    reader_exit = Some(exit.clone());

                    match self.options.on_stream_end {
                        StreamEndPolicy::Exit => break StopReason::from(exit),
                        StreamEndPolicy::Hold => {
                            info!("input ended; holding last window until interrupted");
                            self.transition_to(PipelineState::Holding {
                                ticks: self.scheduler.ticks(),
                            })?;
                        }
                    }
                    if self.renderer.is_closed() {
                        break StopReason::OutputClosed;
                    }
                    continue;
                }
            }

            self.emit_tick().await?;
            if self.renderer.is_closed() {
                self.ingest.stop();
                break StopReason::OutputClosed;
            }
        };

        self.renderer
            .finish()
            .await
            .context("Renderer failed to finish")?;

        let ticks = self.scheduler.ticks();
        self.transition_to(PipelineState::Stopped {
            duration: Some(started.elapsed()),
            total_ticks: ticks,
        })?;

        Ok(RunOutcome {
            reason,
            reader_exit,
            ticks,
            metrics: MetricsSnapshot::capture(&self.metrics),
        })
    }

    async fn emit_tick(&mut self) -> Result<()> {
        let frame = self.scheduler.tick()?;
        self.renderer
            .render(&frame)
            .await
            .with_context(|| format!("Renderer failed on tick {}", frame.tick))?;

        let ticks = self.scheduler.ticks();
        match &mut self.state {
            PipelineState::Running { ticks: t, .. } | PipelineState::Holding { ticks: t } => {
                *t = ticks
            }
            _ => {}
        }
        Ok(())
    }
}
