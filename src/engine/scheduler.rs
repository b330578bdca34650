use crate::buffers::ChannelBank;
use crate::core::{AxisRange, ChannelName, ChannelTable, DirtySet, Frame, StreamLayout};
use crate::engine::TickPhase;
use crate::error::{BufferError, PhaseError};
use crate::ingest::{decode, IngestConsumer};
use crate::observability::PipelineMetrics;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Turns queued lines into frames, one call to [`tick`](Self::tick) per
/// timer period.
///
/// Owns every channel buffer; nothing else touches them, so no locking is
/// needed. A tick never waits for input.
pub struct FrameScheduler {
    table: Arc<ChannelTable>,
    bank: ChannelBank,
    consumer: IngestConsumer,
    metrics: Arc<PipelineMetrics>,
    autoscale: Vec<usize>,
    phase: TickPhase,
    tick: u64,
    batch: Vec<String>,
}

impl FrameScheduler {
    pub fn new(
        table: Arc<ChannelTable>,
        window_len: usize,
        consumer: IngestConsumer,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, BufferError> {
        let bank = ChannelBank::new(&table, window_len)?;
        Ok(Self {
            table,
            bank,
            consumer,
            metrics,
            autoscale: Vec::new(),
            phase: TickPhase::Idle,
            tick: 0,
            batch: Vec::new(),
        })
    }

    /// Channels whose range is recomputed every tick. Names not in the
    /// table are ignored and returned.
    pub fn set_autoscale(&mut self, names: &[ChannelName]) -> Vec<ChannelName> {
        let mut unknown = Vec::new();
        self.autoscale.clear();
        for name in names {
            match self.table.index_of_name(name.as_str()) {
                Some(idx) if !self.autoscale.contains(&idx) => self.autoscale.push(idx),
                Some(_) => {}
                None => unknown.push(name.clone()),
            }
        }
        self.autoscale.sort_unstable();
        unknown
    }

    pub fn layout(&self) -> StreamLayout {
        StreamLayout {
            channel_names: self.table.names().to_vec(),
            window_len: self.bank.window_len(),
        }
    }

    /// Drain everything queued, apply it, and describe what changed.
    ///
    /// The drain is not capped: a burst makes this tick proportionally
    /// longer rather than deferring samples.
    pub fn tick(&mut self) -> Result<Frame, PhaseError> {
        let start = self.metrics.start_tick();
        self.tick += 1;

        self.phase.advance(TickPhase::Draining)?;
        self.batch.clear();
        self.batch.extend(self.consumer.drain());
        let drained = self.batch.len();

        self.phase.advance(TickPhase::Decoding)?;
        let mut dirty = DirtySet::new();
        let mut field_errors = 0usize;
        for line in self.batch.drain(..) {
            let outcome = decode(&line, &self.table, &mut self.bank);
            self.metrics.record_decoded(outcome.errors.len());
            for err in &outcome.errors {
                debug!(position = err.position, raw = %err.raw_token, "skipping malformed field");
            }
            field_errors += outcome.errors.len();
            dirty.union_with(outcome.changed);
        }
        if field_errors > 0 {
            warn!(tick = self.tick, field_errors, "skipped malformed fields");
        }

        self.phase.advance(TickPhase::Diffing)?;
        let mut frame = Frame::new(self.tick);
        for idx in dirty.iter() {
            if let Some(snapshot) = self.bank.snapshot(idx) {
                frame.dirty.push(snapshot.name.clone());
                frame.snapshot.push(snapshot);
            }
        }
        frame.ranges = self
            .autoscale
            .iter()
            .filter_map(|&idx| {
                let name = self.table.name(idx)?.clone();
                let range = self.bank.buffer(idx)?.range();
                Some(AxisRange {
                    name,
                    min: range.map(|r| r.0),
                    max: range.map(|r| r.1),
                })
            })
            .collect();

        self.phase.advance(TickPhase::Emitting)?;
        self.metrics.set_queue_depth(self.consumer.len());
        self.metrics.finish_tick(start, drained, !frame.is_empty());
        trace!(tick = self.tick, drained, dirty = frame.dirty.len(), "tick complete");

        self.phase.advance(TickPhase::Idle)?;
        Ok(frame)
    }

    pub fn bank(&self) -> &ChannelBank {
        &self.bank
    }

    pub fn table(&self) -> &ChannelTable {
        &self.table
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
    }
}
