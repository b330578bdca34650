use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Counters shared between the reader thread and the scheduler.
///
/// Relaxed ordering throughout: values are observational and never used to
/// synchronise other memory.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    lines_read: AtomicU64,
    bytes_read: AtomicU64,
    records_decoded: AtomicU64,
    field_errors: AtomicU64,
    ticks: AtomicU64,
    empty_ticks: AtomicU64,
    largest_drain: AtomicUsize,
    queue_depth: AtomicUsize,
    total_tick_latency_us: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line_read(&self, bytes: usize) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_decoded(&self, field_errors: usize) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
        if field_errors > 0 {
            self.field_errors
                .fetch_add(field_errors as u64, Ordering::Relaxed);
        }
    }

    pub fn start_tick(&self) -> Instant {
        Instant::now()
    }

    /// Close out one tick that drained `drained` lines.
    pub fn finish_tick(&self, start: Instant, drained: usize, dirty: bool) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_tick_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if !dirty {
            self.empty_ticks.fetch_add(1, Ordering::Relaxed);
        }
        self.largest_drain.fetch_max(drained, Ordering::Relaxed);
    }

    pub fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    pub fn records_decoded(&self) -> u64 {
        self.records_decoded.load(Ordering::Relaxed)
    }

    pub fn field_errors(&self) -> u64 {
        self.field_errors.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn empty_ticks(&self) -> u64 {
        self.empty_ticks.load(Ordering::Relaxed)
    }

    pub fn largest_drain(&self) -> usize {
        self.largest_drain.load(Ordering::Relaxed)
    }

    /// Lines waiting in the ingest queue as of the last tick.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::Relaxed)
    }

    pub fn avg_tick_latency_us(&self) -> u64 {
        let ticks = self.ticks();
        if ticks == 0 {
            return 0;
        }
        self.total_tick_latency_us.load(Ordering::Relaxed) / ticks
    }
}
