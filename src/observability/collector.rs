use super::PipelineMetrics;
use serde::{Deserialize, Serialize};

/// Plain-value copy of [`PipelineMetrics`] at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub bytes_read: u64,
    pub records_decoded: u64,
    pub field_errors: u64,
    pub ticks: u64,
    pub empty_ticks: u64,
    pub largest_drain: usize,
    pub queue_depth: usize,
    pub avg_tick_latency_us: u64,
}

impl MetricsSnapshot {
    pub fn capture(metrics: &PipelineMetrics) -> Self {
        Self {
            lines_read: metrics.lines_read(),
            bytes_read: metrics.bytes_read(),
            records_decoded: metrics.records_decoded(),
            field_errors: metrics.field_errors(),
            ticks: metrics.ticks(),
            empty_ticks: metrics.empty_ticks(),
            largest_drain: metrics.largest_drain(),
            queue_depth: metrics.queue_depth(),
            avg_tick_latency_us: metrics.avg_tick_latency_us(),
        }
    }

    /// Lines read but not yet decoded.
    pub fn backlog(&self) -> u64 {
        self.lines_read.saturating_sub(self.records_decoded)
    }
}
