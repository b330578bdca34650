use super::{MetricsSnapshot, PipelineMetrics};
use std::sync::Arc;

pub struct PipelineMonitor {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMonitor {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::capture(&self.metrics)
    }

    pub fn generate_report(&self) -> String {
        let s = self.snapshot();

        let mut report = String::from("=== Pipeline Metrics ===\n");
        report.push_str(&format!(
            "  Input: {} lines ({} bytes)\n  Decoded: {} records, {}\n  Ticks: {} ({} empty)\n  Largest drain: {} lines\n  Avg tick: {}μs\n  Queue depth: {}\n",
            s.lines_read,
            s.bytes_read,
            s.records_decoded,
            if s.field_errors > 0 {
                format!("{} field error{}", s.field_errors, if s.field_errors == 1 { "" } else { "s" })
            } else {
                "0 field errors".to_string()
            },
            s.ticks,
            s.empty_ticks,
            s.largest_drain,
            s.avg_tick_latency_us,
            s.queue_depth,
        ));

        report
    }
}
