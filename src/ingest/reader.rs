use super::IngestProducer;
use crate::observability::PipelineMetrics;
use crossbeam_channel::{Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, ErrorKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why the reader loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReaderExit {
    /// The input returned end-of-stream.
    EndOfStream,
    /// A read failed; carries the I/O error text.
    Failed(String),
    /// Shutdown was requested through the pipeline.
    Stopped,
    /// The ingest queue consumer was dropped.
    ConsumerGone,
}

impl ReaderExit {
    pub fn name(&self) -> &str {
        match self {
            Self::EndOfStream => "EndOfStream",
            Self::Failed(_) => "Failed",
            Self::Stopped => "Stopped",
            Self::ConsumerGone => "ConsumerGone",
        }
    }
}

/// Blocking line reader feeding the ingest queue.
///
/// Performs no parsing. Invalid UTF-8 is replaced rather than treated as a
/// read failure, so a corrupt byte costs at most the fields it lands in.
pub struct StreamReader<R> {
    input: R,
    producer: IngestProducer,
    shutdown_rx: Receiver<()>,
    metrics: Arc<PipelineMetrics>,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(
        input: R,
        producer: IngestProducer,
        shutdown_rx: Receiver<()>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            input,
            producer,
            shutdown_rx,
            metrics,
        }
    }

    /// Read until the input ends, fails, or shutdown is requested. The input
    /// is dropped (closed) when this returns.
    pub fn run(mut self) -> ReaderExit {
        let mut buf = Vec::with_capacity(512);

        let exit = loop {
            match self.shutdown_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break ReaderExit::Stopped,
                Err(TryRecvError::Empty) => {}
            }

            buf.clear();
            match self.input.read_until(b'\n', &mut buf) {
                Ok(0) => break ReaderExit::EndOfStream,
                Ok(n) => {
                    self.metrics.record_line_read(n);
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if self.producer.push(line).is_err() {
                        break ReaderExit::ConsumerGone;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "input read failed");
                    break ReaderExit::Failed(e.to_string());
                }
            }
        };

        match &exit {
            ReaderExit::EndOfStream => info!(
                lines = self.metrics.lines_read(),
                "input reached end of stream"
            ),
            other => debug!(exit = other.name(), "stream reader stopped"),
        }
        exit
    }
}
