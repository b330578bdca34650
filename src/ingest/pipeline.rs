use super::{ingest_queue, IngestConsumer, ReaderExit, StreamReader};
use crate::observability::PipelineMetrics;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Owns the reader thread and its control channels.
///
/// The host decides what a reader exit means: [`poll_exit`](Self::poll_exit)
/// reports it once, and nothing here terminates the process.
pub struct IngestPipeline {
    shutdown_tx: Sender<()>,
    exit_rx: Receiver<ReaderExit>,
    handle: Option<JoinHandle<()>>,
    exit_reported: bool,
}

impl IngestPipeline {
    /// Start the reader thread over `input`.
    ///
    /// Returns the pipeline handle and the consumer end of the ingest queue,
    /// which belongs to whoever drives the scheduler.
    pub fn spawn<R>(input: R, metrics: Arc<PipelineMetrics>) -> io::Result<(Self, IngestConsumer)>
    where
        R: BufRead + Send + 'static,
    {
        let (producer, consumer) = ingest_queue();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let (exit_tx, exit_rx) = crossbeam_channel::bounded(1);

        let reader = StreamReader::new(input, producer, shutdown_rx, metrics);
        let handle = thread::Builder::new()
            .name("stream-reader".to_string())
            .spawn(move || {
                // Every line has been pushed before the exit is published.
                let exit = reader.run();
                let _ = exit_tx.send(exit);
            })?;

        Ok((
            Self {
                shutdown_tx,
                exit_rx,
                handle: Some(handle),
                exit_reported: false,
            },
            consumer,
        ))
    }

    /// Ask the reader to stop. A reader blocked inside a read notices after
    /// that read returns.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.try_send(());
    }

    /// Non-blocking check for reader exit. Reports each exit exactly once.
    pub fn poll_exit(&mut self) -> Option<ReaderExit> {
        if self.exit_reported {
            return None;
        }
        match self.exit_rx.try_recv() {
            Ok(exit) => {
                self.exit_reported = true;
                Some(exit)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.exit_reported = true;
                Some(ReaderExit::Failed(
                    "reader thread ended without reporting".to_string(),
                ))
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Block until the reader thread ends and return its exit, unless it
    /// was already reported by `poll_exit`.
    pub fn join(mut self) -> Option<ReaderExit> {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("stream reader thread panicked");
            }
        }
        self.poll_exit()
    }
}

impl Drop for IngestPipeline {
    fn drop(&mut self) {
        // The thread may be parked in a blocking read; signal and detach.
        self.stop();
    }
}
