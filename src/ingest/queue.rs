use crate::error::IngestClosed;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Create the unbounded line queue between the reader thread and the
/// scheduler.
///
/// There is no backpressure: if decoding falls behind, the queue grows.
pub fn ingest_queue() -> (IngestProducer, IngestConsumer) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (IngestProducer { tx }, IngestConsumer { rx })
}

/// Writing half, owned by the stream reader.
#[derive(Debug, Clone)]
pub struct IngestProducer {
    tx: Sender<String>,
}

impl IngestProducer {
    /// Enqueue one raw line. Never blocks; fails only once the consumer is
    /// gone.
    pub fn push(&self, line: String) -> Result<(), IngestClosed> {
        self.tx.send(line).map_err(|_| IngestClosed)
    }
}

/// Reading half, owned by the frame scheduler.
#[derive(Debug)]
pub struct IngestConsumer {
    rx: Receiver<String>,
}

impl IngestConsumer {
    /// Next queued line, or `None` when nothing is queued right now.
    pub fn try_pop(&self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Pop until the queue reports empty, in insertion order.
    pub fn drain(&self) -> impl Iterator<Item = String> + '_ {
        self.rx.try_iter()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let (tx, rx) = ingest_queue();
        for i in 0..5 {
            tx.push(format!("line {}", i)).unwrap();
        }
        assert_eq!(rx.len(), 5);
        assert_eq!(rx.try_pop().as_deref(), Some("line 0"));
        let rest: Vec<String> = rx.drain().collect();
        assert_eq!(rest, vec!["line 1", "line 2", "line 3", "line 4"]);
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (tx, rx) = ingest_queue();
        drop(rx);
        assert_eq!(tx.push("x".to_string()), Err(IngestClosed));
    }
}
