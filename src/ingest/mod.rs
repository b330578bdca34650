pub mod decoder;
pub mod pipeline;
pub mod queue;
pub mod reader;

pub use decoder::{decode, DecodeOutcome};
pub use pipeline::IngestPipeline;
pub use queue::{ingest_queue, IngestConsumer, IngestProducer};
pub use reader::{ReaderExit, StreamReader};
