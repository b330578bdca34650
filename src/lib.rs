pub mod buffers;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod observability;
pub mod render;

pub use config::ScopeConfig;
pub use engine::{FrameScheduler, ScopeRuntime};
pub use ingest::IngestPipeline;
