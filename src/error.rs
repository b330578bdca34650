//! Typed errors for the library.
//!
//! Each concern gets its own small enum so callers can match on what went
//! wrong without string inspection. The host binary wraps these in
//! `anyhow::Error` with context, the same way the rest of the crate reports
//! failures upward.

use thiserror::Error;

/// Invalid channel table specification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("position 0 is reserved and cannot be mapped (channel '{name}')")]
    ReservedPosition { name: String },

    #[error("position {position} is outside the field space 0..{limit}")]
    PositionOutOfRange { position: usize, limit: usize },

    #[error("position {position} is mapped twice ('{first}' and '{second}')")]
    DuplicatePosition {
        position: usize,
        first: String,
        second: String,
    },

    #[error("channel name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("channel at position {0} has an empty name")]
    EmptyName(usize),
}

/// Invalid channel buffer construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("channel window length must be at least 1")]
    ZeroCapacity,
}

/// One malformed numeric token inside an otherwise decodable record.
///
/// Recovered locally: the field is skipped and the rest of the record is
/// still applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field {position}: cannot parse {raw_token:?} as a number")]
pub struct FieldParseError {
    pub position: usize,
    pub raw_token: String,
}

/// The consumer half of the ingest queue has been dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ingest queue consumer has been dropped")]
pub struct IngestClosed;

/// Illegal step in the per-tick state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid tick phase transition: {from} -> {to}")]
pub struct PhaseError {
    pub from: &'static str,
    pub to: &'static str,
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid channel table: {0}")]
    Table(#[from] TableError),

    #[error("{0}")]
    Invalid(String),
}
