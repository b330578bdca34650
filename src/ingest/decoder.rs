use crate::buffers::ChannelBank;
use crate::core::{ChannelTable, DirtySet, Token, FIELD_SEPARATOR};
use crate::error::FieldParseError;

/// Result of applying one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutcome {
    /// Channels that received a new sample
    pub changed: DirtySet,

    /// Fields that could not be parsed; each was skipped on its own
    pub errors: Vec<FieldParseError>,
}

impl DecodeOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Tokenize `line` and push every mapped numeric field into its channel.
///
/// Field `i` on the wire is position `i`. Position 0 is never mapped, so the
/// leading field is skipped. Missing-markers leave the channel alone.
/// Mapped positions past the end of a short record are treated the same
/// way. A malformed field is reported and skipped without affecting the
/// other fields of the record.
pub fn decode(line: &str, table: &ChannelTable, bank: &mut ChannelBank) -> DecodeOutcome {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut outcome = DecodeOutcome::default();

    for (position, raw) in line.split(FIELD_SEPARATOR).enumerate() {
        let Some(index) = table.index_of(position) else {
            continue;
        };

        match Token::parse(raw) {
            Ok(token) => {
                let Some(buffer) = bank.buffer_mut(index) else {
                    continue;
                };
                buffer.apply(token);
                if let Token::Value(_) = token {
                    outcome.changed.insert(index);
                }
            }
            Err(_) => outcome.errors.push(FieldParseError {
                position,
                raw_token: raw.to_string(),
            }),
        }
    }

    outcome
}
