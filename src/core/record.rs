use crate::core::token::MISSING_MARKER;
use std::fmt::Write;

/// Field separator on the wire.
pub const FIELD_SEPARATOR: char = '\t';

/// Render one record line.
///
/// `fields[i]` is written as field `i`, i.e. at position `i`. Absent fields
/// become the missing-marker. The line ends in `\n`.
pub fn encode_record(fields: &[Option<f64>]) -> String {
    let mut line = String::with_capacity(fields.len() * 8 + 1);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(FIELD_SEPARATOR);
        }
        match field {
            // Writing into a String cannot fail.
            Some(value) => {
                let _ = write!(line, "{}", value);
            }
            None => line.push_str(MISSING_MARKER),
        }
    }
    line.push('\n');
    line
}

/// Builder for records addressed by field position.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    fields: Vec<Option<f64>>,
}

impl RecordBuilder {
    /// A record with positions `0..=last_position`, all absent.
    pub fn new(last_position: usize) -> Self {
        Self {
            fields: vec![None; last_position + 1],
        }
    }

    /// Set the value at `position`. Positions past the end are ignored.
    pub fn set(&mut self, position: usize, value: f64) -> &mut Self {
        if let Some(slot) = self.fields.get_mut(position) {
            *slot = Some(value);
        }
        self
    }

    pub fn clear(&mut self, position: usize) -> &mut Self {
        if let Some(slot) = self.fields.get_mut(position) {
            *slot = None;
        }
        self
    }

    pub fn clear_all(&mut self) -> &mut Self {
        self.fields.iter_mut().for_each(|f| *f = None);
        self
    }

    pub fn encode(&self) -> String {
        encode_record(&self.fields)
    }
}
