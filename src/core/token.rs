use std::num::ParseFloatError;

/// Wire text of the missing-marker.
pub const MISSING_MARKER: &str = "NaN";

/// One decoded field of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// No new value for this channel in this record.
    Missing,
    Value(f64),
}

impl Token {
    /// Classify a raw field.
    ///
    /// Surrounding whitespace is ignored. The missing-marker is the
    /// case-sensitive text `NaN`; everything else must parse as an `f64`.
    /// Rust's float grammar also accepts spellings such as `inf` or `nan`,
    /// which therefore arrive as values.
    pub fn parse(raw: &str) -> Result<Self, ParseFloatError> {
        let raw = raw.trim();
        if raw == MISSING_MARKER {
            return Ok(Token::Missing);
        }
        raw.parse::<f64>().map(Token::Value)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Token::Missing => None,
            Token::Value(v) => Some(v),
        }
    }
}

impl From<Option<f64>> for Token {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Token::Missing, Token::Value)
    }
}
