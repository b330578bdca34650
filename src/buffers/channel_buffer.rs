use crate::core::Token;
use crate::error::BufferError;

/// Fixed-length sliding window of optional samples for one channel.
///
/// The window always holds exactly `capacity` slots. Slots that have never
/// been written are absent (`None`). Pushing overwrites the oldest slot.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    slots: Box<[Option<f64>]>,
    /// Next slot to write; also the oldest slot in the window.
    head: usize,
    pushed: u64,
}

impl ChannelBuffer {
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        Ok(Self {
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            pushed: 0,
        })
    }

    /// Append `value`, evicting the oldest sample.
    pub fn push(&mut self, value: f64) {
        self.slots[self.head] = Some(value);
        self.head = (self.head + 1) % self.slots.len();
        self.pushed += 1;
    }

    /// Missing-marker for this channel: contents and ring position stay as
    /// they are.
    #[inline]
    pub fn skip(&mut self) {}

    pub fn apply(&mut self, token: Token) {
        match token {
            Token::Value(v) => self.push(v),
            Token::Missing => self.skip(),
        }
    }

    /// Chronological copy of the window, oldest first. Length is always
    /// `capacity()`.
    pub fn snapshot(&self) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(self.slots.len());
        out.extend_from_slice(&self.slots[self.head..]);
        out.extend_from_slice(&self.slots[..self.head]);
        out
    }

    /// Chronological iterator over the window without copying.
    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.slots[self.head..]
            .iter()
            .chain(self.slots[..self.head].iter())
            .copied()
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<f64> {
        let last = (self.head + self.slots.len() - 1) % self.slots.len();
        self.slots[last]
    }

    /// `(min, max)` over present, finite samples.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.slots
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Window length. Equal to `capacity()` at all times.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Total samples pushed over the buffer's lifetime.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(ChannelBuffer::new(0).unwrap_err(), BufferError::ZeroCapacity);
    }

    #[test]
    fn test_starts_absent() {
        let buffer = ChannelBuffer::new(4).unwrap();
        assert_eq!(buffer.snapshot(), vec![None; 4]);
        assert_eq!(buffer.latest(), None);
        assert_eq!(buffer.range(), None);
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let mut buffer = ChannelBuffer::new(3).unwrap();
        for v in 1..=7 {
            buffer.push(v as f64);
        }
        assert_eq!(buffer.snapshot(), vec![Some(5.0), Some(6.0), Some(7.0)]);
        assert_eq!(buffer.iter().collect::<Vec<_>>(), buffer.snapshot());
        assert_eq!(buffer.latest(), Some(7.0));
        assert_eq!(buffer.pushed(), 7);
    }

    #[test]
    fn test_range_ignores_non_finite() {
        let mut buffer = ChannelBuffer::new(4).unwrap();
        buffer.push(f64::NAN);
        buffer.push(-2.0);
        buffer.push(f64::INFINITY);
        buffer.push(3.0);
        assert_eq!(buffer.range(), Some((-2.0, 3.0)));
    }
}
