use telemscope::buffers::{ChannelBank, ChannelBuffer};
use telemscope::core::{ChannelSpec, ChannelTable, Token};
use telemscope::error::BufferError;

#[test]
fn test_snapshot_length_is_fixed() {
    let mut buffer = ChannelBuffer::new(5).unwrap();
    assert_eq!(buffer.snapshot().len(), 5);

    for i in 0..13 {
        if i % 3 == 0 {
            buffer.skip();
        } else {
            buffer.push(i as f64);
        }
        assert_eq!(buffer.snapshot().len(), 5);
    }
}

#[test]
fn test_fifo_eviction() {
    let n = 4;
    let mut buffer = ChannelBuffer::new(n).unwrap();
    for v in 1..=(n + 1) {
        buffer.push(v as f64);
    }

    let expected: Vec<Option<f64>> = (2..=(n + 1)).map(|v| Some(v as f64)).collect();
    assert_eq!(buffer.snapshot(), expected);
    assert_eq!(buffer.latest(), Some(5.0));
    assert_eq!(buffer.pushed(), 5);
}

#[test]
fn test_missing_marker_carries_forward() {
    let mut buffer = ChannelBuffer::new(3).unwrap();
    buffer.push(7.5);
    let before = buffer.snapshot();

    buffer.apply(Token::Missing);
    assert_eq!(buffer.snapshot(), before);
    buffer.apply(Token::Missing);
    assert_eq!(buffer.snapshot(), before);

    assert_eq!(before, vec![None, None, Some(7.5)]);
    assert_eq!(buffer.pushed(), 1);
}

#[test]
fn test_partial_window_is_padded_at_the_front() {
    let mut buffer = ChannelBuffer::new(4).unwrap();
    buffer.push(1.0);
    buffer.push(2.0);
    assert_eq!(buffer.snapshot(), vec![None, None, Some(1.0), Some(2.0)]);
    assert_eq!(buffer.iter().collect::<Vec<_>>(), buffer.snapshot());
}

#[test]
fn test_range_ignores_absent_and_non_finite() {
    let mut buffer = ChannelBuffer::new(5).unwrap();
    assert_eq!(buffer.range(), None);

    buffer.push(3.0);
    buffer.push(f64::INFINITY);
    buffer.push(-1.5);
    assert_eq!(buffer.range(), Some((-1.5, 3.0)));
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(ChannelBuffer::new(0).unwrap_err(), BufferError::ZeroCapacity);
}

#[test]
fn test_bank_has_one_buffer_per_channel() {
    let table = ChannelTable::new(&[
        ChannelSpec::new(3, "alpha"),
        ChannelSpec::new(1, "beta"),
    ])
    .unwrap();
    let bank = ChannelBank::new(&table, 8).unwrap();

    assert_eq!(bank.len(), 2);
    assert_eq!(bank.window_len(), 8);
    assert_eq!(bank.get("alpha").unwrap().capacity(), 8);
    assert!(bank.get("gamma").is_none());
    assert_eq!(bank.snapshot(0).unwrap().samples.len(), 8);
}
