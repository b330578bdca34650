use crate::core::ChannelName;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of one channel window, oldest sample first.
///
/// Serialized samples are `null` for an absent slot, a number for a finite
/// value, and one of the strings `"NaN"`, `"inf"`, `"-inf"` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub name: ChannelName,
    #[serde(with = "sample_encoding")]
    pub samples: Vec<Option<f64>>,
}

/// Current value range of an autoscaled channel. `None` bounds mean the
/// window holds no finite sample yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub name: ChannelName,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Sent to the presentation layer once, before the first frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamLayout {
    pub channel_names: Vec<ChannelName>,
    pub window_len: usize,
}

/// Output of one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Sequential tick number, starting at 1
    pub tick: u64,

    /// Channels that received a value this tick, in table order
    pub dirty: Vec<ChannelName>,

    /// One window per dirty channel, same order as `dirty`
    pub snapshot: Vec<ChannelSnapshot>,

    /// Ranges of the autoscale channels, refreshed every tick
    pub ranges: Vec<AxisRange>,
}

impl Frame {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// True when no channel changed this tick.
    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.iter().any(|n| n.as_str() == name)
    }

    pub fn samples(&self, name: &str) -> Option<&[Option<f64>]> {
        self.snapshot
            .iter()
            .find(|s| s.name.as_str() == name)
            .map(|s| s.samples.as_slice())
    }

    pub fn range(&self, name: &str) -> Option<&AxisRange> {
        self.ranges.iter().find(|r| r.name.as_str() == name)
    }
}

mod sample_encoding {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INF: &str = "inf";
    const NEG_INF: &str = "-inf";

    pub fn serialize<S>(samples: &[Option<f64>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(samples.len()))?;
        for sample in samples {
            match sample {
                None => seq.serialize_element(&None::<f64>)?,
                Some(v) if v.is_finite() => seq.serialize_element(v)?,
                Some(v) if v.is_nan() => seq.serialize_element(NAN)?,
                Some(v) if *v > 0.0 => seq.serialize_element(INF)?,
                Some(_) => seq.serialize_element(NEG_INF)?,
            }
        }
        seq.end()
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<Option<Wire>>::deserialize(deserializer)?
            .into_iter()
            .map(|sample| match sample {
                None => Ok(None),
                Some(Wire::Number(v)) => Ok(Some(v)),
                Some(Wire::Text(t)) => match t.as_str() {
                    NAN => Ok(Some(f64::NAN)),
                    INF => Ok(Some(f64::INFINITY)),
                    NEG_INF => Ok(Some(f64::NEG_INFINITY)),
                    other => Err(D::Error::custom(format!("unknown sample text {:?}", other))),
                },
            })
            .collect()
    }
}
