use crate::core::ChannelName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Fixed axes of the vehicle layout, grouped by panel.
const VEHICLE_FIXED: &[(&[&str], f64, f64)] = &[
    (&["mode"], -0.5, 5.5),
    (&["voltage"], 0.0, 15.0),
    (&["pressure"], 380.0, 420.0),
    (&["temp"], -5.0, 35.0),
    (&["pr0", "pr1", "pr2", "pr3", "pr4"], 0.0, 10000.0),
    (&["u", "v", "w"], -3.0, 3.0),
    (&["X", "Y", "Z"], -5.0, 5.0),
    (&["ae1", "ae2", "ae3", "ae4"], 0.0, 1000.0),
    (&["phi", "theta", "psi"], -PI, PI),
    (&["p", "q", "r"], -PI, PI),
    (&["L", "M", "N"], -10.0, 10.0),
    (&["sp", "sq", "sr"], -2.0 * PI, 2.0 * PI),
    (&["sax", "say", "saz"], -2.1, 2.1),
    (&["sphi", "stheta", "spsi"], -PI, PI),
];

/// How a channel's value axis is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePolicy {
    Fixed { min: f64, max: f64 },
    Autoscale,
}

/// Per-channel scale policies. Channels without an entry are left to the
/// renderer's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleMap(BTreeMap<ChannelName, ScalePolicy>);

impl ScaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Autoscale on the position and set-point channels, fixed axes for
    /// everything else in the vehicle layout.
    pub fn vehicle() -> Self {
        let mut map = Self::autoscaled(["x", "y", "z", "lift", "roll", "pitch", "yaw"]);
        for (names, min, max) in VEHICLE_FIXED {
            for name in names.iter() {
                map.set(
                    *name,
                    ScalePolicy::Fixed {
                        min: *min,
                        max: *max,
                    },
                );
            }
        }
        map
    }

    pub fn autoscaled<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChannelName>,
    {
        let mut map = Self::new();
        for name in names {
            map.set(name, ScalePolicy::Autoscale);
        }
        map
    }

    pub fn set(&mut self, name: impl Into<ChannelName>, policy: ScalePolicy) {
        self.0.insert(name.into(), policy);
    }

    pub fn get(&self, name: &str) -> Option<ScalePolicy> {
        self.0.get(name).copied()
    }

    pub fn autoscale_channels(&self) -> Vec<ChannelName> {
        self.0
            .iter()
            .filter(|(_, p)| matches!(p, ScalePolicy::Autoscale))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &ChannelName> + '_ {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_autoscale_entries_reported() {
        let mut scales = ScaleMap::autoscaled(["x", "pitch"]);
        scales.set("voltage", ScalePolicy::Fixed { min: 0.0, max: 15.0 });
        let auto: Vec<String> = scales
            .autoscale_channels()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(auto, vec!["pitch", "x"]);
        assert_eq!(
            scales.get("voltage"),
            Some(ScalePolicy::Fixed { min: 0.0, max: 15.0 })
        );
    }

    #[test]
    fn test_policy_json_shape() {
        let fixed = ScalePolicy::Fixed { min: -1.0, max: 1.0 };
        assert_eq!(
            serde_json::to_string(&fixed).unwrap(),
            r#"{"fixed":{"min":-1.0,"max":1.0}}"#
        );
        assert_eq!(
            serde_json::to_string(&ScalePolicy::Autoscale).unwrap(),
            r#""autoscale""#
        );
    }

    #[test]
    fn test_vehicle_scales_cover_the_table() {
        let scales = ScaleMap::vehicle();
        let table = crate::core::ChannelTable::vehicle();
        for (_, name) in table.entries() {
            assert!(scales.get(name.as_str()).is_some(), "no scale for {}", name);
        }
        assert_eq!(scales.names().count(), table.len());
        assert_eq!(scales.autoscale_channels().len(), 7);
        assert_eq!(
            scales.get("voltage"),
            Some(ScalePolicy::Fixed { min: 0.0, max: 15.0 })
        );
        assert_eq!(
            scales.get("sr"),
            Some(ScalePolicy::Fixed {
                min: -2.0 * PI,
                max: 2.0 * PI
            })
        );
        assert_eq!(scales.get("z"), Some(ScalePolicy::Autoscale));
    }
}
