use crate::core::ChannelName;
use crate::error::TableError;
use serde::{Deserialize, Serialize};

/// Size of the record field space. Positions run `0..FIELD_POSITIONS`.
pub const FIELD_POSITIONS: usize = 64;

/// One `position -> channel` entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub position: usize,
    pub name: String,
}

impl ChannelSpec {
    pub fn new(position: usize, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }
}

/// Immutable mapping from record field positions to channels.
///
/// Channels are numbered in ascending position order; that index is what
/// buffers and dirty sets are keyed by.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    slots: [Option<u8>; FIELD_POSITIONS],
    names: Vec<ChannelName>,
    positions: Vec<usize>,
}

impl ChannelTable {
    pub fn new(specs: &[ChannelSpec]) -> Result<Self, TableError> {
        let mut sorted: Vec<&ChannelSpec> = specs.iter().collect();
        sorted.sort_by_key(|s| s.position);

        let mut slots = [None; FIELD_POSITIONS];
        let mut names: Vec<ChannelName> = Vec::with_capacity(sorted.len());
        let mut positions = Vec::with_capacity(sorted.len());

        for spec in sorted {
            if spec.name.is_empty() {
                return Err(TableError::EmptyName(spec.position));
            }
            if spec.position == 0 {
                return Err(TableError::ReservedPosition {
                    name: spec.name.clone(),
                });
            }
            if spec.position >= FIELD_POSITIONS {
                return Err(TableError::PositionOutOfRange {
                    position: spec.position,
                    limit: FIELD_POSITIONS,
                });
            }
            if let Some(existing) = slots[spec.position] {
                return Err(TableError::DuplicatePosition {
                    position: spec.position,
                    first: names[existing as usize].to_string(),
                    second: spec.name.clone(),
                });
            }
            if names.iter().any(|n| n.as_str() == spec.name) {
                return Err(TableError::DuplicateName(spec.name.clone()));
            }

            // Position 0 is reserved, so at most 63 channels: the index fits in u8.
            slots[spec.position] = Some(names.len() as u8);
            names.push(ChannelName::new(&spec.name));
            positions.push(spec.position);
        }

        Ok(Self {
            slots,
            names,
            positions,
        })
    }

    /// Channel fed by `position`, if any. Unmapped and out-of-range
    /// positions are not errors.
    pub fn lookup(&self, position: usize) -> Option<&ChannelName> {
        self.index_of(position).map(|idx| &self.names[idx])
    }

    pub fn index_of(&self, position: usize) -> Option<usize> {
        self.slots.get(position).copied().flatten().map(usize::from)
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.index_of_name(name).map(|idx| self.positions[idx])
    }

    pub fn name(&self, index: usize) -> Option<&ChannelName> {
        self.names.get(index)
    }

    /// Channel names in table order (ascending position).
    pub fn names(&self) -> &[ChannelName] {
        &self.names
    }

    /// Highest mapped position, or 0 for an empty table.
    pub fn max_position(&self) -> usize {
        self.positions.last().copied().unwrap_or(0)
    }

    /// `(position, name)` pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &ChannelName)> + '_ {
        self.positions.iter().copied().zip(self.names.iter())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Field layout of the quadcopter ground-station log.
    ///
    /// Position 0 carries the board timestamp and 37..=39 the trim gains;
    /// neither is plotted.
    pub fn vehicle() -> Self {
        const VEHICLE: &[(usize, &str)] = &[
            (1, "mode"),
            (2, "lift"),
            (3, "roll"),
            (4, "pitch"),
            (5, "yaw"),
            (6, "ae1"),
            (7, "ae2"),
            (8, "ae3"),
            (9, "ae4"),
            (10, "sp"),
            (11, "sq"),
            (12, "sr"),
            (13, "sax"),
            (14, "say"),
            (15, "saz"),
            (16, "temp"),
            (17, "pressure"),
            (18, "voltage"),
            (19, "x"),
            (20, "y"),
            (21, "z"),
            (22, "phi"),
            (23, "theta"),
            (24, "psi"),
            (25, "X"),
            (26, "Y"),
            (27, "Z"),
            (28, "L"),
            (29, "M"),
            (30, "N"),
            (31, "u"),
            (32, "v"),
            (33, "w"),
            (34, "p"),
            (35, "q"),
            (36, "r"),
            (40, "pr0"),
            (44, "pr1"),
            (48, "pr2"),
            (52, "pr3"),
            (56, "pr4"),
            (60, "sphi"),
            (61, "stheta"),
            (62, "spsi"),
        ];

        Self::builtin(VEHICLE)
    }

    /// Builds a table from a compiled-in layout. A broken layout panics in
    /// debug builds and logs an empty table in release builds.
    fn builtin(entries: &[(usize, &str)]) -> Self {
        let specs: Vec<ChannelSpec> = entries
            .iter()
            .map(|&(position, name)| ChannelSpec::new(position, name))
            .collect();

        match Self::new(&specs) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "built-in channel table is invalid");
                debug_assert!(false, "built-in channel table is invalid: {}", e);
                Self::empty()
            }
        }
    }

    fn empty() -> Self {
        Self {
            slots: [None; FIELD_POSITIONS],
            names: Vec::new(),
            positions: Vec::new(),
        }
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::vehicle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_table_shape() {
        let table = ChannelTable::vehicle();
        assert_eq!(table.len(), 44);
        assert_eq!(table.lookup(1).unwrap(), "mode");
        assert_eq!(table.lookup(18).unwrap(), "voltage");
        assert_eq!(table.lookup(62).unwrap(), "spsi");
        assert!(table.lookup(0).is_none());
        assert!(table.lookup(37).is_none());
        assert!(table.lookup(63).is_none());
        assert!(table.lookup(64).is_none());
        assert_eq!(table.max_position(), 62);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "built-in channel table is invalid")]
    fn test_broken_builtin_layout_panics_in_debug() {
        ChannelTable::builtin(&[(3, "a"), (3, "b")]);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_broken_builtin_layout_is_empty_in_release() {
        assert!(ChannelTable::builtin(&[(3, "a"), (3, "b")]).is_empty());
    }

    #[test]
    fn test_order_follows_position() {
        let table = ChannelTable::new(&[
            ChannelSpec::new(5, "c"),
            ChannelSpec::new(1, "a"),
            ChannelSpec::new(3, "b"),
        ])
        .unwrap();
        let names: Vec<&str> = table.names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(table.index_of(3), Some(1));
        assert_eq!(table.position_of("c"), Some(5));
    }

    #[test]
    fn test_rejects_reserved_position() {
        let err = ChannelTable::new(&[ChannelSpec::new(0, "zero")]).unwrap_err();
        assert!(matches!(err, TableError::ReservedPosition { .. }));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = ChannelTable::new(&[ChannelSpec::new(64, "far")]).unwrap_err();
        assert_eq!(
            err,
            TableError::PositionOutOfRange {
                position: 64,
                limit: 64
            }
        );
    }

    #[test]
    fn test_rejects_duplicates() {
        let err =
            ChannelTable::new(&[ChannelSpec::new(4, "a"), ChannelSpec::new(4, "b")]).unwrap_err();
        assert!(matches!(err, TableError::DuplicatePosition { position: 4, .. }));

        let err =
            ChannelTable::new(&[ChannelSpec::new(4, "a"), ChannelSpec::new(5, "a")]).unwrap_err();
        assert_eq!(err, TableError::DuplicateName("a".to_string()));
    }
}
