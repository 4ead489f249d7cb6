//! Layer events.
//!
//! Events are immutable values. A layer that mutates its state returns events
//! expressed in its own coordinates; each layer above translates them into
//! fresh events in its coordinates (see [`crate::layer::Layer::translate_event`]).
//!
//! Position payloads follow a before/after convention:
//! - `Hidden` and `Deleted` carry positions as they were *before* the change.
//! - `Shown` and `Inserted` carry positions as they are *after* the change.
//! - `Reordered` carries source positions and the insertion point in the
//!   coordinates from *before* the move.

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, PositionRange};

/// Something that happened to a layer's structure or geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerEvent {
    /// Items became hidden. Indexes are the items hidden, sorted ascending.
    Hidden {
        axis: Axis,
        ranges: Vec<PositionRange>,
        indexes: Vec<usize>,
    },
    /// Items became visible again.
    Shown {
        axis: Axis,
        ranges: Vec<PositionRange>,
        indexes: Vec<usize>,
    },
    /// Items were physically removed. `indexes` are their indexes before removal;
    /// every larger index shifts down.
    Deleted {
        axis: Axis,
        ranges: Vec<PositionRange>,
        indexes: Vec<usize>,
    },
    /// Items were physically added. `indexes` are the new indexes; every index
    /// at or above an inserted one shifted up.
    Inserted {
        axis: Axis,
        ranges: Vec<PositionRange>,
        indexes: Vec<usize>,
    },
    /// Items moved to another position. Indexes do not change.
    Reordered {
        axis: Axis,
        from: Vec<PositionRange>,
        indexes: Vec<usize>,
        to: usize,
    },
    /// Sizes changed for the given positions; positions and indexes did not.
    Resized {
        axis: Axis,
        ranges: Vec<PositionRange>,
    },
    /// Pixel geometry may have changed everywhere (font, DPI).
    VisualRefresh,
    /// The whole structure of both axes must be re-read (state was loaded).
    StructureReset,
}

/// One contiguous change to an axis, in the coordinates of the event's layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralDiff {
    /// Positions `before` no longer exist.
    Delete { before: PositionRange },
    /// Positions `after` are new.
    Add { after: PositionRange },
}

impl LayerEvent {
    /// The axis this event concerns, if it concerns exactly one.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            LayerEvent::Hidden { axis, .. }
            | LayerEvent::Shown { axis, .. }
            | LayerEvent::Deleted { axis, .. }
            | LayerEvent::Inserted { axis, .. }
            | LayerEvent::Reordered { axis, .. }
            | LayerEvent::Resized { axis, .. } => Some(*axis),
            LayerEvent::VisualRefresh | LayerEvent::StructureReset => None,
        }
    }

    /// Whether positions or indexes on `axis` may have changed.
    pub fn is_structural(&self, axis: Axis) -> bool {
        match self {
            LayerEvent::Resized { .. } | LayerEvent::VisualRefresh => false,
            LayerEvent::StructureReset => true,
            _ => self.axis() == Some(axis),
        }
    }

    /// Whether only pixel geometry on `axis` changed.
    pub fn is_geometry_only(&self, axis: Axis) -> bool {
        match self {
            LayerEvent::VisualRefresh => true,
            LayerEvent::Resized { axis: a, .. } => *a == axis,
            _ => false,
        }
    }

    /// Position ranges carried by this event.
    pub fn ranges(&self) -> &[PositionRange] {
        match self {
            LayerEvent::Hidden { ranges, .. }
            | LayerEvent::Shown { ranges, .. }
            | LayerEvent::Deleted { ranges, .. }
            | LayerEvent::Inserted { ranges, .. }
            | LayerEvent::Resized { ranges, .. } => ranges,
            LayerEvent::Reordered { from, .. } => from,
            LayerEvent::VisualRefresh | LayerEvent::StructureReset => &[],
        }
    }

    /// Index payload carried by this event.
    pub fn indexes(&self) -> &[usize] {
        match self {
            LayerEvent::Hidden { indexes, .. }
            | LayerEvent::Shown { indexes, .. }
            | LayerEvent::Deleted { indexes, .. }
            | LayerEvent::Inserted { indexes, .. }
            | LayerEvent::Reordered { indexes, .. } => indexes,
            LayerEvent::Resized { .. } | LayerEvent::VisualRefresh | LayerEvent::StructureReset => {
                &[]
            }
        }
    }

    /// Structural diffs for listeners that only care about position deltas.
    ///
    /// A reorder is reported as the removal of the source ranges followed by the
    /// addition of the same number of positions at the destination.
    pub fn diffs(&self) -> Vec<StructuralDiff> {
        match self {
            LayerEvent::Hidden { ranges, .. } | LayerEvent::Deleted { ranges, .. } => ranges
                .iter()
                .map(|r| StructuralDiff::Delete { before: *r })
                .collect(),
            LayerEvent::Shown { ranges, .. } | LayerEvent::Inserted { ranges, .. } => ranges
                .iter()
                .map(|r| StructuralDiff::Add { after: *r })
                .collect(),
            LayerEvent::Reordered { from, to, .. } => {
                let moved: usize = from.iter().map(PositionRange::len).sum();
                if moved == 0 {
                    return Vec::new();
                }
                let removed_before = from
                    .iter()
                    .map(|r| r.end.min(*to).saturating_sub(r.start))
                    .sum::<usize>();
                let start = to.saturating_sub(removed_before);
                let mut diffs: Vec<StructuralDiff> = from
                    .iter()
                    .map(|r| StructuralDiff::Delete { before: *r })
                    .collect();
                diffs.push(StructuralDiff::Add {
                    after: PositionRange::new(start, start + moved),
                });
                diffs
            }
            LayerEvent::Resized { .. } | LayerEvent::VisualRefresh | LayerEvent::StructureReset => {
                Vec::new()
            }
        }
    }

    /// True when the event carries no positional change a listener could act on.
    pub fn is_empty(&self) -> bool {
        match self {
            LayerEvent::VisualRefresh | LayerEvent::StructureReset => false,
            // Deletes and inserts matter to index-based state even when no
            // position is visible at this layer.
            LayerEvent::Deleted { indexes, .. } | LayerEvent::Inserted { indexes, .. } => {
                indexes.is_empty()
            }
            _ => self.ranges().is_empty(),
        }
    }
}
