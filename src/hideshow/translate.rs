//! Keeping index-based state valid when the layer beneath changes.
//!
//! Hidden sets, group membership, size overrides and reorder lists all store
//! indexes. A delete or insert below renumbers indexes, so each of them is
//! rewritten with [`shift_for_delete`] / [`shift_for_insert`] before any cache
//! is rebuilt.

use std::rc::Rc;

use super::hidden_axis::HiddenAxis;
use super::visibility::VisibilityMaps;
use crate::axis::{positions_in, ranges_from_positions, Axis, PositionRange};
use crate::event::LayerEvent;
use crate::layer::Layer;

/// Drop deleted indexes and shift every survivor down by the number of deleted
/// indexes below its original value.
///
/// `deleted` must be sorted ascending. Each value is shifted exactly once, against
/// the original numbering, however many deletes precede it.
pub fn shift_for_delete(values: impl IntoIterator<Item = usize>, deleted: &[usize]) -> Vec<usize> {
    values
        .into_iter()
        .filter(|value| deleted.binary_search(value).is_err())
        .map(|value| value - deleted.partition_point(|&d| d < value))
        .collect()
}

/// Shift `value` up past every inserted index at or below it.
///
/// `inserted` holds the new indexes, sorted ascending. Walking them in order and
/// bumping the value as it goes handles runs of consecutive inserts.
pub fn shift_for_insert(value: usize, inserted: &[usize]) -> usize {
    let mut shifted = value;
    for &index in inserted {
        if index <= shifted {
            shifted += 1;
        } else {
            break;
        }
    }
    shifted
}

/// Sorted copy of an index payload.
pub(crate) fn sorted(indexes: &[usize]) -> Vec<usize> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Map underlying position ranges to local ones through `maps`; positions with
/// no local counterpart are dropped.
fn local_ranges(maps: &VisibilityMaps, ranges: &[PositionRange]) -> Vec<PositionRange> {
    ranges_from_positions(
        positions_in(ranges)
            .into_iter()
            .filter_map(|u| maps.from_underlying(u)),
    )
}

/// Indexes from `indexes` that have a local position in `maps`.
fn local_indexes(maps: &VisibilityMaps, indexes: &[usize]) -> Vec<usize> {
    indexes
        .iter()
        .copied()
        .filter(|&index| maps.position_of(index).is_some())
        .collect()
}

impl HiddenAxis {
    /// Translate an event from the layer beneath into this axis' coordinates and
    /// bring the hidden set and caches up to date.
    ///
    /// Events concerning the other axis pass through unchanged. Removal-style
    /// events are mapped through the maps built before the change (see
    /// [`HiddenAxis::warm`]); addition-style events through the rebuilt maps.
    pub fn translate_event(&mut self, underlying: &dyn Layer, event: LayerEvent) -> Option<LayerEvent> {
        match &event {
            LayerEvent::VisualRefresh => {
                self.invalidate_geometry();
                return Some(event);
            }
            LayerEvent::StructureReset => {
                self.invalidate();
                return Some(event);
            }
            _ => {}
        }
        if event.axis() != Some(self.axis) {
            return Some(event);
        }

        // Built before the change below, if anything is hidden.
        let before: Option<Rc<VisibilityMaps>> = if self.mapper.has_hidden() {
            let current = self.visibility.current();
            if current.is_none() {
                tracing::debug!(axis = ?self.axis, "translating without pre-change maps");
            }
            current
        } else {
            None
        };

        match event {
            LayerEvent::Hidden { axis, ranges, indexes } => {
                self.invalidate();
                let Some(before) = before else {
                    return Some(LayerEvent::Hidden { axis, ranges, indexes });
                };
                let ranges = local_ranges(&before, &ranges);
                if ranges.is_empty() {
                    return None;
                }
                let indexes = local_indexes(&before, &indexes);
                Some(LayerEvent::Hidden { axis, ranges, indexes })
            }
            LayerEvent::Shown { axis, ranges, indexes } => {
                self.invalidate();
                let Some(after) = self.maps(underlying) else {
                    return Some(LayerEvent::Shown { axis, ranges, indexes });
                };
                let ranges = local_ranges(&after, &ranges);
                if ranges.is_empty() {
                    return None;
                }
                let indexes = local_indexes(&after, &indexes);
                Some(LayerEvent::Shown { axis, ranges, indexes })
            }
            LayerEvent::Deleted { axis, ranges, indexes } => {
                let ranges = match &before {
                    Some(before) => local_ranges(before, &ranges),
                    None => ranges,
                };
                let deleted = sorted(&indexes);
                self.mapper.apply_delete(&deleted);
                self.invalidate();
                tracing::debug!(?axis, deleted = ?deleted, hidden = ?self.mapper.hidden_indexes(), "applied delete");
                Some(LayerEvent::Deleted { axis, ranges, indexes })
            }
            LayerEvent::Inserted { axis, ranges, indexes } => {
                let inserted = sorted(&indexes);
                self.mapper.apply_insert(&inserted);
                self.invalidate();
                let ranges = match self.maps(underlying) {
                    Some(after) => local_ranges(&after, &ranges),
                    None => ranges,
                };
                Some(LayerEvent::Inserted { axis, ranges, indexes })
            }
            LayerEvent::Reordered { axis, from, indexes, to } => {
                self.invalidate();
                let Some(before) = before else {
                    return Some(LayerEvent::Reordered { axis, from, indexes, to });
                };
                let from = local_ranges(&before, &from);
                if from.is_empty() {
                    // Only hidden items moved; the visible order is unchanged.
                    return None;
                }
                let indexes = local_indexes(&before, &indexes);
                // A drop between hidden items lands next to the nearest visible one.
                let to = before.insertion_point(to);
                Some(LayerEvent::Reordered { axis, from, indexes, to })
            }
            LayerEvent::Resized { axis, ranges } => {
                self.invalidate_geometry();
                let Some(maps) = self.maps(underlying) else {
                    return Some(LayerEvent::Resized { axis, ranges });
                };
                let ranges = local_ranges(&maps, &ranges);
                (!ranges.is_empty()).then_some(LayerEvent::Resized { axis, ranges })
            }
            LayerEvent::VisualRefresh | LayerEvent::StructureReset => Some(event),
        }
    }
}

/// Translate `event` through both axes of a layer.
pub(crate) fn translate_both(
    axes: &mut crate::axis::AxisPair<HiddenAxis>,
    underlying: &dyn Layer,
    event: LayerEvent,
) -> Option<LayerEvent> {
    let event = axes.get_mut(Axis::Column).translate_event(underlying, event)?;
    axes.get_mut(Axis::Row).translate_event(underlying, event)
}
