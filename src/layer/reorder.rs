//! A layer that permutes the order of the layer beneath.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use super::{forward_command, visible_indexes, Layer};
use crate::axis::{ranges_from_positions, Axis, AxisPair, PositionRange};
use crate::cache::CacheSlot;
use crate::command::LayerCommand;
use crate::error::GridError;
use crate::event::LayerEvent;
use crate::hideshow::translate::{shift_for_delete, shift_for_insert, sorted};
use crate::persistence::{order_key, parse_index_list, write_index_list, Properties};

#[derive(Debug)]
struct ReorderAxis {
    /// Indexes of the layer beneath, in local position order.
    order: Vec<usize>,
    positions: CacheSlot<HashMap<usize, usize>>,
    offsets: CacheSlot<Vec<u32>>,
}

impl ReorderAxis {
    fn new(order: Vec<usize>) -> Self {
        Self {
            order,
            positions: CacheSlot::new(),
            offsets: CacheSlot::new(),
        }
    }

    fn positions(&self) -> Rc<HashMap<usize, usize>> {
        self.positions.get_or_build(|| {
            self.order
                .iter()
                .enumerate()
                .map(|(position, &index)| (index, position))
                .collect()
        })
    }

    fn position_of(&self, index: usize) -> Option<usize> {
        self.positions().get(&index).copied()
    }

    fn invalidate(&self) {
        self.positions.invalidate();
        self.offsets.invalidate();
    }

    /// Remove `indexes` from the order; returns the local positions they held.
    fn remove(&mut self, indexes: &[usize]) -> Vec<usize> {
        let removed: Vec<usize> = indexes.iter().filter_map(|&i| self.position_of(i)).collect();
        let drop: BTreeSet<usize> = indexes.iter().copied().collect();
        self.order.retain(|index| !drop.contains(index));
        self.invalidate();
        removed
    }

    /// Place `indexes` right after their predecessor beneath; returns the local
    /// positions they took.
    fn place(&mut self, axis: Axis, underlying: &dyn Layer, indexes: &[usize]) -> Vec<usize> {
        let mut incoming: Vec<(usize, usize)> = indexes
            .iter()
            .map(|&index| {
                let underlying_position = underlying.position_of(axis, index).unwrap_or(usize::MAX);
                (underlying_position, index)
            })
            .collect();
        incoming.sort_unstable();

        for (underlying_position, index) in incoming {
            if self.position_of(index).is_some() {
                continue;
            }
            let at = underlying_position
                .checked_sub(1)
                .and_then(|p| underlying.index_at(axis, p))
                .and_then(|predecessor| self.position_of(predecessor))
                .map_or(0, |p| p + 1);
            let at = if underlying_position == usize::MAX {
                self.order.len()
            } else {
                at.min(self.order.len())
            };
            self.order.insert(at, index);
            self.invalidate();
        }
        indexes.iter().filter_map(|&i| self.position_of(i)).collect()
    }
}

/// Presents the layer beneath in a user-defined order.
///
/// The order is stored as indexes, so it survives hides, inserts and deletes
/// underneath.
#[derive(Debug)]
pub struct ReorderLayer<L> {
    underlying: L,
    axes: AxisPair<ReorderAxis>,
}

impl<L: Layer> ReorderLayer<L> {
    pub fn new(underlying: L) -> Self {
        let columns = visible_indexes(&underlying, Axis::Column);
        let rows = visible_indexes(&underlying, Axis::Row);
        Self {
            underlying,
            axes: AxisPair::new(ReorderAxis::new(columns), ReorderAxis::new(rows)),
        }
    }

    /// Indexes beneath in local order.
    pub fn order(&self, axis: Axis) -> &[usize] {
        &self.axes.get(axis).order
    }

    pub fn inner(&self) -> &L {
        &self.underlying
    }

    /// Move the items at `from` before position `to`.
    ///
    /// `to == count` appends. Returns `None` when the order does not change.
    pub fn reorder(&mut self, axis: Axis, from: &[usize], to: usize) -> Option<LayerEvent> {
        let data = self.axes.get_mut(axis);
        let count = data.order.len();
        let moved_positions: Vec<usize> = sorted(from).into_iter().filter(|&p| p < count).collect();
        if moved_positions.is_empty() {
            return None;
        }
        let to = to.min(count);
        let moved: Vec<usize> = moved_positions
            .iter()
            .filter_map(|&p| data.order.get(p).copied())
            .collect();
        let mut reordered: Vec<usize> = data
            .order
            .iter()
            .enumerate()
            .filter(|(p, _)| moved_positions.binary_search(p).is_err())
            .map(|(_, &index)| index)
            .collect();
        let at = to - moved_positions.partition_point(|&p| p < to);
        reordered.splice(at..at, moved.iter().copied());
        if reordered == data.order {
            return None;
        }
        data.order = reordered;
        data.invalidate();
        tracing::debug!(?axis, from = ?moved_positions, to, "reordered");
        Some(LayerEvent::Reordered {
            axis,
            from: ranges_from_positions(moved_positions),
            indexes: moved,
            to,
        })
    }

    fn reconcile(&mut self, axis: Axis) {
        let current: Vec<usize> = visible_indexes(&self.underlying, axis);
        let present: BTreeSet<usize> = current.iter().copied().collect();
        let data = self.axes.get_mut(axis);
        data.order.retain(|index| present.contains(index));
        let kept: BTreeSet<usize> = data.order.iter().copied().collect();
        data.order
            .extend(current.into_iter().filter(|index| !kept.contains(index)));
        data.invalidate();
    }

    fn translate_axis(&mut self, event: LayerEvent) -> Option<LayerEvent> {
        let Some(axis) = event.axis() else {
            return Some(event);
        };
        let underlying: &dyn Layer = &self.underlying;
        let data = self.axes.get_mut(axis);
        match event {
            LayerEvent::Deleted { axis, indexes, .. } => {
                let removed = data.remove(&indexes);
                let deleted = sorted(&indexes);
                data.order = shift_for_delete(data.order.iter().copied(), &deleted);
                data.invalidate();
                Some(LayerEvent::Deleted {
                    axis,
                    ranges: ranges_from_positions(removed),
                    indexes,
                })
            }
            LayerEvent::Inserted { axis, indexes, .. } => {
                let inserted = sorted(&indexes);
                data.order = data
                    .order
                    .iter()
                    .map(|&index| shift_for_insert(index, &inserted))
                    .collect();
                data.invalidate();
                let placed = data.place(axis, underlying, &inserted);
                Some(LayerEvent::Inserted {
                    axis,
                    ranges: ranges_from_positions(placed),
                    indexes,
                })
            }
            LayerEvent::Hidden { axis, indexes, .. } => {
                let removed = data.remove(&indexes);
                (!removed.is_empty()).then(|| LayerEvent::Hidden {
                    axis,
                    ranges: ranges_from_positions(removed),
                    indexes,
                })
            }
            LayerEvent::Shown { axis, indexes, .. } => {
                let placed = data.place(axis, underlying, &indexes);
                (!placed.is_empty()).then(|| LayerEvent::Shown {
                    axis,
                    ranges: ranges_from_positions(placed),
                    indexes,
                })
            }
            // Positions here are defined by index order, so a reorder beneath
            // does not move anything in this layer.
            LayerEvent::Reordered { .. } => None,
            LayerEvent::Resized { axis, ranges } => {
                data.offsets.invalidate();
                let local: Vec<usize> = ranges
                    .iter()
                    .flat_map(PositionRange::iter)
                    .filter_map(|u| underlying.index_at(axis, u))
                    .filter_map(|index| data.position_of(index))
                    .collect();
                (!local.is_empty()).then(|| LayerEvent::Resized {
                    axis,
                    ranges: ranges_from_positions(local),
                })
            }
            LayerEvent::VisualRefresh | LayerEvent::StructureReset => Some(event),
        }
    }
}

impl<L: Layer> Layer for ReorderLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        self.axes.get(axis).order.len()
    }

    fn index_at(&self, axis: Axis, position: usize) -> Option<usize> {
        self.axes.get(axis).order.get(position).copied()
    }

    fn position_of(&self, axis: Axis, index: usize) -> Option<usize> {
        self.axes.get(axis).position_of(index)
    }

    fn size_at(&self, axis: Axis, position: usize) -> Option<u32> {
        let underlying_position = self.to_underlying(axis, position)?;
        self.underlying.size_at(axis, underlying_position)
    }

    fn start_offset_at(&self, axis: Axis, position: usize) -> Option<u32> {
        let data = self.axes.get(axis);
        let offsets = data.offsets.get_or_build(|| {
            let mut offsets = Vec::with_capacity(data.order.len() + 1);
            let mut edge = 0u32;
            for position in 0..data.order.len() {
                offsets.push(edge);
                edge = edge.saturating_add(self.size_at(axis, position).unwrap_or(0));
            }
            offsets.push(edge);
            offsets
        });
        if position >= data.order.len() {
            return None;
        }
        offsets.get(position).copied()
    }

    fn to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        let index = self.index_at(axis, position)?;
        self.underlying.position_of(axis, index)
    }

    fn from_underlying(&self, axis: Axis, underlying_position: usize) -> Option<usize> {
        let index = self.underlying.index_at(axis, underlying_position)?;
        self.position_of(axis, index)
    }

    fn underlying(&self) -> Option<&dyn Layer> {
        Some(&self.underlying)
    }

    fn underlying_mut(&mut self) -> Option<&mut dyn Layer> {
        Some(&mut self.underlying)
    }

    fn do_command(&mut self, command: &LayerCommand) -> Vec<LayerEvent> {
        match command {
            LayerCommand::Reorder { axis, from, to }
            | LayerCommand::ReorderIntoGroup { axis, from, to } => {
                self.reorder(*axis, from, *to).into_iter().collect()
            }
            _ => forward_command(self, command),
        }
    }

    fn translate_event(&mut self, event: LayerEvent) -> Vec<LayerEvent> {
        match &event {
            LayerEvent::StructureReset => {
                self.reconcile(Axis::Column);
                self.reconcile(Axis::Row);
                return vec![event];
            }
            LayerEvent::VisualRefresh => {
                self.axes.columns.offsets.invalidate();
                self.axes.rows.offsets.invalidate();
                return vec![event];
            }
            _ => {}
        }
        self.translate_axis(event).into_iter().collect()
    }

    fn save_state(&self, prefix: &str, properties: &mut Properties) {
        self.underlying.save_state(prefix, properties);
        for axis in [Axis::Column, Axis::Row] {
            properties.insert(order_key(prefix, axis), write_index_list(self.order(axis).iter().copied()));
        }
    }

    fn load_state(&mut self, prefix: &str, properties: &Properties) -> Vec<LayerEvent> {
        let mut events: Vec<LayerEvent> = self
            .underlying
            .load_state(prefix, properties)
            .into_iter()
            .flat_map(|event| self.translate_event(event))
            .collect();

        let mut changed = false;
        for axis in [Axis::Column, Axis::Row] {
            let Some(value) = properties.get(&order_key(prefix, axis)) else {
                continue;
            };
            let order = match parse_index_list(value) {
                Ok(order) => order,
                Err(err) => {
                    tracing::warn!(%err, ?axis, "ignoring persisted order");
                    continue;
                }
            };
            let data = self.axes.get_mut(axis);
            let expected: BTreeSet<usize> = data.order.iter().copied().collect();
            let loaded: BTreeSet<usize> = order.iter().copied().collect();
            if loaded != expected || loaded.len() != order.len() {
                let err = GridError::InvalidOrder(value.clone());
                tracing::warn!(%err, ?axis, "ignoring persisted order");
                continue;
            }
            if order != data.order {
                data.order = order;
                data.invalidate();
                changed = true;
            }
        }
        if changed {
            events.push(LayerEvent::StructureReset);
        }
        events
    }
}
