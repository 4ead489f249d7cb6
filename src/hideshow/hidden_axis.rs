//! One axis of a layer that hides items.

use std::collections::BTreeSet;
use std::rc::Rc;

use super::geometry::{local_size, GeometryCache};
use super::mapper::IndexPositionMapper;
use super::visibility::{VisibilityCache, VisibilityMaps};
use super::HideStrategy;
use crate::axis::{ranges_from_positions, Axis, Direction};
use crate::event::LayerEvent;
use crate::layer::Layer;

/// Hidden set plus derived caches for one axis.
///
/// Every query takes the layer beneath explicitly; the owning layer holds it.
#[derive(Debug)]
pub struct HiddenAxis {
    pub(super) axis: Axis,
    pub(super) strategy: HideStrategy,
    pub(super) mapper: IndexPositionMapper,
    pub(super) visibility: VisibilityCache,
    pub(super) geometry: GeometryCache,
}

impl HiddenAxis {
    pub fn new(axis: Axis, strategy: HideStrategy) -> Self {
        Self {
            axis,
            strategy,
            mapper: IndexPositionMapper::new(),
            visibility: VisibilityCache::new(),
            geometry: GeometryCache::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn strategy(&self) -> HideStrategy {
        self.strategy
    }

    pub fn mapper(&self) -> &IndexPositionMapper {
        &self.mapper
    }

    /// Maps for the current state, or `None` when nothing is hidden and the
    /// axis is an identity view of the layer beneath.
    pub(super) fn maps(&self, underlying: &dyn Layer) -> Option<Rc<VisibilityMaps>> {
        if !self.mapper.has_hidden() {
            return None;
        }
        Some(self.visibility.maps(
            underlying,
            self.axis,
            self.mapper.hidden_set(),
            self.strategy,
        ))
    }

    pub fn count(&self, underlying: &dyn Layer) -> usize {
        match self.maps(underlying) {
            Some(maps) => maps.count(),
            None => underlying.count(self.axis),
        }
    }

    pub fn index_at(&self, underlying: &dyn Layer, position: usize) -> Option<usize> {
        match self.maps(underlying) {
            Some(maps) => maps.index_at(position),
            None => {
                let underlying_position = self.to_underlying(underlying, position)?;
                underlying.index_at(self.axis, underlying_position)
            }
        }
    }

    pub fn position_of(&self, underlying: &dyn Layer, index: usize) -> Option<usize> {
        match self.maps(underlying) {
            Some(maps) => maps.position_of(index),
            None => underlying.position_of(self.axis, index),
        }
    }

    /// Position a hidden index would take if it were shown now.
    pub fn position_of_hidden(&self, underlying: &dyn Layer, index: usize) -> Option<usize> {
        self.maps(underlying)?.position_of_hidden(index)
    }

    pub fn size_at(&self, underlying: &dyn Layer, position: usize) -> Option<u32> {
        match self.maps(underlying) {
            Some(maps) => local_size(&maps, underlying, self.axis, position),
            None => underlying.size_at(self.axis, position),
        }
    }

    pub fn start_offset_at(&self, underlying: &dyn Layer, position: usize) -> Option<u32> {
        match self.maps(underlying) {
            Some(maps) => self
                .geometry
                .start_offset(&maps, underlying, self.axis, position),
            None => underlying.start_offset_at(self.axis, position),
        }
    }

    /// Start offsets of every position followed by the trailing edge.
    pub fn start_offsets(&self, underlying: &dyn Layer) -> Vec<u32> {
        match self.maps(underlying) {
            Some(maps) => self
                .geometry
                .start_offsets(&maps, underlying, self.axis)
                .as_ref()
                .clone(),
            None => {
                let count = underlying.count(self.axis);
                let mut offsets: Vec<u32> = (0..count)
                    .map(|p| underlying.start_offset_at(self.axis, p).unwrap_or(0))
                    .collect();
                offsets.push(underlying.total_size(self.axis));
                offsets
            }
        }
    }

    pub fn to_underlying(&self, underlying: &dyn Layer, position: usize) -> Option<usize> {
        match self.maps(underlying) {
            Some(maps) => maps.to_underlying(position),
            None => (position < underlying.count(self.axis)).then_some(position),
        }
    }

    pub fn from_underlying(&self, underlying: &dyn Layer, underlying_position: usize) -> Option<usize> {
        match self.maps(underlying) {
            Some(maps) => maps.from_underlying(underlying_position),
            None => (underlying_position < underlying.count(self.axis)).then_some(underlying_position),
        }
    }

    /// Whether hidden items sit directly next to `position` in `direction`.
    pub fn has_hidden_neighbor(
        &self,
        underlying: &dyn Layer,
        position: usize,
        direction: Direction,
    ) -> bool {
        let Some(maps) = self.maps(underlying) else {
            return false;
        };
        if position >= maps.count() {
            return false;
        }
        // Zero-size items keep their own position, removed ones take the next.
        let target = match (direction, self.strategy) {
            (Direction::TowardStart, HideStrategy::Remove) => Some(position),
            (Direction::TowardStart, HideStrategy::ZeroSize) => position.checked_sub(1),
            (Direction::TowardEnd, _) => Some(position + 1),
        };
        let found = maps.hidden_positions().any(|(_, would_be)| Some(would_be) == target);
        found
    }

    /// Build the index maps now so a later translation sees the current state.
    pub fn warm(&self, underlying: &dyn Layer) {
        if let Some(maps) = self.maps(underlying) {
            tracing::trace!(axis = ?self.axis, count = maps.count(), "visibility maps ready");
        }
    }

    pub fn invalidate(&self) {
        self.visibility.invalidate();
        self.geometry.invalidate();
    }

    pub fn invalidate_geometry(&self) {
        self.geometry.invalidate();
    }

    /// Hide `indexes`. Returns the event in this layer's coordinates, or `None`
    /// when nothing visible changed.
    pub fn hide(&mut self, underlying: &dyn Layer, indexes: &[usize]) -> Option<LayerEvent> {
        let before = self.maps(underlying);
        let newly = self.mapper.hide(indexes.iter().copied());
        if newly.is_empty() {
            return None;
        }
        let (positions, visible): (Vec<usize>, Vec<usize>) = newly
            .iter()
            .filter_map(|&index| {
                let position = match &before {
                    Some(maps) => maps.position_of(index),
                    None => underlying.position_of(self.axis, index),
                };
                position.map(|p| (p, index))
            })
            .unzip();
        self.invalidate();
        tracing::debug!(axis = ?self.axis, indexes = ?newly, "hid indexes");

        if positions.is_empty() {
            return None;
        }
        let ranges = ranges_from_positions(positions);
        Some(match self.strategy {
            HideStrategy::Remove => LayerEvent::Hidden {
                axis: self.axis,
                ranges,
                indexes: visible,
            },
            HideStrategy::ZeroSize => LayerEvent::Resized {
                axis: self.axis,
                ranges,
            },
        })
    }

    /// Show `indexes`. Indexes that are not hidden are ignored.
    pub fn show(&mut self, underlying: &dyn Layer, indexes: &[usize]) -> Option<LayerEvent> {
        let shown = self.mapper.show(indexes.iter().copied());
        self.shown_event(underlying, shown)
    }

    pub fn show_all(&mut self, underlying: &dyn Layer) -> Option<LayerEvent> {
        let shown = self.mapper.show_all();
        self.shown_event(underlying, shown)
    }

    /// Reveal hidden items next to `position`, one or all of them.
    pub fn show_adjacent(
        &mut self,
        underlying: &dyn Layer,
        position: usize,
        direction: Direction,
        all: bool,
    ) -> Option<LayerEvent> {
        let start = self.to_underlying(underlying, position)?;
        let underlying_count = underlying.count(self.axis);
        let mut revealed = Vec::new();
        let mut cursor = start;
        loop {
            let next = match direction {
                Direction::TowardStart => cursor.checked_sub(1),
                Direction::TowardEnd => Some(cursor + 1).filter(|&n| n < underlying_count),
            };
            let Some(next) = next else {
                break;
            };
            let Some(index) = underlying.index_at(self.axis, next) else {
                break;
            };
            if !self.mapper.is_hidden(index) {
                break;
            }
            revealed.push(index);
            if !all {
                break;
            }
            cursor = next;
        }
        if revealed.is_empty() {
            tracing::trace!(axis = ?self.axis, position, ?direction, "no hidden neighbour to show");
            return None;
        }
        self.show(underlying, &revealed)
    }

    /// Replace the hidden set wholesale (state loading).
    pub fn replace_hidden(&mut self, hidden: BTreeSet<usize>) -> bool {
        let changed = self.mapper.replace(hidden);
        if changed {
            self.invalidate();
        }
        changed
    }

    fn shown_event(&mut self, underlying: &dyn Layer, shown: Vec<usize>) -> Option<LayerEvent> {
        if shown.is_empty() {
            return None;
        }
        self.invalidate();
        tracing::debug!(axis = ?self.axis, indexes = ?shown, "showed indexes");
        let (positions, visible): (Vec<usize>, Vec<usize>) = shown
            .iter()
            .filter_map(|&index| self.position_of(underlying, index).map(|p| (p, index)))
            .unzip();
        if positions.is_empty() {
            return None;
        }
        let ranges = ranges_from_positions(positions);
        Some(match self.strategy {
            HideStrategy::Remove => LayerEvent::Shown {
                axis: self.axis,
                ranges,
                indexes: visible,
            },
            HideStrategy::ZeroSize => LayerEvent::Resized {
                axis: self.axis,
                ranges,
            },
        })
    }
}
