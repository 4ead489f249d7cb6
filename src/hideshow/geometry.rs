//! Pixel start offsets of a layer that hides items.
//!
//! The start of a local position is the underlying start of the item minus the
//! sizes of every hidden item that comes before it underneath. Single lookups
//! are memoized per position; [`GeometryCache::start_offsets`] computes the
//! whole axis in one increasing pass for callers that need bulk geometry.

use std::rc::Rc;

use super::visibility::VisibilityMaps;
use crate::axis::Axis;
use crate::cache::{CacheSlot, MemoMap};
use crate::layer::Layer;

/// Memoized start offsets for one axis.
#[derive(Debug, Default)]
pub struct GeometryCache {
    offsets: MemoMap<usize, Option<u32>>,
    bulk: CacheSlot<Vec<u32>>,
}

/// Size of a local position: hidden items kept in place report 0.
pub(crate) fn local_size(
    maps: &VisibilityMaps,
    underlying: &dyn Layer,
    axis: Axis,
    position: usize,
) -> Option<u32> {
    let index = maps.index_at(position)?;
    if maps.is_hidden_index(index) {
        return Some(0);
    }
    underlying.size_at(axis, maps.to_underlying(position)?)
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start offset of `position`; `None` when out of range.
    pub fn start_offset(
        &self,
        maps: &VisibilityMaps,
        underlying: &dyn Layer,
        axis: Axis,
        position: usize,
    ) -> Option<u32> {
        if position >= maps.count() {
            return None;
        }
        if let Some(bulk) = self.bulk.get() {
            return bulk.get(position).copied();
        }
        self.offsets.get_or_compute(position, || {
            let underlying_position = maps.to_underlying(position)?;
            let start = underlying.start_offset_at(axis, underlying_position)?;
            let hidden_before: u32 = maps
                .hidden_underlying()
                .iter()
                .take_while(|(hidden_position, _)| *hidden_position < underlying_position)
                .map(|(hidden_position, _)| underlying.size_at(axis, *hidden_position).unwrap_or(0))
                .fold(0u32, u32::saturating_add);
            Some(start.saturating_sub(hidden_before))
        })
    }

    /// Start offsets of every position plus the trailing edge (`count + 1`
    /// entries), computed in one pass.
    pub fn start_offsets(
        &self,
        maps: &VisibilityMaps,
        underlying: &dyn Layer,
        axis: Axis,
    ) -> Rc<Vec<u32>> {
        self.bulk.get_or_build(|| {
            let count = maps.count();
            let mut offsets = Vec::with_capacity(count + 1);
            let mut edge = 0u32;
            for position in 0..count {
                offsets.push(edge);
                let size = local_size(maps, underlying, axis, position).unwrap_or(0);
                edge = edge.saturating_add(size);
            }
            offsets.push(edge);
            offsets
        })
    }

    /// Number of memoized single lookups.
    pub fn memoized(&self) -> usize {
        self.offsets.len()
    }

    pub fn invalidate(&self) {
        self.offsets.clear();
        self.bulk.invalidate();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::hideshow::HideStrategy;
    use crate::layer::{DataLayer, DataLayerConfig};
    use std::collections::{BTreeMap, BTreeSet};

    fn data() -> DataLayer {
        DataLayer::new(DataLayerConfig {
            column_count: 6,
            row_count: 1,
            default_column_width: 10,
            column_widths: BTreeMap::from([(1, 30), (4, 5)]),
            ..DataLayerConfig::default()
        })
    }

    #[test]
    fn test_offsets_subtract_hidden_sizes() {
        let data = data();
        let hidden: BTreeSet<usize> = [1, 3].into_iter().collect();
        let maps = VisibilityMaps::build(&data, Axis::Column, &hidden, HideStrategy::Remove);
        let cache = GeometryCache::new();

        // Visible: 0(10) 2(10) 4(5) 5(10)
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 0), Some(0));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 1), Some(10));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 2), Some(20));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 3), Some(25));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 4), None);
        assert_eq!(cache.memoized(), 4);
    }

    #[test]
    fn test_bulk_matches_single_lookups() {
        let data = data();
        let hidden: BTreeSet<usize> = [0, 4].into_iter().collect();
        let maps = VisibilityMaps::build(&data, Axis::Column, &hidden, HideStrategy::Remove);
        let single = GeometryCache::new();
        let bulk = GeometryCache::new();

        let offsets = bulk.start_offsets(&maps, &data, Axis::Column);
        assert_eq!(offsets.len(), maps.count() + 1);
        for position in 0..maps.count() {
            assert_eq!(
                single.start_offset(&maps, &data, Axis::Column, position),
                Some(offsets[position])
            );
        }
    }

    #[test]
    fn test_zero_size_hidden_keeps_position() {
        let data = data();
        let hidden: BTreeSet<usize> = [1].into_iter().collect();
        let maps = VisibilityMaps::build(&data, Axis::Column, &hidden, HideStrategy::ZeroSize);
        let cache = GeometryCache::new();

        assert_eq!(local_size(&maps, &data, Axis::Column, 1), Some(0));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 1), Some(10));
        assert_eq!(cache.start_offset(&maps, &data, Axis::Column, 2), Some(10));
    }
}
