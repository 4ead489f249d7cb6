//! Index/position maps derived from a hidden set and the layer beneath.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use super::HideStrategy;
use crate::axis::Axis;
use crate::cache::CacheSlot;
use crate::layer::Layer;

/// Every mapping of one axis, built together in a single pass so they can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMaps {
    index_to_position: HashMap<usize, usize>,
    position_to_index: Vec<usize>,
    /// Monotonic: local position order follows underlying position order.
    position_to_underlying: Vec<usize>,
    /// Position a hidden index would take if it were shown right now.
    hidden_to_position: HashMap<usize, usize>,
    /// `(underlying position, index)` of every hidden item, ascending.
    hidden_underlying: Vec<(usize, usize)>,
}

impl VisibilityMaps {
    /// Walk the underlying positions once and assign local positions.
    ///
    /// With [`HideStrategy::Remove`] a hidden item is skipped and recorded at the
    /// counter value it was skipped at. With [`HideStrategy::ZeroSize`] it keeps
    /// its position and is only recorded as hidden.
    pub fn build(
        underlying: &dyn Layer,
        axis: Axis,
        hidden: &BTreeSet<usize>,
        strategy: HideStrategy,
    ) -> Self {
        let underlying_count = underlying.count(axis);
        let mut maps = Self {
            index_to_position: HashMap::with_capacity(underlying_count),
            position_to_index: Vec::with_capacity(underlying_count),
            position_to_underlying: Vec::with_capacity(underlying_count),
            hidden_to_position: HashMap::with_capacity(hidden.len()),
            hidden_underlying: Vec::with_capacity(hidden.len()),
        };

        for underlying_position in 0..underlying_count {
            let Some(index) = underlying.index_at(axis, underlying_position) else {
                continue;
            };
            let next_position = maps.position_to_index.len();
            let is_hidden = hidden.contains(&index);
            if is_hidden {
                maps.hidden_to_position.insert(index, next_position);
                maps.hidden_underlying.push((underlying_position, index));
                if strategy == HideStrategy::Remove {
                    continue;
                }
            }
            maps.index_to_position.insert(index, next_position);
            maps.position_to_index.push(index);
            maps.position_to_underlying.push(underlying_position);
        }

        tracing::trace!(
            ?axis,
            underlying_count,
            visible = maps.position_to_index.len(),
            hidden = maps.hidden_underlying.len(),
            "rebuilt visibility maps"
        );
        maps
    }

    pub fn count(&self) -> usize {
        self.position_to_index.len()
    }

    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.position_to_index.get(position).copied()
    }

    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.index_to_position.get(&index).copied()
    }

    /// Position `index` would take if shown now; `None` if it is not hidden.
    pub fn position_of_hidden(&self, index: usize) -> Option<usize> {
        self.hidden_to_position.get(&index).copied()
    }

    pub fn to_underlying(&self, position: usize) -> Option<usize> {
        self.position_to_underlying.get(position).copied()
    }

    pub fn from_underlying(&self, underlying_position: usize) -> Option<usize> {
        self.position_to_underlying
            .binary_search(&underlying_position)
            .ok()
    }

    /// First local position whose underlying position is at or after
    /// `underlying_position`: where an insertion before that underlying
    /// position lands locally.
    pub fn insertion_point(&self, underlying_position: usize) -> usize {
        self.position_to_underlying
            .partition_point(|&u| u < underlying_position)
    }

    /// Hidden items as `(underlying position, index)`, ascending.
    pub fn hidden_underlying(&self) -> &[(usize, usize)] {
        &self.hidden_underlying
    }

    pub fn is_hidden_index(&self, index: usize) -> bool {
        self.hidden_to_position.contains_key(&index)
    }

    /// Hidden indexes with their would-be positions.
    pub fn hidden_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.hidden_to_position.iter().map(|(&i, &p)| (i, p))
    }
}

/// Lazily built [`VisibilityMaps`].
#[derive(Debug, Default)]
pub struct VisibilityCache {
    slot: CacheSlot<VisibilityMaps>,
}

impl VisibilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current maps, rebuilt from `underlying` after an invalidation.
    pub fn maps(
        &self,
        underlying: &dyn Layer,
        axis: Axis,
        hidden: &BTreeSet<usize>,
        strategy: HideStrategy,
    ) -> Rc<VisibilityMaps> {
        self.slot
            .get_or_build(|| VisibilityMaps::build(underlying, axis, hidden, strategy))
    }

    /// The maps if they are currently built.
    pub fn current(&self) -> Option<Rc<VisibilityMaps>> {
        self.slot.get()
    }

    pub fn is_populated(&self) -> bool {
        self.slot.is_populated()
    }

    pub fn invalidate(&self) {
        self.slot.invalidate();
    }
}
