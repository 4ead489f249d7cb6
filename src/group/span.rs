//! How many positions a group header cell covers.

use std::collections::BTreeSet;

use super::model::GroupModel;
use crate::axis::Axis;
use crate::layer::Layer;

/// Span of the header cell for `index` as seen through `view`.
///
/// A group member spans every member visible through `view`; a collapsed
/// group therefore spans its static members, or the single member kept as
/// its placeholder. The result is 0 only when nothing of the group is
/// visible. Anything else spans 1 when visible and 0 when not.
pub fn span_through(model: &GroupModel, view: &dyn Layer, axis: Axis, index: usize) -> usize {
    match model.group_by_index(index) {
        Some(group) => group
            .members()
            .iter()
            .filter(|&&member| view.position_of(axis, member).is_some())
            .count(),
        None => usize::from(view.position_of(axis, index).is_some()),
    }
}

/// First position of the header cell covering `position` in `view`.
pub fn cell_start_through(model: &GroupModel, view: &dyn Layer, axis: Axis, position: usize) -> Option<usize> {
    let index = view.index_at(axis, position)?;
    let Some(group) = model.group_by_index(index) else {
        return Some(position);
    };
    group
        .members()
        .iter()
        .filter_map(|&member| view.position_of(axis, member))
        .min()
}

/// Indexes a collapsed group hides: every member that is not static, keeping
/// the first visible member (by position beneath) when there are no statics.
pub(crate) fn collapsed_indexes(model: &GroupModel, underlying: &dyn Layer, axis: Axis) -> BTreeSet<usize> {
    let mut hidden = BTreeSet::new();
    for group in model.groups().iter().filter(|g| g.is_effectively_collapsed()) {
        let placeholder = if group.static_indexes().is_empty() {
            group
                .members()
                .iter()
                .filter_map(|&m| underlying.position_of(axis, m).map(|p| (p, m)))
                .min()
                .map(|(_, m)| m)
        } else {
            None
        };
        hidden.extend(
            group
                .members()
                .iter()
                .copied()
                .filter(|&m| !group.is_static(m) && Some(m) != placeholder),
        );
    }
    hidden
}
