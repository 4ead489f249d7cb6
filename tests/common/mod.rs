//! Shared stack builders and invariant checks for the integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use gridlayers::{
    visible_indexes, Axis, DataLayer, DataLayerConfig, GroupLayer, GroupModel, HideShowLayer,
    Layer, ReorderLayer, StackSnapshot,
};

/// The full stack: data -> reorder -> hide/show -> column groups.
pub type Stack = GroupLayer<HideShowLayer<ReorderLayer<DataLayer>>>;

// ============================================================================
// Builders
// ============================================================================

pub fn stack(columns: usize, rows: usize) -> Stack {
    GroupLayer::new(
        HideShowLayer::new(ReorderLayer::new(DataLayer::with_counts(columns, rows))),
        Axis::Column,
    )
}

pub fn hide_show(columns: usize, rows: usize) -> HideShowLayer<DataLayer> {
    HideShowLayer::new(DataLayer::with_counts(columns, rows))
}

/// Columns with widths 10, 20, 30, ... so every offset is distinct.
pub fn sized_data(columns: usize) -> DataLayer {
    let widths = (0..columns)
        .map(|i| (i, u32::try_from(i + 1).unwrap() * 10))
        .collect();
    DataLayer::new(DataLayerConfig {
        column_count: columns,
        row_count: 1,
        column_widths: widths,
        ..DataLayerConfig::default()
    })
}

// ============================================================================
// Invariants
// ============================================================================

/// `position_of(index_at(p)) == p` and `index_at(position_of(i)) == i`.
pub fn assert_bijection(layer: &dyn Layer, axis: Axis, index_space: usize) {
    for position in 0..layer.count(axis) {
        let index = layer
            .index_at(axis, position)
            .unwrap_or_else(|| panic!("no index at position {position}"));
        assert_eq!(layer.position_of(axis, index), Some(position), "index {index}");
    }
    for index in 0..index_space {
        if let Some(position) = layer.position_of(axis, index) {
            assert_eq!(layer.index_at(axis, position), Some(index), "position {position}");
        }
    }
    assert_eq!(layer.index_at(axis, layer.count(axis)), None);
}

/// `start(p + 1) == start(p) + size(p)` and the total is the far edge.
pub fn assert_geometry_consistent(layer: &dyn Layer, axis: Axis) {
    let count = layer.count(axis);
    for position in 0..count {
        let start = layer.start_offset_at(axis, position).unwrap();
        let size = layer.size_at(axis, position).unwrap();
        match layer.start_offset_at(axis, position + 1) {
            Some(next) => assert_eq!(next, start + size, "position {position}"),
            None => assert_eq!(layer.total_size(axis), start + size),
        }
    }
    if count == 0 {
        assert_eq!(layer.total_size(axis), 0);
    }
}

/// Fails unless `layer` looks exactly like `before`.
pub fn assert_unchanged(before: &StackSnapshot, layer: &dyn Layer) {
    assert_eq!(&StackSnapshot::capture(layer), before);
}

/// Layout and group membership of a group layer.
pub fn capture_groups<L: Layer>(layer: &GroupLayer<L>) -> (StackSnapshot, GroupModel) {
    (StackSnapshot::capture(layer), layer.model().clone())
}

/// Fails unless neither the layout nor the group model of `layer` changed.
pub fn assert_groups_unchanged<L: Layer>(before: &(StackSnapshot, GroupModel), layer: &GroupLayer<L>) {
    assert_unchanged(&before.0, layer);
    assert_eq!(layer.model(), &before.1, "group model changed");
}

pub fn columns(layer: &dyn Layer) -> Vec<usize> {
    visible_indexes(layer, Axis::Column)
}
