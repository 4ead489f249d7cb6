//! Column groups: collapse, spans and reorder coercion.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use common::{
    assert_bijection, assert_groups_unchanged, assert_unchanged, capture_groups, columns, stack,
};
use gridlayers::{
    Axis, DataLayer, GroupLayer, HideShowLayer, Layer, LayerCommand, LayerEvent, ReorderLayer,
    ReorderPolicy, StackSnapshot,
};

#[test]
fn test_collapse_with_static_member() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[5, 6, 7, 8]);
    grid.set_static_indexes("G", &[6]);
    grid.do_command(&LayerCommand::CollapseGroup {
        axis: Axis::Column,
        position: 5,
    });
    assert_eq!(grid.span_for(5), 1);
    assert_eq!(columns(&grid), vec![0, 1, 2, 3, 4, 6, 9]);
    assert_bijection(&grid, Axis::Column, 10);
}

#[test]
fn test_expand_restores_members() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[5, 6, 7, 8]);
    grid.set_collapsed("G", true);
    assert_eq!(columns(&grid), vec![0, 1, 2, 3, 4, 5, 9]);

    let events = grid.do_command(&LayerCommand::ExpandGroup {
        axis: Axis::Column,
        position: 5,
    });
    assert!(matches!(events[0], LayerEvent::Shown { .. }));
    assert_eq!(grid.count(Axis::Column), 10);
    assert_eq!(grid.span_for(5), 4);
}

#[test]
fn test_toggle_twice_is_identity() {
    let mut grid = stack(8, 1);
    grid.add_group("G", &[1, 2, 3]);
    let before = StackSnapshot::capture(&grid);
    let toggle = LayerCommand::ToggleGroup {
        axis: Axis::Column,
        position: 2,
    };
    grid.do_command(&toggle);
    assert_eq!(grid.count(Axis::Column), 6);
    // Position 1 still holds the group's placeholder.
    grid.do_command(&LayerCommand::ToggleGroup {
        axis: Axis::Column,
        position: 1,
    });
    assert_unchanged(&before, &grid);
}

#[test]
fn test_uncollapseable_group_stays_open() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[1, 2]);
    grid.set_collapseable("G", false);
    assert!(grid.set_collapsed("G", true).is_empty());
    assert_eq!(grid.count(Axis::Column), 6);
    assert!(grid.model().group_by_name("G").unwrap().is_collapsed());
}

#[test]
fn test_collapse_respects_hidden_members() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[1, 2, 3]);
    grid.do_command(&LayerCommand::HideIndexes {
        axis: Axis::Column,
        indexes: vec![1],
    });
    grid.set_collapsed("G", true);
    // Index 1 is hidden beneath, so index 2 is the first visible member.
    assert_eq!(columns(&grid), vec![0, 2, 4, 5]);
    assert_eq!(grid.span_for(1), 1);
}

#[test]
fn test_span_is_zero_when_nothing_visible() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[1, 2]);
    grid.set_static_indexes("G", &[2]);
    grid.do_command(&LayerCommand::HideIndexes {
        axis: Axis::Column,
        indexes: vec![2],
    });
    grid.set_collapsed("G", true);
    assert_eq!(grid.span_for(1), 0);
    assert_eq!(grid.span_for(0), 1);
}

#[test]
fn test_span_through_upper_layer() {
    let mut top = HideShowLayer::new(GroupLayer::new(DataLayer::with_counts(6, 1), Axis::Column));
    top.do_command(&LayerCommand::CreateGroup {
        axis: Axis::Column,
        name: "G".into(),
        positions: vec![1, 2, 3],
    });
    top.hide_indexes(Axis::Column, &[2]);
    assert_eq!(top.inner().span_for(1), 3);
    assert_eq!(top.inner().span_in(1, &top), 2);
}

#[test]
fn test_create_and_ungroup_commands() {
    let mut grid = stack(6, 1);
    grid.do_command(&LayerCommand::CreateGroup {
        axis: Axis::Column,
        name: "G".into(),
        positions: vec![1, 2, 3],
    });
    assert!(grid.model().is_a_group("G"));
    grid.do_command(&LayerCommand::Ungroup {
        axis: Axis::Column,
        positions: vec![2],
    });
    assert_eq!(grid.model().group_by_name("G").unwrap().members(), &[1, 3]);
    assert!(!grid.model().is_part_of_a_group(2));
}

#[test]
fn test_unbreakable_member_move_leaves_model_unchanged() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[0, 1]);
    grid.set_unbreakable("G", true);
    let before = capture_groups(&grid);

    let events = grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![1],
        to: 5,
    });
    assert!(events.is_empty());
    assert_groups_unchanged(&before, &grid);
}

#[test]
fn test_unbreakable_move_is_clamped_inside_group() {
    let mut grid = stack(8, 1);
    grid.add_group("G", &[2, 3, 4]);
    grid.set_unbreakable("G", true);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![2],
        to: 7,
    });
    assert_eq!(columns(&grid), vec![0, 1, 3, 4, 2, 5, 6, 7]);
    assert_eq!(grid.model().group_by_name("G").unwrap().members(), &[2, 3, 4]);
}

#[test]
fn test_foreign_drop_moves_to_edge_of_unbreakable_group() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5, 6]);
    grid.set_unbreakable("G", true);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![0],
        to: 4,
    });
    assert_eq!(columns(&grid), vec![1, 2, 0, 3, 4, 5, 6, 7, 8, 9]);
    assert!(!grid.model().is_part_of_a_group(0));
}

#[test]
fn test_mixed_unbreakable_move_is_noop() {
    let mut grid = stack(8, 1);
    grid.add_group("G", &[2, 3]);
    grid.set_unbreakable("G", true);
    let before = capture_groups(&grid);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![3, 6],
        to: 0,
    });
    assert_groups_unchanged(&before, &grid);
}

#[test]
fn test_strict_policy_rejects() {
    let mut grid = GroupLayer::with_policy(
        HideShowLayer::new(ReorderLayer::new(DataLayer::with_counts(8, 1))),
        Axis::Column,
        ReorderPolicy::Strict,
    );
    grid.add_group("G", &[2, 3, 4]);
    grid.set_unbreakable("G", true);
    let before = capture_groups(&grid);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![2],
        to: 7,
    });
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![0],
        to: 3,
    });
    assert_groups_unchanged(&before, &grid);

    // Moves within the group are still fine.
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![2],
        to: 5,
    });
    assert_eq!(columns(&grid), vec![0, 1, 3, 4, 2, 5, 6, 7]);
}

#[test]
fn test_reorder_without_reorder_layer_changes_nothing() {
    let mut grid = GroupLayer::new(DataLayer::with_counts(10, 1), Axis::Column);
    grid.add_group("G", &[3, 4, 5]);
    let before = capture_groups(&grid);
    // A drop inside the group would join it, but nothing beneath can move.
    let events = grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![8],
        to: 4,
    });
    assert!(events.is_empty());
    assert_groups_unchanged(&before, &grid);
    assert_eq!(grid.span_for(3), 3);
    assert_eq!(grid.group_cell_start(6), Some(6));
}

#[test]
fn test_in_place_reorder_into_group_changes_nothing() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5]);
    let before = capture_groups(&grid);
    let events = grid.do_command(&LayerCommand::ReorderIntoGroup {
        axis: Axis::Column,
        from: vec![6],
        to: 6,
    });
    assert!(events.is_empty());
    assert_groups_unchanged(&before, &grid);
}

#[test]
fn test_drop_inside_breakable_group_joins_it() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5]);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![8],
        to: 4,
    });
    assert_eq!(columns(&grid), vec![0, 1, 2, 3, 8, 4, 5, 6, 7, 9]);
    assert_eq!(grid.model().group_by_index(8).unwrap().name(), "G");
}

#[test]
fn test_member_dropped_outside_leaves_group() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5]);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![4],
        to: 9,
    });
    assert_eq!(columns(&grid), vec![0, 1, 2, 3, 5, 6, 7, 8, 4, 9]);
    assert!(!grid.model().is_part_of_a_group(4));
    assert_eq!(grid.model().group_by_name("G").unwrap().members(), &[3, 5]);
}

#[test]
fn test_plain_reorder_on_edge_does_not_join() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5]);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![8],
        to: 6,
    });
    assert!(!grid.model().is_part_of_a_group(8));
}

#[test]
fn test_reorder_into_group_on_edge_joins() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[3, 4, 5]);
    grid.do_command(&LayerCommand::ReorderIntoGroup {
        axis: Axis::Column,
        from: vec![8],
        to: 6,
    });
    assert_eq!(grid.model().group_by_index(8).unwrap().name(), "G");
    assert_eq!(grid.span_for(3), 4);
}

#[test]
fn test_reorder_into_group_between_two_groups() {
    let mut grid = stack(10, 1);
    grid.add_group("A", &[1, 2]);
    grid.add_group("B", &[3, 4, 5]);
    grid.do_command(&LayerCommand::ReorderIntoGroup {
        axis: Axis::Column,
        from: vec![8],
        to: 3,
    });
    // A's last member (2) is closer to the drop at 3 than B's (5).
    assert_eq!(grid.model().group_by_index(8).unwrap().name(), "A");
    assert_eq!(columns(&grid), vec![0, 1, 2, 8, 3, 4, 5, 6, 7, 9]);
}

#[test]
fn test_group_cell_start_after_reorder() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[1, 2]);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![0],
        to: 6,
    });
    // Columns: 1 2 3 4 5 0.
    assert_eq!(grid.group_cell_start(1), Some(0));
    assert_eq!(grid.group_cell_start(4), Some(4));
    assert_eq!(grid.group_at(0).unwrap().name(), "G");
}

#[test]
fn test_delete_drops_emptied_group() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[2]);
    grid.do_command(&LayerCommand::DeleteItems {
        axis: Axis::Column,
        positions: vec![2],
    });
    assert!(!grid.model().is_a_group("G"));
}

#[test]
fn test_insert_shifts_membership() {
    let mut grid = stack(6, 1);
    grid.add_group("G", &[2, 3]);
    grid.do_command(&LayerCommand::InsertItems {
        axis: Axis::Column,
        position: 0,
        count: 2,
    });
    assert_eq!(grid.model().group_by_name("G").unwrap().members(), &[4, 5]);
}

/// A hide layer above a collapsed group, with index 5 hidden at the top.
fn hidden_above_collapsed_group() -> HideShowLayer<GroupLayer<DataLayer>> {
    let mut top = HideShowLayer::new(GroupLayer::new(DataLayer::with_counts(8, 1), Axis::Column));
    top.do_command(&LayerCommand::CreateGroup {
        axis: Axis::Column,
        name: "G".into(),
        positions: vec![1, 2, 3],
    });
    top.do_command(&LayerCommand::CollapseGroup {
        axis: Axis::Column,
        position: 1,
    });
    top.hide_indexes(Axis::Column, &[5]);
    assert_eq!(columns(&top), vec![0, 1, 4, 6, 7]);
    top
}

#[test]
fn test_deleting_placeholder_keeps_hidden_indexes_above() {
    let mut top = hidden_above_collapsed_group();
    let events = top.do_command(&LayerCommand::DeleteItems {
        axis: Axis::Column,
        positions: vec![1],
    });
    assert!(matches!(events[0], LayerEvent::Deleted { .. }));
    assert!(matches!(events[1], LayerEvent::Shown { .. }));
    // Old 5 is now 4 and stays hidden; old 2 became the placeholder 1.
    assert_eq!(top.hidden_indexes(Axis::Column), vec![4]);
    assert_eq!(columns(&top), vec![0, 1, 3, 5, 6]);
    assert_bijection(&top, Axis::Column, 7);
}

#[test]
fn test_insert_below_collapsed_group_keeps_hidden_indexes_above() {
    let mut top = hidden_above_collapsed_group();
    top.do_command(&LayerCommand::InsertItems {
        axis: Axis::Column,
        position: 0,
        count: 1,
    });
    assert_eq!(top.hidden_indexes(Axis::Column), vec![6]);
    assert_eq!(top.inner().model().group_by_name("G").unwrap().members(), &[2, 3, 4]);
    assert_eq!(columns(&top), vec![0, 1, 2, 5, 7, 8]);
}
