//! Saving and restoring a whole stack through flat properties.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use common::{columns, stack, Stack};
use gridlayers::persistence::{format_properties, parse_properties};
use gridlayers::{
    Axis, DataLayer, GroupLayer, Layer, LayerCommand, LayerEvent, Properties, StackSnapshot,
};

const PREFIX: &str = "grid";

fn props(entries: &[(&str, &str)]) -> Properties {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A stack with some of every kind of state.
fn busy_stack() -> Stack {
    let mut grid = stack(10, 4);
    grid.do_command(&LayerCommand::Reorder {
        axis: Axis::Column,
        from: vec![0],
        to: 3,
    });
    grid.do_command(&LayerCommand::HideIndexes {
        axis: Axis::Column,
        indexes: vec![5],
    });
    // Position 0 now shows index 1.
    grid.do_command(&LayerCommand::Resize {
        axis: Axis::Column,
        position: 0,
        size: 30,
    });
    grid.add_group("groupA", &[6, 7]);
    grid.set_collapsed("groupA", true);
    grid
}

#[test]
fn test_saved_values() {
    let grid = busy_stack();
    let mut properties = Properties::new();
    grid.save_state(PREFIX, &mut properties);

    assert_eq!(
        properties,
        props(&[
            ("grid.columnGroups", "groupA=collapsed:collapseable:breakable:6,7,|"),
            ("grid.columnIndexOrder", "1,2,0,3,4,5,6,7,8,9,"),
            ("grid.columnWidths", "1:30,"),
            ("grid.hiddenColumnIndexes", "5,"),
            ("grid.rowIndexOrder", "0,1,2,3,"),
        ])
    );
}

#[test]
fn test_save_load_save_is_stable() {
    let grid = busy_stack();
    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);

    let mut restored = stack(10, 4);
    let events = restored.load_state(PREFIX, &saved);
    assert!(events.contains(&LayerEvent::StructureReset));

    assert_eq!(StackSnapshot::capture(&restored), StackSnapshot::capture(&grid));
    assert_eq!(columns(&restored), vec![1, 2, 0, 3, 4, 6, 8, 9]);
    assert_eq!(restored.model(), grid.model());

    let mut resaved = Properties::new();
    restored.save_state(PREFIX, &mut resaved);
    assert_eq!(resaved, saved);
}

#[test]
fn test_group_record_restores_membership_and_flags() {
    let mut grid = stack(10, 1);
    grid.add_group("groupA", &[1, 2, 3]);
    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);
    assert_eq!(
        saved.get("grid.columnGroups").map(String::as_str),
        Some("groupA=expanded:collapseable:breakable:1,2,3,|")
    );

    let mut restored = stack(10, 1);
    restored.load_state(PREFIX, &saved);
    for index in 0..10 {
        assert_eq!(
            restored.model().is_part_of_a_group(index),
            grid.model().is_part_of_a_group(index),
            "index {index}"
        );
        assert_eq!(
            restored.model().group_by_index(index).map(|g| g.name().to_string()),
            grid.model().group_by_index(index).map(|g| g.name().to_string()),
        );
    }
    let group = restored.model().group_by_name("groupA").unwrap();
    assert!(!group.is_collapsed());
    assert!(group.is_collapseable());
    assert!(!group.is_unbreakable());
}

#[test]
fn test_static_members_round_trip() {
    let mut grid = stack(10, 1);
    grid.add_group("G", &[5, 6, 7, 8]);
    grid.set_static_indexes("G", &[6]);
    grid.set_collapsed("G", true);
    grid.set_unbreakable("G", true);
    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);
    assert_eq!(
        saved.get("grid.columnGroups").map(String::as_str),
        Some("G=collapsed:collapseable:unbreakable:5,6,7,8,:6,|")
    );

    let mut restored = stack(10, 1);
    restored.load_state(PREFIX, &saved);
    assert_eq!(columns(&restored), vec![0, 1, 2, 3, 4, 6, 9]);
    assert_eq!(restored.span_for(5), 1);
}

#[test]
fn test_bad_records_are_skipped_whole() {
    let properties = props(&[
        (
            "grid.columnGroups",
            "broken|g1=expanded:collapseable:breakable:1,x,|\
             g2=expanded:collapseable:breakable:2,3,|\
             g3=expanded:collapseable:breakable:3,4,|\
             g4=sideways:collapseable:breakable:5,|",
        ),
        ("grid.hiddenColumnIndexes", "7,x,8,"),
    ]);
    let mut grid = stack(10, 1);
    grid.load_state(PREFIX, &properties);

    let names: Vec<&str> = grid.model().groups().iter().map(|g| g.name()).collect();
    assert_eq!(names, vec!["g2"]);
    assert!(!grid.model().is_part_of_a_group(1));
    assert!(!grid.model().is_part_of_a_group(4));
    assert_eq!(grid.inner().hidden_indexes(Axis::Column), vec![7, 8]);
}

#[test]
fn test_order_that_is_not_a_permutation_is_ignored() {
    let properties = props(&[("grid.columnIndexOrder", "0,1,1,")]);
    let mut grid = stack(3, 1);
    assert!(grid.load_state(PREFIX, &properties).is_empty());
    assert_eq!(columns(&grid), vec![0, 1, 2]);
}

#[test]
fn test_empty_state_removes_stale_keys() {
    let mut properties = props(&[
        ("grid.hiddenColumnIndexes", "3,"),
        ("grid.columnGroups", "old=expanded:collapseable:breakable:1,|"),
        ("grid.columnWidths", "0:5,"),
        ("other.hiddenColumnIndexes", "1,"),
    ]);
    stack(4, 1).save_state(PREFIX, &mut properties);

    assert!(!properties.contains_key("grid.hiddenColumnIndexes"));
    assert!(!properties.contains_key("grid.columnGroups"));
    assert!(!properties.contains_key("grid.columnWidths"));
    assert_eq!(properties.get("grid.columnIndexOrder").map(String::as_str), Some("0,1,2,3,"));
    assert!(properties.contains_key("other.hiddenColumnIndexes"));
}

#[test]
fn test_loading_nothing_resets_state() {
    let mut grid = busy_stack();
    let events = grid.load_state(PREFIX, &Properties::new());
    assert!(!events.is_empty());
    // Orders are only restored when present, so the reorder survives.
    assert_eq!(columns(&grid), vec![1, 2, 0, 3, 4, 5, 6, 7, 8, 9]);
    assert!(grid.model().is_empty());
    assert_eq!(grid.size_at(Axis::Column, 0), Some(64));
}

#[test]
fn test_row_groups_use_row_key() {
    let mut grid = GroupLayer::new(DataLayer::with_counts(2, 6), Axis::Row);
    grid.add_group("totals", &[4, 5]);
    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);
    assert_eq!(
        saved.get("grid.rowGroups").map(String::as_str),
        Some("totals=expanded:collapseable:breakable:4,5,|")
    );
    assert!(!saved.contains_key("grid.columnGroups"));
}

#[test]
fn test_properties_text_round_trip() {
    let grid = busy_stack();
    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);

    let text = format_properties(&saved);
    assert!(text.contains("grid.hiddenColumnIndexes=5,\n"));
    let parsed = parse_properties(&format!("# saved grid\n\n{text}"));
    assert_eq!(parsed, saved);
}

#[test]
fn test_group_names_with_separators_are_refused() {
    let mut grid = stack(6, 1);
    assert!(!grid.add_group("a=b", &[1]));
    assert!(!grid.add_group("x|y", &[2]));
    assert!(!grid.add_group(" padded ", &[3]));
    assert!(grid.add_group("Q1: sales", &[4, 5]));

    let mut saved = Properties::new();
    grid.save_state(PREFIX, &mut saved);
    assert_eq!(
        saved.get("grid.columnGroups").map(String::as_str),
        Some("Q1: sales=expanded:collapseable:breakable:4,5,|")
    );
    let mut restored = stack(6, 1);
    restored.load_state(PREFIX, &saved);
    assert_eq!(restored.model(), grid.model());
}
