//! Commands accepted by a layer stack.
//!
//! A command is issued against the top layer in that layer's coordinates. Each
//! layer that does not handle a command converts its positional payload to the
//! coordinates of the layer beneath and forwards it. Index-based commands pass
//! through unchanged.

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, Direction};
use crate::layer::Layer;

/// Operations exposed to collaborators (header menus, drag handlers, state loaders).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LayerCommand {
    /// Hide the items at these positions.
    HidePositions { axis: Axis, positions: Vec<usize> },
    /// Hide items by index.
    HideIndexes { axis: Axis, indexes: Vec<usize> },
    /// Show items by index. Indexes that are not hidden are ignored.
    ShowIndexes { axis: Axis, indexes: Vec<usize> },
    /// Show every hidden item on the axis.
    ShowAll { axis: Axis },
    /// Reveal hidden neighbours of `position` in `direction`; all of them when
    /// `all` is set, otherwise only the nearest.
    ShowAdjacent {
        axis: Axis,
        position: usize,
        direction: Direction,
        all: bool,
    },
    /// Move the items at `from` so they are inserted before position `to`
    /// (`to == count` appends).
    Reorder {
        axis: Axis,
        from: Vec<usize>,
        to: usize,
    },
    /// Like `Reorder`, but the moved items join the group at the destination,
    /// including when the drop lands exactly on a group edge.
    ReorderIntoGroup {
        axis: Axis,
        from: Vec<usize>,
        to: usize,
    },
    /// Create a group from the items at `positions`.
    CreateGroup {
        axis: Axis,
        name: String,
        positions: Vec<usize>,
    },
    /// Remove the items at `positions` from their groups.
    Ungroup { axis: Axis, positions: Vec<usize> },
    /// Collapse the group containing `position`.
    CollapseGroup { axis: Axis, position: usize },
    /// Expand the group containing `position`.
    ExpandGroup { axis: Axis, position: usize },
    /// Toggle the group containing `position`.
    ToggleGroup { axis: Axis, position: usize },
    /// Insert `count` new items before `position`.
    InsertItems {
        axis: Axis,
        position: usize,
        count: usize,
    },
    /// Physically remove the items at `positions`.
    DeleteItems { axis: Axis, positions: Vec<usize> },
    /// Set the pixel size of the item at `position`.
    Resize {
        axis: Axis,
        position: usize,
        size: u32,
    },
    /// Pixel geometry changed globally (font, DPI).
    VisualRefresh,
}

impl LayerCommand {
    /// The axis this command acts on, if any.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            LayerCommand::HidePositions { axis, .. }
            | LayerCommand::HideIndexes { axis, .. }
            | LayerCommand::ShowIndexes { axis, .. }
            | LayerCommand::ShowAll { axis }
            | LayerCommand::ShowAdjacent { axis, .. }
            | LayerCommand::Reorder { axis, .. }
            | LayerCommand::ReorderIntoGroup { axis, .. }
            | LayerCommand::CreateGroup { axis, .. }
            | LayerCommand::Ungroup { axis, .. }
            | LayerCommand::CollapseGroup { axis, .. }
            | LayerCommand::ExpandGroup { axis, .. }
            | LayerCommand::ToggleGroup { axis, .. }
            | LayerCommand::InsertItems { axis, .. }
            | LayerCommand::DeleteItems { axis, .. }
            | LayerCommand::Resize { axis, .. } => Some(*axis),
            LayerCommand::VisualRefresh => None,
        }
    }

    /// Re-express this command in the coordinates of the layer beneath `layer`.
    ///
    /// Returns `None` when nothing addressable remains (every position was out
    /// of range), in which case the command is dropped as a no-op.
    pub fn convert_down<L: Layer + ?Sized>(&self, layer: &L) -> Option<LayerCommand> {
        let down = |axis: Axis, positions: &[usize]| -> Option<Vec<usize>> {
            let converted: Vec<usize> = positions
                .iter()
                .filter_map(|&p| layer.to_underlying(axis, p))
                .collect();
            (!converted.is_empty()).then_some(converted)
        };

        let converted = match self {
            LayerCommand::HidePositions { axis, positions } => LayerCommand::HidePositions {
                axis: *axis,
                positions: down(*axis, positions)?,
            },
            LayerCommand::ShowAdjacent {
                axis,
                position,
                direction,
                all,
            } => LayerCommand::ShowAdjacent {
                axis: *axis,
                position: layer.to_underlying(*axis, *position)?,
                direction: *direction,
                all: *all,
            },
            LayerCommand::Reorder { axis, from, to } => {
                let toward_end = from.iter().all(|f| f < to);
                LayerCommand::Reorder {
                    axis: *axis,
                    from: down(*axis, from)?,
                    to: insertion_point_down(layer, *axis, *to, toward_end)?,
                }
            }
            LayerCommand::ReorderIntoGroup { axis, from, to } => {
                let toward_end = from.iter().all(|f| f < to);
                LayerCommand::ReorderIntoGroup {
                    axis: *axis,
                    from: down(*axis, from)?,
                    to: insertion_point_down(layer, *axis, *to, toward_end)?,
                }
            }
            LayerCommand::CreateGroup {
                axis,
                name,
                positions,
            } => LayerCommand::CreateGroup {
                axis: *axis,
                name: name.clone(),
                positions: down(*axis, positions)?,
            },
            LayerCommand::Ungroup { axis, positions } => LayerCommand::Ungroup {
                axis: *axis,
                positions: down(*axis, positions)?,
            },
            LayerCommand::CollapseGroup { axis, position } => LayerCommand::CollapseGroup {
                axis: *axis,
                position: layer.to_underlying(*axis, *position)?,
            },
            LayerCommand::ExpandGroup { axis, position } => LayerCommand::ExpandGroup {
                axis: *axis,
                position: layer.to_underlying(*axis, *position)?,
            },
            LayerCommand::ToggleGroup { axis, position } => LayerCommand::ToggleGroup {
                axis: *axis,
                position: layer.to_underlying(*axis, *position)?,
            },
            LayerCommand::InsertItems {
                axis,
                position,
                count,
            } => LayerCommand::InsertItems {
                axis: *axis,
                position: insertion_point_down(layer, *axis, *position, false)?,
                count: *count,
            },
            LayerCommand::DeleteItems { axis, positions } => LayerCommand::DeleteItems {
                axis: *axis,
                positions: down(*axis, positions)?,
            },
            LayerCommand::Resize {
                axis,
                position,
                size,
            } => LayerCommand::Resize {
                axis: *axis,
                position: layer.to_underlying(*axis, *position)?,
                size: *size,
            },
            LayerCommand::HideIndexes { .. }
            | LayerCommand::ShowIndexes { .. }
            | LayerCommand::ShowAll { .. }
            | LayerCommand::VisualRefresh => self.clone(),
        };
        Some(converted)
    }
}

/// Convert an insertion point ("before position `to`") to underlying coordinates.
///
/// Items hidden between two visible positions have no local coordinate, so the
/// drop is anchored to the visible neighbour in the direction of movement:
/// moving toward the end inserts right after the visible item at `to - 1`,
/// moving toward the start inserts right before the visible item at `to`.
fn insertion_point_down<L: Layer + ?Sized>(
    layer: &L,
    axis: Axis,
    to: usize,
    toward_end: bool,
) -> Option<usize> {
    let count = layer.count(axis);
    if count == 0 {
        return layer.underlying().map(|u| u.count(axis));
    }
    if to >= count || (toward_end && to > 0) {
        let anchor = to.min(count) - 1;
        return layer.to_underlying(axis, anchor).map(|u| u + 1);
    }
    layer.to_underlying(axis, to)
}
