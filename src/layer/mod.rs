//! The layer abstraction and the base layers.
//!
//! A layer maps its own positions to the positions and indexes of the single
//! layer it wraps. Stacks are built by ownership: every transforming layer owns
//! exactly one underlying layer, so a stack is a chain by construction.
//!
//! - [`DataLayer`] is the bottom of every stack: position == index.
//! - [`ReorderLayer`] permutes the order of the layer below.
//! - [`crate::HideShowLayer`] and [`crate::GroupLayer`] remove positions.

mod data;
mod reorder;

pub use data::{DataLayer, DataLayerConfig, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use reorder::ReorderLayer;

use serde::Serialize;

use crate::axis::Axis;
use crate::command::LayerCommand;
use crate::event::LayerEvent;
use crate::persistence::Properties;

/// Query and command surface shared by every layer.
///
/// Out-of-range positions and indexes yield `None`; nothing here panics.
pub trait Layer {
    /// Number of positions on `axis`.
    fn count(&self, axis: Axis) -> usize;

    /// Index of the item at `position`.
    fn index_at(&self, axis: Axis, position: usize) -> Option<usize>;

    /// Position of the item with `index`, if it is visible through this layer.
    fn position_of(&self, axis: Axis, index: usize) -> Option<usize>;

    /// Pixel size of the item at `position`.
    fn size_at(&self, axis: Axis, position: usize) -> Option<u32>;

    /// Pixel offset of the leading edge of `position`.
    fn start_offset_at(&self, axis: Axis, position: usize) -> Option<u32>;

    /// Total pixel extent of the axis.
    fn total_size(&self, axis: Axis) -> u32 {
        let count = self.count(axis);
        if count == 0 {
            return 0;
        }
        let last = count - 1;
        let start = self.start_offset_at(axis, last).unwrap_or(0);
        start.saturating_add(self.size_at(axis, last).unwrap_or(0))
    }

    /// Position covering pixel `offset`, by binary search over start offsets.
    fn position_at_offset(&self, axis: Axis, offset: u32) -> Option<usize> {
        let count = self.count(axis);
        if count == 0 || offset >= self.total_size(axis) {
            return None;
        }
        let (mut low, mut high) = (0usize, count);
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if self.start_offset_at(axis, mid)? <= offset {
                low = mid;
            } else {
                high = mid;
            }
        }
        Some(low)
    }

    /// Convert a local position to the position of the layer beneath.
    fn to_underlying(&self, axis: Axis, position: usize) -> Option<usize>;

    /// Convert a position of the layer beneath to a local position.
    fn from_underlying(&self, axis: Axis, underlying_position: usize) -> Option<usize>;

    /// The wrapped layer, `None` at the bottom of the stack.
    fn underlying(&self) -> Option<&dyn Layer>;

    /// Mutable access to the wrapped layer.
    fn underlying_mut(&mut self) -> Option<&mut dyn Layer>;

    /// Execute `command` (handled here or forwarded down) and return the
    /// resulting events in this layer's coordinates.
    fn do_command(&mut self, command: &LayerCommand) -> Vec<LayerEvent>;

    /// Translate an event raised by the layer beneath into this layer's
    /// coordinates, updating local state.
    ///
    /// Usually one event comes back, or none when the change is invisible from
    /// here. A layer whose own state reacts to the change appends the events of
    /// that reaction after the translated one.
    fn translate_event(&mut self, event: LayerEvent) -> Vec<LayerEvent>;

    /// Materialise whatever cached mapping event translation will need, so the
    /// translation reads the mapping from before the change below happens.
    fn prepare_for_change(&self) {}

    /// Write this layer's persistent state (and that of every layer beneath).
    fn save_state(&self, prefix: &str, properties: &mut Properties) {
        if let Some(underlying) = self.underlying() {
            underlying.save_state(prefix, properties);
        }
    }

    /// Restore persistent state bottom-up and return the resulting events.
    fn load_state(&mut self, prefix: &str, properties: &Properties) -> Vec<LayerEvent> {
        let events = match self.underlying_mut() {
            Some(underlying) => underlying.load_state(prefix, properties),
            None => return Vec::new(),
        };
        events
            .into_iter()
            .flat_map(|event| self.translate_event(event))
            .collect()
    }
}

/// Forward `command` to the layer beneath `layer` and translate what comes back.
///
/// Layers call this from `do_command` for everything they do not handle
/// themselves.
pub(crate) fn forward_command<L: Layer>(layer: &mut L, command: &LayerCommand) -> Vec<LayerEvent> {
    let Some(converted) = command.convert_down(&*layer) else {
        tracing::trace!(?command, "command has no addressable positions below");
        return Vec::new();
    };
    layer.prepare_for_change();
    let events = match layer.underlying_mut() {
        Some(underlying) => underlying.do_command(&converted),
        None => return Vec::new(),
    };
    events
        .into_iter()
        .flat_map(|event| layer.translate_event(event))
        .collect()
}

/// All indexes visible on `axis`, in position order.
pub fn visible_indexes(layer: &dyn Layer, axis: Axis) -> Vec<usize> {
    (0..layer.count(axis))
        .filter_map(|p| layer.index_at(axis, p))
        .collect()
}

/// Observable state of one axis of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisSnapshot {
    pub count: usize,
    pub indexes: Vec<usize>,
    pub start_offsets: Vec<u32>,
    pub total_size: u32,
}

/// Observable state of a layer stack, compared to prove a command changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackSnapshot {
    pub columns: AxisSnapshot,
    pub rows: AxisSnapshot,
}

impl StackSnapshot {
    pub fn capture(layer: &dyn Layer) -> Self {
        Self {
            columns: capture_axis(layer, Axis::Column),
            rows: capture_axis(layer, Axis::Row),
        }
    }
}

fn capture_axis(layer: &dyn Layer, axis: Axis) -> AxisSnapshot {
    let count = layer.count(axis);
    AxisSnapshot {
        count,
        indexes: visible_indexes(layer, axis),
        start_offsets: (0..count)
            .filter_map(|p| layer.start_offset_at(axis, p))
            .collect(),
        total_size: layer.total_size(axis),
    }
}
