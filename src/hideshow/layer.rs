//! The row/column hide-show layer.

use std::collections::BTreeSet;

use super::hidden_axis::HiddenAxis;
use super::translate::translate_both;
use super::HideStrategy;
use crate::axis::{Axis, AxisPair, Direction};
use crate::command::LayerCommand;
use crate::event::LayerEvent;
use crate::layer::{forward_command, Layer};
use crate::persistence::{hidden_key, put_or_remove, read_index_list, write_index_list, Properties};

/// Hides rows and columns of the layer beneath by index.
#[derive(Debug)]
pub struct HideShowLayer<L> {
    underlying: L,
    axes: AxisPair<HiddenAxis>,
}

impl<L: Layer> HideShowLayer<L> {
    pub fn new(underlying: L) -> Self {
        Self::with_strategy(underlying, HideStrategy::Remove)
    }

    pub fn with_strategy(underlying: L, strategy: HideStrategy) -> Self {
        Self {
            underlying,
            axes: AxisPair::new(
                HiddenAxis::new(Axis::Column, strategy),
                HiddenAxis::new(Axis::Row, strategy),
            ),
        }
    }

    pub fn inner(&self) -> &L {
        &self.underlying
    }

    pub fn strategy(&self) -> HideStrategy {
        self.axes.columns.strategy()
    }

    /// Hide the items at these local positions.
    pub fn hide_positions(&mut self, axis: Axis, positions: &[usize]) -> Option<LayerEvent> {
        let indexes: Vec<usize> = positions
            .iter()
            .filter_map(|&p| self.index_at(axis, p))
            .collect();
        self.hide_indexes(axis, &indexes)
    }

    pub fn hide_indexes(&mut self, axis: Axis, indexes: &[usize]) -> Option<LayerEvent> {
        self.axes.get_mut(axis).hide(&self.underlying, indexes)
    }

    pub fn show_indexes(&mut self, axis: Axis, indexes: &[usize]) -> Option<LayerEvent> {
        self.axes.get_mut(axis).show(&self.underlying, indexes)
    }

    pub fn show_all(&mut self, axis: Axis) -> Option<LayerEvent> {
        self.axes.get_mut(axis).show_all(&self.underlying)
    }

    pub fn show_adjacent(
        &mut self,
        axis: Axis,
        position: usize,
        direction: Direction,
        all: bool,
    ) -> Option<LayerEvent> {
        self.axes
            .get_mut(axis)
            .show_adjacent(&self.underlying, position, direction, all)
    }

    pub fn is_hidden(&self, axis: Axis, index: usize) -> bool {
        self.axes.get(axis).mapper().is_hidden(index)
    }

    /// Hidden indexes, ascending.
    pub fn hidden_indexes(&self, axis: Axis) -> Vec<usize> {
        self.axes.get(axis).mapper().hidden_indexes()
    }

    pub fn has_hidden(&self, axis: Axis) -> bool {
        self.axes.get(axis).mapper().has_hidden()
    }

    /// Position a hidden index would take if it were shown now.
    pub fn position_of_hidden(&self, axis: Axis, index: usize) -> Option<usize> {
        self.axes.get(axis).position_of_hidden(&self.underlying, index)
    }

    pub fn has_hidden_neighbor(&self, axis: Axis, position: usize, direction: Direction) -> bool {
        self.axes
            .get(axis)
            .has_hidden_neighbor(&self.underlying, position, direction)
    }

    /// Start offsets of every position on `axis` plus the trailing edge.
    pub fn start_offsets(&self, axis: Axis) -> Vec<u32> {
        self.axes.get(axis).start_offsets(&self.underlying)
    }
}

impl<L: Layer> Layer for HideShowLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        self.axes.get(axis).count(&self.underlying)
    }

    fn index_at(&self, axis: Axis, position: usize) -> Option<usize> {
        self.axes.get(axis).index_at(&self.underlying, position)
    }

    fn position_of(&self, axis: Axis, index: usize) -> Option<usize> {
        self.axes.get(axis).position_of(&self.underlying, index)
    }

    fn size_at(&self, axis: Axis, position: usize) -> Option<u32> {
        self.axes.get(axis).size_at(&self.underlying, position)
    }

    fn start_offset_at(&self, axis: Axis, position: usize) -> Option<u32> {
        self.axes.get(axis).start_offset_at(&self.underlying, position)
    }

    fn to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        self.axes.get(axis).to_underlying(&self.underlying, position)
    }

    fn from_underlying(&self, axis: Axis, underlying_position: usize) -> Option<usize> {
        self.axes
            .get(axis)
            .from_underlying(&self.underlying, underlying_position)
    }

    fn underlying(&self) -> Option<&dyn Layer> {
        Some(&self.underlying)
    }

    fn underlying_mut(&mut self) -> Option<&mut dyn Layer> {
        Some(&mut self.underlying)
    }

    fn do_command(&mut self, command: &LayerCommand) -> Vec<LayerEvent> {
        let event = match command {
            LayerCommand::HidePositions { axis, positions } => self.hide_positions(*axis, positions),
            LayerCommand::HideIndexes { axis, indexes } => self.hide_indexes(*axis, indexes),
            LayerCommand::ShowIndexes { axis, indexes } => self.show_indexes(*axis, indexes),
            LayerCommand::ShowAll { axis } => self.show_all(*axis),
            LayerCommand::ShowAdjacent {
                axis,
                position,
                direction,
                all,
            } => self.show_adjacent(*axis, *position, *direction, *all),
            _ => return forward_command(self, command),
        };
        event.into_iter().collect()
    }

    fn translate_event(&mut self, event: LayerEvent) -> Vec<LayerEvent> {
        translate_both(&mut self.axes, &self.underlying, event)
            .into_iter()
            .collect()
    }

    fn prepare_for_change(&self) {
        self.axes.columns.warm(&self.underlying);
        self.axes.rows.warm(&self.underlying);
    }

    fn save_state(&self, prefix: &str, properties: &mut Properties) {
        self.underlying.save_state(prefix, properties);
        for axis in [Axis::Column, Axis::Row] {
            put_or_remove(
                properties,
                hidden_key(prefix, axis),
                write_index_list(self.hidden_indexes(axis)),
            );
        }
    }

    fn load_state(&mut self, prefix: &str, properties: &Properties) -> Vec<LayerEvent> {
        self.prepare_for_change();
        let mut events: Vec<LayerEvent> = self
            .underlying
            .load_state(prefix, properties)
            .into_iter()
            .flat_map(|event| self.translate_event(event))
            .collect();

        let mut changed = false;
        for axis in [Axis::Column, Axis::Row] {
            let hidden: BTreeSet<usize> = properties
                .get(&hidden_key(prefix, axis))
                .map(|value| read_index_list(value))
                .unwrap_or_default()
                .into_iter()
                .collect();
            changed |= self.axes.get_mut(axis).replace_hidden(hidden);
        }
        if changed {
            tracing::debug!(prefix, "restored hidden indexes");
            events.push(LayerEvent::StructureReset);
        }
        events
    }
}
