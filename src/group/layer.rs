//! The grouping layer.

use std::collections::BTreeSet;

use super::coerce::{plan_reorder, ReorderPolicy};
use super::model::{Group, GroupModel};
use super::span::{cell_start_through, collapsed_indexes, span_through};
use crate::axis::Axis;
use crate::command::LayerCommand;
use crate::event::LayerEvent;
use crate::hideshow::translate::sorted;
use crate::hideshow::{HiddenAxis, HideStrategy};
use crate::layer::{forward_command, Layer};
use crate::persistence::{groups_key, put_or_remove, read_groups, write_groups, Properties};

/// Groups items of one axis and hides the non-static members of collapsed
/// groups. The other axis passes straight through.
#[derive(Debug)]
pub struct GroupLayer<L> {
    underlying: L,
    axis: Axis,
    model: GroupModel,
    collapse: HiddenAxis,
    policy: ReorderPolicy,
}

impl<L: Layer> GroupLayer<L> {
    pub fn new(underlying: L, axis: Axis) -> Self {
        Self::with_policy(underlying, axis, ReorderPolicy::default())
    }

    pub fn with_policy(underlying: L, axis: Axis, policy: ReorderPolicy) -> Self {
        Self {
            underlying,
            axis,
            model: GroupModel::new(),
            collapse: HiddenAxis::new(axis, HideStrategy::Remove),
            policy,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn model(&self) -> &GroupModel {
        &self.model
    }

    pub fn policy(&self) -> ReorderPolicy {
        self.policy
    }

    pub fn inner(&self) -> &L {
        &self.underlying
    }

    /// Group `indexes` under `name`. Indexes already in a group are skipped.
    pub fn add_group(&mut self, name: &str, indexes: &[usize]) -> bool {
        self.model.add_group(name, indexes)
    }

    pub fn add_indexes_to_group(&mut self, name: &str, indexes: &[usize]) -> Vec<LayerEvent> {
        if !self.model.add_indexes_to_group(name, indexes) {
            return Vec::new();
        }
        self.sync_collapsed()
    }

    pub fn remove_indexes_from_groups(&mut self, indexes: &[usize]) -> Vec<LayerEvent> {
        if !self.model.remove_indexes_from_groups(indexes) {
            return Vec::new();
        }
        self.sync_collapsed()
    }

    pub fn remove_group(&mut self, name: &str) -> Vec<LayerEvent> {
        if !self.model.remove_group(name) {
            return Vec::new();
        }
        self.sync_collapsed()
    }

    pub fn clear_groups(&mut self) -> Vec<LayerEvent> {
        self.model.clear();
        self.sync_collapsed()
    }

    pub fn set_static_indexes(&mut self, name: &str, statics: &[usize]) -> Vec<LayerEvent> {
        if !self.model.set_static_indexes(name, statics) {
            return Vec::new();
        }
        self.sync_collapsed()
    }

    pub fn set_collapseable(&mut self, name: &str, collapseable: bool) -> Vec<LayerEvent> {
        if !self.model.set_collapseable(name, collapseable) {
            return Vec::new();
        }
        self.sync_collapsed()
    }

    pub fn set_unbreakable(&mut self, name: &str, unbreakable: bool) -> bool {
        self.model.set_unbreakable(name, unbreakable)
    }

    pub fn set_collapsed(&mut self, name: &str, collapsed: bool) -> Vec<LayerEvent> {
        if !self.model.set_collapsed(name, collapsed) {
            return Vec::new();
        }
        tracing::debug!(group = name, collapsed, "group state changed");
        self.sync_collapsed()
    }

    pub fn toggle_collapsed(&mut self, name: &str) -> Vec<LayerEvent> {
        let Some(collapsed) = self.model.toggle_collapsed(name) else {
            return Vec::new();
        };
        tracing::debug!(group = name, collapsed, "group toggled");
        self.sync_collapsed()
    }

    /// Span of the header cell for `index` in this layer.
    pub fn span_for(&self, index: usize) -> usize {
        span_through(&self.model, self, self.axis, index)
    }

    /// Span of the header cell for `index` as seen through a layer stacked on
    /// top of this one.
    pub fn span_in(&self, index: usize, view: &dyn Layer) -> usize {
        span_through(&self.model, view, self.axis, index)
    }

    /// First position of the header cell covering `position`.
    pub fn group_cell_start(&self, position: usize) -> Option<usize> {
        cell_start_through(&self.model, self, self.axis, position)
    }

    /// Group of the item at `position`.
    pub fn group_at(&self, position: usize) -> Option<&Group> {
        let index = self.index_at(self.axis, position)?;
        self.model.group_by_index(index)
    }

    /// Bring the collapse-hidden set in line with the model, returning the
    /// show and hide events this causes.
    fn sync_collapsed(&mut self) -> Vec<LayerEvent> {
        let desired = collapsed_indexes(&self.model, &self.underlying, self.axis);
        let current: BTreeSet<usize> = self.collapse.mapper().hidden_indexes().into_iter().collect();
        let to_show: Vec<usize> = current.difference(&desired).copied().collect();
        let to_hide: Vec<usize> = desired.difference(&current).copied().collect();

        let mut events = Vec::new();
        if !to_show.is_empty() {
            events.extend(self.collapse.show(&self.underlying, &to_show));
        }
        if !to_hide.is_empty() {
            events.extend(self.collapse.hide(&self.underlying, &to_hide));
        }
        events
    }

    /// Like [`Self::sync_collapsed`] without events; true if anything changed.
    fn resync_silently(&mut self) -> bool {
        let desired = collapsed_indexes(&self.model, &self.underlying, self.axis);
        self.collapse.replace_hidden(desired)
    }

    fn group_name_at(&self, position: usize) -> Option<String> {
        self.group_at(position).map(|g| g.name().to_string())
    }

    fn create_group(&mut self, name: &str, positions: &[usize]) -> Vec<LayerEvent> {
        let indexes: Vec<usize> = positions
            .iter()
            .filter_map(|&p| self.index_at(self.axis, p))
            .collect();
        if self.model.add_group(name, &indexes) {
            tracing::debug!(group = name, ?indexes, "group created");
        }
        Vec::new()
    }

    fn reorder(&mut self, from: &[usize], to: usize, into_group: bool) -> Vec<LayerEvent> {
        let Some(plan) = plan_reorder(&self.model, &*self, self.axis, from, to, into_group, self.policy)
        else {
            return Vec::new();
        };
        let command = LayerCommand::Reorder {
            axis: self.axis,
            from: plan.from,
            to: plan.to,
        };
        let mut events = forward_command(self, &command);
        // Membership follows the move, so it only changes once something moved.
        if !events.iter().any(|e| matches!(e, LayerEvent::Reordered { .. })) {
            tracing::debug!(axis = ?self.axis, "reorder moved nothing; groups left as they were");
            return events;
        }
        if let Some(name) = &plan.join {
            self.model.add_indexes_to_group(name, &plan.indexes);
        }
        if !plan.leave.is_empty() {
            self.model.remove_indexes_from_groups(&plan.leave);
        }
        events.extend(self.sync_collapsed());
        events
    }
}

impl<L: Layer> Layer for GroupLayer<L> {
    fn count(&self, axis: Axis) -> usize {
        if axis == self.axis {
            self.collapse.count(&self.underlying)
        } else {
            self.underlying.count(axis)
        }
    }

    fn index_at(&self, axis: Axis, position: usize) -> Option<usize> {
        if axis == self.axis {
            self.collapse.index_at(&self.underlying, position)
        } else {
            self.underlying.index_at(axis, position)
        }
    }

    fn position_of(&self, axis: Axis, index: usize) -> Option<usize> {
        if axis == self.axis {
            self.collapse.position_of(&self.underlying, index)
        } else {
            self.underlying.position_of(axis, index)
        }
    }

    fn size_at(&self, axis: Axis, position: usize) -> Option<u32> {
        if axis == self.axis {
            self.collapse.size_at(&self.underlying, position)
        } else {
            self.underlying.size_at(axis, position)
        }
    }

    fn start_offset_at(&self, axis: Axis, position: usize) -> Option<u32> {
        if axis == self.axis {
            self.collapse.start_offset_at(&self.underlying, position)
        } else {
            self.underlying.start_offset_at(axis, position)
        }
    }

    fn to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        if axis == self.axis {
            self.collapse.to_underlying(&self.underlying, position)
        } else {
            (position < self.underlying.count(axis)).then_some(position)
        }
    }

    fn from_underlying(&self, axis: Axis, underlying_position: usize) -> Option<usize> {
        if axis == self.axis {
            self.collapse.from_underlying(&self.underlying, underlying_position)
        } else {
            (underlying_position < self.underlying.count(axis)).then_some(underlying_position)
        }
    }

    fn underlying(&self) -> Option<&dyn Layer> {
        Some(&self.underlying)
    }

    fn underlying_mut(&mut self) -> Option<&mut dyn Layer> {
        Some(&mut self.underlying)
    }

    fn do_command(&mut self, command: &LayerCommand) -> Vec<LayerEvent> {
        if command.axis() != Some(self.axis) {
            return forward_command(self, command);
        }
        match command {
            LayerCommand::CreateGroup { name, positions, .. } => self.create_group(name, positions),
            LayerCommand::Ungroup { positions, .. } => {
                let indexes: Vec<usize> = positions
                    .iter()
                    .filter_map(|&p| self.index_at(self.axis, p))
                    .collect();
                self.remove_indexes_from_groups(&indexes)
            }
            LayerCommand::CollapseGroup { position, .. } => match self.group_name_at(*position) {
                Some(name) => self.set_collapsed(&name, true),
                None => Vec::new(),
            },
            LayerCommand::ExpandGroup { position, .. } => match self.group_name_at(*position) {
                Some(name) => self.set_collapsed(&name, false),
                None => Vec::new(),
            },
            LayerCommand::ToggleGroup { position, .. } => match self.group_name_at(*position) {
                Some(name) => self.toggle_collapsed(&name),
                None => Vec::new(),
            },
            LayerCommand::Reorder { from, to, .. } => self.reorder(from, *to, false),
            LayerCommand::ReorderIntoGroup { from, to, .. } => self.reorder(from, *to, true),
            _ => forward_command(self, command),
        }
    }

    fn translate_event(&mut self, event: LayerEvent) -> Vec<LayerEvent> {
        let structural = event.is_structural(self.axis);
        match &event {
            LayerEvent::Deleted { axis, indexes, .. } if *axis == self.axis => {
                self.model.apply_delete(&sorted(indexes));
            }
            LayerEvent::Inserted { axis, indexes, .. } if *axis == self.axis => {
                self.model.apply_insert(&sorted(indexes));
            }
            _ => {}
        }
        let mut events: Vec<LayerEvent> = self
            .collapse
            .translate_event(&self.underlying, event)
            .into_iter()
            .collect();
        // A change beneath can alter which member a collapsed group keeps.
        // The renumbering goes up first, then the show/hide that fixes it.
        if structural {
            let reaction = self.sync_collapsed();
            if !reaction.is_empty() {
                tracing::debug!(axis = ?self.axis, "collapsed groups changed shape");
            }
            events.extend(reaction);
        }
        events
    }

    fn prepare_for_change(&self) {
        self.collapse.warm(&self.underlying);
    }

    fn save_state(&self, prefix: &str, properties: &mut Properties) {
        self.underlying.save_state(prefix, properties);
        put_or_remove(properties, groups_key(prefix, self.axis), write_groups(&self.model));
    }

    fn load_state(&mut self, prefix: &str, properties: &Properties) -> Vec<LayerEvent> {
        self.prepare_for_change();
        let mut events: Vec<LayerEvent> = self
            .underlying
            .load_state(prefix, properties)
            .into_iter()
            .flat_map(|event| self.translate_event(event))
            .collect();

        let mut model = GroupModel::new();
        if let Some(value) = properties.get(&groups_key(prefix, self.axis)) {
            for group in read_groups(value) {
                let name = group.name().to_string();
                if !model.insert_group(group) {
                    tracing::warn!(group = name, "skipping persisted group that overlaps another");
                }
            }
        }
        if model != self.model {
            self.model = model;
            self.resync_silently();
            tracing::debug!(prefix, groups = self.model.len(), "restored groups");
            events.push(LayerEvent::StructureReset);
        }
        events
    }
}
