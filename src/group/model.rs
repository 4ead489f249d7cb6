//! Named groups of indexes on one axis.
//!
//! A group is an ordered set of member indexes that a header renders as one
//! cell and that can be collapsed to its static members. Every index belongs to
//! at most one group; a group that loses its last member is dropped.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hideshow::translate::{shift_for_delete, shift_for_insert};

/// One named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    members: Vec<usize>,
    static_indexes: BTreeSet<usize>,
    collapsed: bool,
    collapseable: bool,
    unbreakable: bool,
}

impl Group {
    /// A new expanded, collapseable, breakable group.
    pub fn new(name: impl Into<String>, members: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            members,
            static_indexes: BTreeSet::new(),
            collapsed: false,
            collapseable: true,
            unbreakable: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in the order they were added.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Members that stay visible while the group is collapsed.
    pub fn static_indexes(&self) -> &BTreeSet<usize> {
        &self.static_indexes
    }

    pub fn is_static(&self, index: usize) -> bool {
        self.static_indexes.contains(&index)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_collapseable(&self) -> bool {
        self.collapseable
    }

    pub fn is_unbreakable(&self) -> bool {
        self.unbreakable
    }

    /// Collapsed and allowed to be.
    pub fn is_effectively_collapsed(&self) -> bool {
        self.collapsed && self.collapseable
    }

    pub(crate) fn with_flags(mut self, collapsed: bool, collapseable: bool, unbreakable: bool) -> Self {
        self.collapsed = collapsed;
        self.collapseable = collapseable;
        self.unbreakable = unbreakable;
        self
    }

    pub(crate) fn with_static_indexes(mut self, statics: impl IntoIterator<Item = usize>) -> Self {
        let members = &self.members;
        self.static_indexes = statics.into_iter().filter(|i| members.contains(i)).collect();
        self
    }

    fn remove_members(&mut self, indexes: &BTreeSet<usize>) {
        self.members.retain(|m| !indexes.contains(m));
        self.static_indexes.retain(|m| !indexes.contains(m));
    }
}

/// Whether `name` can be stored as a group name and read back unchanged.
///
/// Names must be non-empty, carry no surrounding whitespace or control
/// characters, and avoid the `=` and `|` separators of the persisted form.
pub fn is_valid_group_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name.contains(['=', '|'])
        && !name.chars().any(char::is_control)
}

/// All groups of one axis of a grouping layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupModel {
    groups: Vec<Group>,
}

impl GroupModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether a group named `name` exists.
    pub fn is_a_group(&self, name: &str) -> bool {
        self.group_by_name(name).is_some()
    }

    pub fn is_part_of_a_group(&self, index: usize) -> bool {
        self.group_by_index(index).is_some()
    }

    pub fn is_part_of_unbreakable_group(&self, index: usize) -> bool {
        self.group_by_index(index).is_some_and(Group::is_unbreakable)
    }

    pub fn group_by_index(&self, index: usize) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(index))
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// Create a group. Indexes that already belong to another group are left
    /// where they are; the call fails if the name is taken or no index remains.
    pub fn add_group(&mut self, name: &str, indexes: &[usize]) -> bool {
        if !is_valid_group_name(name) {
            tracing::warn!(name, "rejecting group name that cannot be persisted");
            return false;
        }
        if self.is_a_group(name) {
            tracing::debug!(name, "group already exists");
            return false;
        }
        let members = self.ungrouped(indexes);
        if members.is_empty() {
            return false;
        }
        self.groups.push(Group::new(name, members));
        true
    }

    /// Register a fully built group, all or nothing.
    ///
    /// Fails when the name is invalid or taken, the group is empty, or any
    /// member already belongs to another group.
    pub fn insert_group(&mut self, group: Group) -> bool {
        if group.members.is_empty()
            || !is_valid_group_name(&group.name)
            || self.is_a_group(&group.name)
            || group.members.iter().any(|&m| self.is_part_of_a_group(m))
        {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Add indexes to an existing group, taking them out of any other group.
    pub fn add_indexes_to_group(&mut self, name: &str, indexes: &[usize]) -> bool {
        if !self.is_a_group(name) {
            return false;
        }
        let moving: BTreeSet<usize> = indexes
            .iter()
            .copied()
            .filter(|&i| self.group_by_index(i).is_some_and(|g| g.name != name))
            .collect();
        self.detach(&moving);
        let Some(group) = self.group_mut(name) else {
            return false;
        };
        for &index in indexes {
            if !group.members.contains(&index) {
                group.members.push(index);
            }
        }
        true
    }

    /// Remove indexes from whatever group holds them.
    pub fn remove_indexes_from_groups(&mut self, indexes: &[usize]) -> bool {
        let removing: BTreeSet<usize> = indexes.iter().copied().collect();
        let before = self.member_count();
        self.detach(&removing);
        self.member_count() != before
    }

    pub fn remove_group(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        self.groups.len() != before
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Replace the static members of a group. Non-members are ignored.
    pub fn set_static_indexes(&mut self, name: &str, statics: &[usize]) -> bool {
        let Some(group) = self.group_mut(name) else {
            return false;
        };
        group.static_indexes = statics
            .iter()
            .copied()
            .filter(|i| group.members.contains(i))
            .collect();
        true
    }

    pub fn set_collapsed(&mut self, name: &str, collapsed: bool) -> bool {
        match self.group_mut(name) {
            Some(group) => {
                group.collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    /// Flip the collapsed flag; returns the new state.
    pub fn toggle_collapsed(&mut self, name: &str) -> Option<bool> {
        let group = self.group_mut(name)?;
        group.collapsed = !group.collapsed;
        Some(group.collapsed)
    }

    pub fn set_collapseable(&mut self, name: &str, collapseable: bool) -> bool {
        match self.group_mut(name) {
            Some(group) => {
                group.collapseable = collapseable;
                true
            }
            None => false,
        }
    }

    pub fn set_unbreakable(&mut self, name: &str, unbreakable: bool) -> bool {
        match self.group_mut(name) {
            Some(group) => {
                group.unbreakable = unbreakable;
                true
            }
            None => false,
        }
    }

    /// Rewrite membership after underlying items were deleted.
    pub(crate) fn apply_delete(&mut self, deleted: &[usize]) {
        for group in &mut self.groups {
            group.members = shift_for_delete(group.members.iter().copied(), deleted);
            group.static_indexes = shift_for_delete(group.static_indexes.iter().copied(), deleted)
                .into_iter()
                .collect();
        }
        self.groups.retain(|g| !g.members.is_empty());
    }

    /// Rewrite membership after underlying items were inserted.
    pub(crate) fn apply_insert(&mut self, inserted: &[usize]) {
        for group in &mut self.groups {
            for member in &mut group.members {
                *member = shift_for_insert(*member, inserted);
            }
            group.static_indexes = group
                .static_indexes
                .iter()
                .map(|&s| shift_for_insert(s, inserted))
                .collect();
        }
    }

    fn ungrouped(&self, indexes: &[usize]) -> Vec<usize> {
        let mut members = Vec::with_capacity(indexes.len());
        for &index in indexes {
            if self.is_part_of_a_group(index) {
                tracing::debug!(index, "index already grouped, skipping");
            } else if !members.contains(&index) {
                members.push(index);
            }
        }
        members
    }

    fn detach(&mut self, indexes: &BTreeSet<usize>) {
        if indexes.is_empty() {
            return;
        }
        for group in &mut self.groups {
            group.remove_members(indexes);
        }
        self.groups.retain(|g| !g.members.is_empty());
    }

    fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}
