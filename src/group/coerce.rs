//! Deciding what a reorder does to group membership.
//!
//! A drag is planned against the current positions before anything moves.
//! The plan says where the items really go and which groups they join or
//! leave; the layer applies the membership change and forwards the move.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Group, GroupModel};
use crate::axis::Axis;
use crate::layer::Layer;

/// What to do with a reorder that would break an unbreakable group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// Clamp or redirect the move so every unbreakable group stays intact.
    #[default]
    Coerce,
    /// Drop any move that would need coercion.
    Strict,
}

/// Outcome of planning a reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReorderPlan {
    /// Local positions of the moved items, ascending.
    pub from: Vec<usize>,
    /// Indexes of the moved items.
    pub indexes: Vec<usize>,
    /// Final insertion point.
    pub to: usize,
    /// Group the moved items join.
    pub join: Option<String>,
    /// Moved indexes that leave their group.
    pub leave: Vec<usize>,
}

/// First and last position of the visible members of `group`.
pub(crate) fn visible_range(group: &Group, view: &dyn Layer, axis: Axis) -> Option<(usize, usize)> {
    let positions = group
        .members()
        .iter()
        .filter_map(|&member| view.position_of(axis, member));
    positions.fold(None, |range, p| match range {
        None => Some((p, p)),
        Some((start, end)) => Some((start.min(p), end.max(p))),
    })
}

/// Plan moving the items at `from` before position `to` of `view`.
///
/// `into_group` makes a drop exactly on a group edge join that group. Returns
/// `None` when the move must not happen at all.
pub(crate) fn plan_reorder(
    model: &GroupModel,
    view: &dyn Layer,
    axis: Axis,
    from: &[usize],
    to: usize,
    into_group: bool,
    policy: ReorderPolicy,
) -> Option<ReorderPlan> {
    let count = view.count(axis);
    let positions: Vec<usize> = from
        .iter()
        .copied()
        .filter(|&p| p < count)
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect();
    if positions.is_empty() {
        return None;
    }
    let indexes: Vec<usize> = positions
        .iter()
        .filter_map(|&p| view.index_at(axis, p))
        .collect();
    let mut to = to.min(count);

    let unbreakable: BTreeSet<&str> = indexes
        .iter()
        .filter_map(|&i| model.group_by_index(i))
        .filter(|g| g.is_unbreakable())
        .map(Group::name)
        .collect();

    if unbreakable.len() > 1 {
        tracing::debug!(?unbreakable, "move spans several unbreakable groups");
        return None;
    }
    if let Some(&name) = unbreakable.iter().next() {
        let group = model.group_by_name(name)?;
        if indexes.iter().any(|&i| !group.contains(i)) {
            tracing::debug!(group = name, "move mixes an unbreakable group with other items");
            return None;
        }
        let (start, end) = visible_range(group, view, axis)?;
        let clamped = to.clamp(start, end + 1);
        if clamped != to {
            if policy == ReorderPolicy::Strict {
                tracing::debug!(group = name, to, "move out of unbreakable group rejected");
                return None;
            }
            tracing::debug!(group = name, to, clamped, "clamped move into unbreakable group");
        }
        return Some(ReorderPlan {
            from: positions,
            indexes,
            to: clamped,
            join: None,
            leave: Vec::new(),
        });
    }

    let mut join = None;
    if let Some((group, start, end)) = group_strictly_containing(model, view, axis, to) {
        let foreign = indexes.iter().any(|&i| !group.contains(i));
        if group.is_unbreakable() && foreign {
            if policy == ReorderPolicy::Strict {
                tracing::debug!(group = group.name(), to, "drop into unbreakable group rejected");
                return None;
            }
            to = if to - start <= end + 1 - to { start } else { end + 1 };
            tracing::debug!(group = group.name(), to, "drop moved to unbreakable group edge");
        } else {
            join = Some(group.name().to_string());
        }
    } else if into_group {
        join = group_at_edge(model, view, axis, to).map(|g| g.name().to_string());
    }

    let leave = if join.is_some() {
        Vec::new()
    } else {
        leaving_members(model, view, axis, &indexes, to)
    };

    Some(ReorderPlan {
        from: positions,
        indexes,
        to,
        join,
        leave,
    })
}

/// The group with a member before and a member at or after `to`.
fn group_strictly_containing<'m>(
    model: &'m GroupModel,
    view: &dyn Layer,
    axis: Axis,
    to: usize,
) -> Option<(&'m Group, usize, usize)> {
    model.groups().iter().find_map(|group| {
        let (start, end) = visible_range(group, view, axis)?;
        (start < to && to <= end).then_some((group, start, end))
    })
}

/// The group a drop exactly on a boundary joins.
///
/// Between two groups the one whose last member is numerically closer to the
/// drop wins; a tie goes to the group nearer the start.
fn group_at_edge<'m>(
    model: &'m GroupModel,
    view: &dyn Layer,
    axis: Axis,
    to: usize,
) -> Option<&'m Group> {
    let mut before: Option<(&Group, usize)> = None;
    let mut after: Option<(&Group, usize)> = None;
    for group in model.groups() {
        let Some((start, end)) = visible_range(group, view, axis) else {
            continue;
        };
        if end + 1 == to {
            before = Some((group, end));
        }
        if start == to {
            after = Some((group, end));
        }
    }
    match (before, after) {
        (Some((a, a_end)), Some((b, b_end))) => {
            if to.abs_diff(b_end) < to.abs_diff(a_end) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some((a, _)), None) => Some(a),
        (None, Some((b, _))) => Some(b),
        (None, None) => None,
    }
}

/// Moved members of breakable groups that end up outside their group.
///
/// A drop on either edge of the group keeps membership. Moving every member
/// of a group moves the group.
fn leaving_members(
    model: &GroupModel,
    view: &dyn Layer,
    axis: Axis,
    indexes: &[usize],
    to: usize,
) -> Vec<usize> {
    indexes
        .iter()
        .copied()
        .filter(|&index| {
            let Some(group) = model.group_by_index(index) else {
                return false;
            };
            if group.members().iter().all(|m| indexes.contains(m)) {
                return false;
            }
            match visible_range(group, view, axis) {
                Some((start, end)) => to < start || to > end + 1,
                None => false,
            }
        })
        .collect()
}
