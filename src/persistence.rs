//! Flat string-keyed persistence of layer state.
//!
//! Every layer writes its state under `<prefix>.<key>` into a [`Properties`]
//! map. Values use small comma-separated grammars:
//!
//! | key                     | value                                   |
//! |-------------------------|-----------------------------------------|
//! | `hiddenColumnIndexes`   | `2,3,`                                  |
//! | `columnIndexOrder`      | `2,0,1,`                                |
//! | `columnWidths`          | `1:30,4:5,`                             |
//! | `columnGroups`          | `name=expanded:collapseable:breakable:1,2,3,|` |
//!
//! The row variants use `Row`/`row` in place of `Column`/`column`. A group
//! record may carry a fifth field with its static members: `...:1,2,3,:2,|`.
//!
//! Readers are lenient: a bad entry is logged and skipped, never fatal.

use std::collections::{BTreeMap, BTreeSet};

use crate::axis::Axis;
use crate::error::{GridError, Result};
use crate::group::{Group, GroupModel};

/// Persisted state: property key to value.
pub type Properties = BTreeMap<String, String>;

const RECORD_SEPARATOR: char = '|';
const LIST_SEPARATOR: char = ',';

/// `<prefix>.hiddenColumnIndexes` / `<prefix>.hiddenRowIndexes`.
pub fn hidden_key(prefix: &str, axis: Axis) -> String {
    format!("{prefix}.hidden{}Indexes", axis.key_name())
}

/// `<prefix>.columnIndexOrder` / `<prefix>.rowIndexOrder`.
pub fn order_key(prefix: &str, axis: Axis) -> String {
    match axis {
        Axis::Column => format!("{prefix}.columnIndexOrder"),
        Axis::Row => format!("{prefix}.rowIndexOrder"),
    }
}

/// `<prefix>.columnGroups` / `<prefix>.rowGroups`.
pub fn groups_key(prefix: &str, axis: Axis) -> String {
    match axis {
        Axis::Column => format!("{prefix}.columnGroups"),
        Axis::Row => format!("{prefix}.rowGroups"),
    }
}

/// `<prefix>.columnWidths` / `<prefix>.rowHeights`.
pub fn sizes_key(prefix: &str, axis: Axis) -> String {
    match axis {
        Axis::Column => format!("{prefix}.columnWidths"),
        Axis::Row => format!("{prefix}.rowHeights"),
    }
}

/// Store `value` under `key`, or remove the key when there is nothing to store.
pub(crate) fn put_or_remove(properties: &mut Properties, key: String, value: String) {
    if value.is_empty() {
        properties.remove(&key);
    } else {
        properties.insert(key, value);
    }
}

// ============================================================================
// Index lists
// ============================================================================

/// `[2, 3]` -> `"2,3,"`.
pub fn write_index_list(indexes: impl IntoIterator<Item = usize>) -> String {
    let mut value = String::new();
    for index in indexes {
        value.push_str(&index.to_string());
        value.push(LIST_SEPARATOR);
    }
    value
}

fn parse_index(token: &str) -> Result<usize> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| GridError::InvalidIndex(token.to_string()))
}

/// Parse every entry of an index list, failing on the first bad one.
pub fn parse_index_list(value: &str) -> Result<Vec<usize>> {
    value
        .split(LIST_SEPARATOR)
        .filter(|token| !token.trim().is_empty())
        .map(parse_index)
        .collect()
}

/// Parse an index list, skipping (and logging) bad entries.
pub fn read_index_list(value: &str) -> Vec<usize> {
    value
        .split(LIST_SEPARATOR)
        .filter(|token| !token.trim().is_empty())
        .filter_map(|token| match parse_index(token) {
            Ok(index) => Some(index),
            Err(err) => {
                tracing::warn!(%err, "skipping persisted index");
                None
            }
        })
        .collect()
}

// ============================================================================
// Size overrides
// ============================================================================

/// `{1: 30, 4: 5}` -> `"1:30,4:5,"`.
pub fn write_sizes(sizes: &BTreeMap<usize, u32>) -> String {
    let mut value = String::new();
    for (index, size) in sizes {
        value.push_str(&format!("{index}:{size}{LIST_SEPARATOR}"));
    }
    value
}

fn parse_size_entry(token: &str) -> Result<(usize, u32)> {
    let (index, size) = token
        .split_once(':')
        .ok_or_else(|| GridError::InvalidSize(token.to_string()))?;
    let index = parse_index(index)?;
    let size = size
        .trim()
        .parse::<u32>()
        .map_err(|_| GridError::InvalidSize(token.to_string()))?;
    Ok((index, size))
}

/// Parse `index:size` pairs, skipping bad entries.
pub fn read_sizes(value: &str) -> BTreeMap<usize, u32> {
    value
        .split(LIST_SEPARATOR)
        .filter(|token| !token.trim().is_empty())
        .filter_map(|token| match parse_size_entry(token) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(%err, "skipping persisted size");
                None
            }
        })
        .collect()
}

// ============================================================================
// Group records
// ============================================================================

/// One record per group with members, each terminated by `|`.
pub fn write_groups(model: &GroupModel) -> String {
    let mut value = String::new();
    for group in model.groups().iter().filter(|g| !g.members().is_empty()) {
        value.push_str(&write_group(group));
        value.push(RECORD_SEPARATOR);
    }
    value
}

fn write_group(group: &Group) -> String {
    let state = if group.is_collapsed() { "collapsed" } else { "expanded" };
    let collapseable = if group.is_collapseable() {
        "collapseable"
    } else {
        "uncollapseable"
    };
    let breakable = if group.is_unbreakable() {
        "unbreakable"
    } else {
        "breakable"
    };
    let mut record = format!(
        "{}={state}:{collapseable}:{breakable}:{}",
        group.name(),
        write_index_list(group.members().iter().copied())
    );
    if !group.static_indexes().is_empty() {
        record.push(':');
        record.push_str(&write_index_list(group.static_indexes().iter().copied()));
    }
    record
}

fn parse_flag(token: &str, yes: &str, no: &str, expected: &'static str) -> Result<bool> {
    match token.trim() {
        t if t == yes => Ok(true),
        t if t == no => Ok(false),
        other => Err(GridError::UnknownToken {
            token: other.to_string(),
            expected,
        }),
    }
}

/// Parse a single record (without the trailing `|`).
///
/// Any bad member or static index rejects the whole record, so a group is
/// either restored completely or not at all.
pub fn parse_group_record(record: &str) -> Result<Group> {
    let (name, rest) = record
        .split_once('=')
        .ok_or_else(|| GridError::GroupRecord(record.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(GridError::GroupRecord(record.to_string()));
    }

    let fields: Vec<&str> = rest.split(':').collect();
    let (state, collapseable, breakable, members, statics) = match fields.as_slice() {
        [state, collapseable, breakable, members] => (*state, *collapseable, *breakable, *members, ""),
        [state, collapseable, breakable, members, statics] => {
            (*state, *collapseable, *breakable, *members, *statics)
        }
        _ => return Err(GridError::GroupRecord(record.to_string())),
    };

    let collapsed = parse_flag(state, "collapsed", "expanded", "collapsed|expanded")?;
    let collapseable = parse_flag(
        collapseable,
        "collapseable",
        "uncollapseable",
        "collapseable|uncollapseable",
    )?;
    let unbreakable = parse_flag(breakable, "unbreakable", "breakable", "breakable|unbreakable")?;

    let mut seen = BTreeSet::new();
    let members: Vec<usize> = parse_index_list(members)?
        .into_iter()
        .filter(|index| seen.insert(*index))
        .collect();
    if members.is_empty() {
        return Err(GridError::GroupRecord(record.to_string()));
    }
    let statics = parse_index_list(statics)?;

    Ok(Group::new(name, members)
        .with_flags(collapsed, collapseable, unbreakable)
        .with_static_indexes(statics))
}

/// Parse every record, skipping (and logging) malformed ones.
pub fn read_groups(value: &str) -> Vec<Group> {
    value
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| match parse_group_record(record) {
            Ok(group) => Some(group),
            Err(err) => {
                tracing::warn!(%err, record, "skipping persisted group");
                None
            }
        })
        .collect()
}

// ============================================================================
// Properties files
// ============================================================================

/// Parse `key=value` lines. Blank lines and `#` comments are ignored; the
/// value is everything after the first `=`.
pub fn parse_properties(text: &str) -> Properties {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.split_once('=') {
            Some((key, value)) => Some((key.trim().to_string(), value.to_string())),
            None => {
                tracing::warn!(line, "skipping property line without '='");
                None
            }
        })
        .collect()
}

/// Render properties as `key=value` lines in key order.
pub fn format_properties(properties: &Properties) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}
