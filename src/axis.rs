//! Axis selection and contiguous position ranges.

use serde::{Deserialize, Serialize};

/// The two axes every layer maps independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Column,
    Row,
}

impl Axis {
    /// Persistence key fragment, e.g. `Column` for `hiddenColumnIndexes`.
    pub(crate) fn key_name(self) -> &'static str {
        match self {
            Axis::Column => "Column",
            Axis::Row => "Row",
        }
    }
}

/// Direction along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward position 0 (left for columns, up for rows).
    TowardStart,
    /// Toward the last position.
    TowardEnd,
}

/// One value per axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisPair<T> {
    pub columns: T,
    pub rows: T,
}

impl<T> AxisPair<T> {
    pub fn new(columns: T, rows: T) -> Self {
        Self { columns, rows }
    }

    pub fn get(&self, axis: Axis) -> &T {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Column => &mut self.columns,
            Axis::Row => &mut self.rows,
        }
    }
}

/// Half-open range of positions `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub start: usize,
    pub end: usize,
}

impl PositionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Collapse a set of positions into sorted, merged contiguous ranges.
///
/// Duplicates are ignored; the input does not need to be sorted.
pub fn ranges_from_positions(positions: impl IntoIterator<Item = usize>) -> Vec<PositionRange> {
    let mut sorted: Vec<usize> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<PositionRange> = Vec::new();
    for position in sorted {
        if let Some(last) = ranges.last_mut() {
            if last.end == position {
                last.end = position + 1;
                continue;
            }
        }
        ranges.push(PositionRange::new(position, position + 1));
    }
    ranges
}

/// Flatten ranges back into the ascending list of positions they cover.
pub fn positions_in(ranges: &[PositionRange]) -> Vec<usize> {
    ranges.iter().flat_map(PositionRange::iter).collect()
}
