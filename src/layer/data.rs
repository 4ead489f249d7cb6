//! The bottom layer: item counts and pixel sizes.
//!
//! Positions and indexes coincide here. Start offsets come from a cumulative
//! prefix-sum table built on first use, so offset lookups and hit tests are
//! O(1) and O(log n).

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Layer;
use crate::axis::{ranges_from_positions, Axis, AxisPair, PositionRange};
use crate::cache::CacheSlot;
use crate::command::LayerCommand;
use crate::event::LayerEvent;
use crate::hideshow::translate::{shift_for_insert, sorted};
use crate::persistence::{put_or_remove, read_sizes, sizes_key, write_sizes, Properties};

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: u32 = 64;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 20;

/// Shape of a [`DataLayer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayerConfig {
    pub column_count: usize,
    pub row_count: usize,
    pub default_column_width: u32,
    pub default_row_height: u32,
    /// Per-index width overrides.
    pub column_widths: BTreeMap<usize, u32>,
    /// Per-index height overrides.
    pub row_heights: BTreeMap<usize, u32>,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            column_count: 0,
            row_count: 0,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            default_row_height: DEFAULT_ROW_HEIGHT,
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
struct DataAxis {
    count: usize,
    default_size: u32,
    sizes: BTreeMap<usize, u32>,
    /// `offsets[i]` = leading edge of item i; one trailing entry for the far edge.
    offsets: CacheSlot<Vec<u32>>,
}

impl DataAxis {
    fn new(count: usize, default_size: u32, mut sizes: BTreeMap<usize, u32>) -> Self {
        sizes.retain(|&index, _| index < count);
        Self {
            count,
            default_size,
            sizes,
            offsets: CacheSlot::new(),
        }
    }

    fn size(&self, index: usize) -> Option<u32> {
        (index < self.count).then(|| self.sizes.get(&index).copied().unwrap_or(self.default_size))
    }

    fn offsets(&self) -> Rc<Vec<u32>> {
        self.offsets.get_or_build(|| {
            let mut offsets = Vec::with_capacity(self.count + 1);
            let mut edge = 0u32;
            for index in 0..self.count {
                offsets.push(edge);
                edge = edge.saturating_add(self.size(index).unwrap_or(0));
            }
            offsets.push(edge); // Final edge
            offsets
        })
    }

    fn insert(&mut self, position: usize, count: usize) -> Vec<usize> {
        let position = position.min(self.count);
        let inserted: Vec<usize> = (position..position + count).collect();
        self.sizes = std::mem::take(&mut self.sizes)
            .into_iter()
            .map(|(index, size)| (shift_for_insert(index, &inserted), size))
            .collect();
        self.count += count;
        self.offsets.invalidate();
        inserted
    }

    fn delete(&mut self, positions: &[usize]) -> Vec<usize> {
        let deleted: Vec<usize> = sorted(positions)
            .into_iter()
            .filter(|&p| p < self.count)
            .collect();
        self.sizes = std::mem::take(&mut self.sizes)
            .into_iter()
            .filter(|(index, _)| deleted.binary_search(index).is_err())
            .map(|(index, size)| (index - deleted.partition_point(|&d| d < index), size))
            .collect();
        self.count -= deleted.len();
        self.offsets.invalidate();
        deleted
    }
}

/// Counts and sizes of both axes; every other layer sits on top of one.
#[derive(Debug)]
pub struct DataLayer {
    axes: AxisPair<DataAxis>,
}

impl DataLayer {
    pub fn new(config: DataLayerConfig) -> Self {
        Self {
            axes: AxisPair::new(
                DataAxis::new(config.column_count, config.default_column_width, config.column_widths),
                DataAxis::new(config.row_count, config.default_row_height, config.row_heights),
            ),
        }
    }

    /// A layer with default sizes.
    pub fn with_counts(column_count: usize, row_count: usize) -> Self {
        Self::new(DataLayerConfig {
            column_count,
            row_count,
            ..DataLayerConfig::default()
        })
    }

    pub fn default_size(&self, axis: Axis) -> u32 {
        self.axes.get(axis).default_size
    }

    /// Sizes that differ from the default, by index.
    pub fn size_overrides(&self, axis: Axis) -> &BTreeMap<usize, u32> {
        &self.axes.get(axis).sizes
    }

    fn resize(&mut self, axis: Axis, position: usize, size: u32) -> Option<LayerEvent> {
        let data = self.axes.get_mut(axis);
        if position >= data.count {
            return None;
        }
        if data.size(position) == Some(size) {
            return None;
        }
        data.sizes.insert(position, size);
        data.offsets.invalidate();
        tracing::debug!(?axis, position, size, "resized");
        Some(LayerEvent::Resized {
            axis,
            ranges: vec![PositionRange::new(position, position + 1)],
        })
    }
}

impl Layer for DataLayer {
    fn count(&self, axis: Axis) -> usize {
        self.axes.get(axis).count
    }

    fn index_at(&self, axis: Axis, position: usize) -> Option<usize> {
        (position < self.count(axis)).then_some(position)
    }

    fn position_of(&self, axis: Axis, index: usize) -> Option<usize> {
        (index < self.count(axis)).then_some(index)
    }

    fn size_at(&self, axis: Axis, position: usize) -> Option<u32> {
        self.axes.get(axis).size(position)
    }

    fn start_offset_at(&self, axis: Axis, position: usize) -> Option<u32> {
        if position >= self.count(axis) {
            return None;
        }
        self.axes.get(axis).offsets().get(position).copied()
    }

    fn total_size(&self, axis: Axis) -> u32 {
        self.axes.get(axis).offsets().last().copied().unwrap_or(0)
    }

    fn position_at_offset(&self, axis: Axis, offset: u32) -> Option<usize> {
        let offsets = self.axes.get(axis).offsets();
        let count = self.count(axis);
        if count == 0 || offset >= offsets.last().copied().unwrap_or(0) {
            return None;
        }
        // Last item whose leading edge is at or before the offset; zero-size
        // items sharing that edge are skipped.
        let position = offsets.partition_point(|&start| start <= offset).saturating_sub(1);
        (position < count).then_some(position)
    }

    fn to_underlying(&self, axis: Axis, position: usize) -> Option<usize> {
        (position < self.count(axis)).then_some(position)
    }

    fn from_underlying(&self, axis: Axis, underlying_position: usize) -> Option<usize> {
        (underlying_position < self.count(axis)).then_some(underlying_position)
    }

    fn underlying(&self) -> Option<&dyn Layer> {
        None
    }

    fn underlying_mut(&mut self) -> Option<&mut dyn Layer> {
        None
    }

    fn do_command(&mut self, command: &LayerCommand) -> Vec<LayerEvent> {
        match command {
            LayerCommand::InsertItems {
                axis,
                position,
                count,
            } => {
                if *count == 0 {
                    return Vec::new();
                }
                let inserted = self.axes.get_mut(*axis).insert(*position, *count);
                tracing::debug!(?axis, indexes = ?inserted, "inserted items");
                vec![LayerEvent::Inserted {
                    axis: *axis,
                    ranges: ranges_from_positions(inserted.iter().copied()),
                    indexes: inserted,
                }]
            }
            LayerCommand::DeleteItems { axis, positions } => {
                let deleted = self.axes.get_mut(*axis).delete(positions);
                if deleted.is_empty() {
                    return Vec::new();
                }
                tracing::debug!(?axis, indexes = ?deleted, "deleted items");
                vec![LayerEvent::Deleted {
                    axis: *axis,
                    ranges: ranges_from_positions(deleted.iter().copied()),
                    indexes: deleted,
                }]
            }
            LayerCommand::Resize {
                axis,
                position,
                size,
            } => self.resize(*axis, *position, *size).into_iter().collect(),
            LayerCommand::VisualRefresh => {
                self.axes.columns.offsets.invalidate();
                self.axes.rows.offsets.invalidate();
                vec![LayerEvent::VisualRefresh]
            }
            other => {
                tracing::trace!(command = ?other, "command not handled by any layer");
                Vec::new()
            }
        }
    }

    fn translate_event(&mut self, event: LayerEvent) -> Vec<LayerEvent> {
        vec![event]
    }

    fn save_state(&self, prefix: &str, properties: &mut Properties) {
        for axis in [Axis::Column, Axis::Row] {
            put_or_remove(
                properties,
                sizes_key(prefix, axis),
                write_sizes(&self.axes.get(axis).sizes),
            );
        }
    }

    fn load_state(&mut self, prefix: &str, properties: &Properties) -> Vec<LayerEvent> {
        let mut changed = false;
        for axis in [Axis::Column, Axis::Row] {
            let data = self.axes.get_mut(axis);
            let mut sizes = properties
                .get(&sizes_key(prefix, axis))
                .map(|value| read_sizes(value))
                .unwrap_or_default();
            sizes.retain(|&index, _| index < data.count);
            if sizes != data.sizes {
                data.sizes = sizes;
                data.offsets.invalidate();
                changed = true;
            }
        }
        if changed {
            vec![LayerEvent::VisualRefresh]
        } else {
            Vec::new()
        }
    }
}
