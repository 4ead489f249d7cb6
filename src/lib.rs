//! gridlayers - layered grid engine
//!
//! Maps the positions a grid shows to the indexes of the data behind it,
//! through a stack of layers that each transform one step:
//! - Data layer with per-item sizes and cumulative pixel offsets
//! - Reordering of rows and columns
//! - Hide/show by index, with cached index/position maps and geometry
//! - Column or row groups that collapse to their static members
//! - Flat key/value persistence of every layer's state
//!
//! # Usage
//!
//! ```
//! use gridlayers::{Axis, DataLayer, HideShowLayer, Layer, LayerCommand};
//!
//! let mut grid = HideShowLayer::new(DataLayer::with_counts(10, 100));
//! grid.do_command(&LayerCommand::HidePositions {
//!     axis: Axis::Column,
//!     positions: vec![2, 3],
//! });
//! assert_eq!(grid.count(Axis::Column), 8);
//! assert_eq!(grid.index_at(Axis::Column, 2), Some(4));
//! ```

pub mod axis;
pub mod cache;
pub mod command;
pub mod error;
pub mod event;
pub mod group;
pub mod hideshow;
pub mod layer;
pub mod persistence;

pub use axis::{Axis, AxisPair, Direction, PositionRange};
pub use command::LayerCommand;
pub use error::{GridError, Result};
pub use event::{LayerEvent, StructuralDiff};
pub use group::{Group, GroupLayer, GroupModel, ReorderPolicy};
pub use hideshow::{HideShowLayer, HideStrategy};
pub use layer::{
    visible_indexes, AxisSnapshot, DataLayer, DataLayerConfig, Layer, ReorderLayer,
    StackSnapshot, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT,
};
pub use persistence::Properties;
