//! Hiding rows and columns.
//!
//! The engine is split the same way for every layer that removes positions:
//! - [`IndexPositionMapper`]: the hidden-index set (primary state)
//! - [`VisibilityCache`]: index/position maps derived from it
//! - [`GeometryCache`]: start offsets derived from the maps
//! - [`translate`]: keeps all of the above valid across changes underneath
//!
//! [`HiddenAxis`] bundles them for one axis; [`HideShowLayer`] uses one per
//! axis and [`crate::GroupLayer`] uses one for its collapsed members.

pub mod geometry;
mod hidden_axis;
mod layer;
pub mod mapper;
pub mod translate;
pub mod visibility;

pub use geometry::GeometryCache;
pub use hidden_axis::HiddenAxis;
pub use layer::HideShowLayer;
pub use mapper::IndexPositionMapper;
pub use visibility::{VisibilityCache, VisibilityMaps};

use serde::{Deserialize, Serialize};

/// How a hidden item disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideStrategy {
    /// The item loses its position; later positions move up.
    #[default]
    Remove,
    /// The item keeps its position and reports size 0. Hide and show raise
    /// resize events instead of structural ones, which keeps percentage sizing
    /// of the remaining items stable.
    ZeroSize,
}
