//! Named groups of rows or columns.
//!
//! [`GroupModel`] holds membership and per-group flags, [`GroupLayer`] turns
//! collapsed groups into hidden members and reports header spans. Reorders
//! through the layer are planned against the model first so unbreakable
//! groups stay contiguous (see [`ReorderPolicy`]).

mod coerce;
mod layer;
pub mod model;
pub mod span;

pub use coerce::ReorderPolicy;
pub use layer::GroupLayer;
pub use model::{Group, GroupModel};
