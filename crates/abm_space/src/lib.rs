//! # abm_space
//!
//! Spatial types for the agent-based modelling runtime.
//!
//! - [`Dimensions`] / [`Cell`]: line, grid and cube geometry with degenerate
//!   axes and row-major cell ids.
//! - [`Neighbourhood`] and [`neighbour_cells`]: Moore and von Neumann cell
//!   enumeration with optional toroidal wrap.
//! - [`DiscreteSpace`]: per-cell buckets of agent keys.
//! - [`ContinuousSpace`]: [`glam::DVec3`] positions in unit-cell buckets.
//! - [`CellLayers`]: named per-cell data columns.

pub mod continuous;
pub mod dims;
pub mod error;
pub mod grid;
pub mod layer;
pub mod neighbourhood;

pub use continuous::{ContinuousSpace, Metric};
pub use dims::{Cell, Dimensions};
pub use error::SpaceError;
pub use glam::DVec3;
pub use grid::DiscreteSpace;
pub use layer::CellLayers;
pub use neighbourhood::{Neighbourhood, neighbour_cells};
