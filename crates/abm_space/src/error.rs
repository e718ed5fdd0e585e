//! Errors raised by spatial indices and cell layers.

use glam::DVec3;
use thiserror::Error;

use crate::dims::{Cell, Dimensions};

#[derive(Debug, Error)]
pub enum SpaceError {
    /// A cell lies outside the world on a non-degenerate axis.
    #[error("cell {cell} is outside a {dimensions} world")]
    OutOfBounds { cell: Cell, dimensions: Dimensions },

    /// A point lies outside a continuous world on a non-degenerate axis.
    #[error("point {point} is outside a world of size {bounds}")]
    PointOutOfBounds { point: DVec3, bounds: DVec3 },

    #[error("cell id {id} is out of range for {count} cells")]
    CellIdOutOfRange { id: usize, count: usize },

    /// The key has no position in the index.
    #[error("`{0}` has no position in this world")]
    NotPlaced(String),

    /// A discrete operation was used on a continuous world or vice versa.
    #[error("operation requires a {expected} world")]
    WrongTopology { expected: &'static str },

    #[error("cell layer `{0}` already exists")]
    DuplicateLayer(String),

    #[error("cell layer `{0}` does not exist")]
    LayerNotFound(String),

    #[error("cell layer `{name}` needs {expected} values, got {actual}")]
    LayerSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}
