//! Discrete world geometry.
//!
//! [`Dimensions`] describes the extent of a line, grid or cube world. A size
//! of 0 on an axis is treated as a size of 1: the axis is *degenerate* and its
//! only coordinate is 0. [`Cell`] is a signed coordinate so callers can pass
//! out-of-range values and have them validated, clamped or wrapped.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::SpaceError;

/// A discrete cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Cell {
    /// The origin cell `(0, 0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinates as an array.
    #[must_use]
    pub const fn to_array(self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }

    /// Chebyshev (chessboard) distance to another cell.
    #[must_use]
    pub fn chebyshev(self, other: Cell) -> i64 {
        let d = other - self;
        d.x.abs().max(d.y.abs()).max(d.z.abs())
    }

    /// Manhattan (taxicab) distance to another cell.
    #[must_use]
    pub fn manhattan(self, other: Cell) -> i64 {
        let d = other - self;
        d.x.abs() + d.y.abs() + d.z.abs()
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Cell {
    type Output = Cell;

    fn sub(self, rhs: Cell) -> Cell {
        Cell::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<i64> for Cell {
    fn from(x: i64) -> Self {
        Self::new(x, 0, 0)
    }
}

impl From<(i64, i64)> for Cell {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y, 0)
    }
}

impl From<(i64, i64, i64)> for Cell {
    fn from((x, y, z): (i64, i64, i64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i64; 3]> for Cell {
    fn from([x, y, z]: [i64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The size of a discrete world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Dimensions {
    /// A world of `width * height * depth` cells.
    ///
    /// A size of 0 is a degenerate axis and behaves as 1: its coordinate is
    /// always 0.
    #[must_use]
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A one-dimensional world.
    #[must_use]
    pub const fn line(width: usize) -> Self {
        Self::new(width, 0, 0)
    }

    /// A two-dimensional world.
    #[must_use]
    pub const fn grid(width: usize, height: usize) -> Self {
        Self::new(width, height, 0)
    }

    /// A three-dimensional world.
    #[must_use]
    pub const fn cube(width: usize, height: usize, depth: usize) -> Self {
        Self::new(width, height, depth)
    }

    /// Effective extent per axis, with 0 promoted to 1.
    #[must_use]
    pub fn extents(&self) -> [i64; 3] {
        [self.width, self.height, self.depth].map(|size| size.max(1) as i64)
    }

    /// Number of cells in the world.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width.max(1) * self.height.max(1) * self.depth.max(1)
    }

    /// Returns `true` if the cell lies inside the world as given.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.to_array()
            .iter()
            .zip(self.extents())
            .all(|(&c, extent)| (0..extent).contains(&c))
    }

    /// Check a cell against the world bounds.
    ///
    /// Degenerate axes are clamped to 0 silently; any other out-of-range
    /// coordinate is an error.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] if a non-degenerate coordinate is
    /// outside `[0, size)`.
    pub fn validate(&self, cell: Cell) -> Result<Cell, SpaceError> {
        let mut coords = cell.to_array();
        for (c, extent) in coords.iter_mut().zip(self.extents()) {
            if extent == 1 {
                *c = 0;
            } else if !(0..extent).contains(c) {
                return Err(SpaceError::OutOfBounds {
                    cell,
                    dimensions: *self,
                });
            }
        }
        Ok(Cell::from(coords))
    }

    /// Clamp every coordinate into bounds.
    #[must_use]
    pub fn clamp(&self, cell: Cell) -> Cell {
        let mut coords = cell.to_array();
        for (c, extent) in coords.iter_mut().zip(self.extents()) {
            *c = (*c).clamp(0, extent - 1);
        }
        Cell::from(coords)
    }

    /// Wrap every coordinate onto the torus.
    #[must_use]
    pub fn wrap(&self, cell: Cell) -> Cell {
        let mut coords = cell.to_array();
        for (c, extent) in coords.iter_mut().zip(self.extents()) {
            *c = c.rem_euclid(extent);
        }
        Cell::from(coords)
    }

    /// Row-major id of a cell: `z * w * h + y * w + x`.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::OutOfBounds`] if the cell fails [`validate`](Self::validate).
    pub fn cell_id(&self, cell: Cell) -> Result<usize, SpaceError> {
        let cell = self.validate(cell)?;
        Ok(self.index_of(cell))
    }

    /// Inverse of [`cell_id`](Self::cell_id).
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::CellIdOutOfRange`] if `id` is not below
    /// [`cell_count`](Self::cell_count).
    pub fn cell_at(&self, id: usize) -> Result<Cell, SpaceError> {
        let count = self.cell_count();
        if id >= count {
            return Err(SpaceError::CellIdOutOfRange { id, count });
        }
        let w = self.width.max(1);
        let wh = w * self.height.max(1);
        let z = id / wh;
        let y = (id % wh) / w;
        let x = id % w;
        Ok(Cell::new(x as i64, y as i64, z as i64))
    }

    /// Every cell in row-major order (`x` fastest, then `y`, then `z`).
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let [w, h, d] = self.extents();
        (0..d).flat_map(move |z| (0..h).flat_map(move |y| (0..w).map(move |x| Cell::new(x, y, z))))
    }

    /// Row-major index of an in-bounds cell.
    pub(crate) fn index_of(&self, cell: Cell) -> usize {
        let w = self.width.max(1);
        let h = self.height.max(1);
        cell.z as usize * w * h + cell.y as usize * w + cell.x as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}
