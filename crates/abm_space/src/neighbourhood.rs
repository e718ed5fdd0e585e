//! Neighbourhood shapes and cell enumeration.

use serde::{Deserialize, Serialize};

use crate::dims::{Cell, Dimensions};

/// The shape of a neighbourhood query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighbourhood {
    /// Every cell within Chebyshev distance `r`: a hyper-cube of side `2r + 1`.
    #[default]
    Moore,
    /// Every cell within Manhattan distance `r`.
    Neumann,
}

impl Neighbourhood {
    /// Returns `true` if an offset from the centre lies inside the shape.
    #[must_use]
    pub fn reaches(self, offset: Cell, radius: i64) -> bool {
        match self {
            Self::Moore => Cell::ORIGIN.chebyshev(offset) <= radius,
            Self::Neumann => Cell::ORIGIN.manhattan(offset) <= radius,
        }
    }

    /// Distance between two points under this shape's metric.
    #[must_use]
    pub fn distance(self, delta: glam::DVec3) -> f64 {
        let d = delta.abs();
        match self {
            Self::Moore => d.max_element(),
            Self::Neumann => d.element_sum(),
        }
    }
}

/// Enumerate the cells around `centre` in row-major order.
///
/// Degenerate axes contribute no offsets. Without `wrap`, cells outside the
/// world are skipped; with it, coordinates wrap onto the torus and each cell
/// is reported once, at its shortest wrapped distance. The centre cell is
/// reported only when `include_centre` is set, even if wrapping would reach
/// it from another offset.
///
/// Each axis is bounded by the world's extent, so the work never exceeds the
/// size of the world however large `radius` is.
///
/// `centre` must already lie inside `dims`.
#[must_use]
pub fn neighbour_cells(
    dims: &Dimensions,
    centre: Cell,
    radius: u32,
    mode: Neighbourhood,
    wrap: bool,
    include_centre: bool,
) -> Vec<Cell> {
    let r = i64::from(radius);
    let extents = dims.extents();
    let origin = centre.to_array();
    let [xs, ys, zs] = [0, 1, 2].map(|axis| axis_span(origin[axis], extents[axis], r, wrap));

    let mut cells = Vec::new();
    for &(z, dz) in &zs {
        for &(y, dy) in &ys {
            for &(x, dx) in &xs {
                let offset = Cell::new(dx, dy, dz);
                if !mode.reaches(offset, r) {
                    continue;
                }
                if offset == Cell::ORIGIN && !include_centre {
                    continue;
                }
                cells.push(Cell::new(x, y, z));
            }
        }
    }
    cells
}

/// Coordinates within `r` of `c` along one axis, ascending, each paired with
/// its shortest signed offset from `c`.
fn axis_span(c: i64, extent: i64, r: i64, wrap: bool) -> Vec<(i64, i64)> {
    if extent == 1 {
        return vec![(0, 0)];
    }
    if !wrap {
        return ((c - r).max(0)..=(c + r).min(extent - 1))
            .map(|t| (t, t - c))
            .collect();
    }
    if 2 * r + 1 >= extent {
        return (0..extent)
            .map(|t| {
                let ahead = (t - c).rem_euclid(extent);
                (t, ahead.min(extent - ahead))
            })
            .collect();
    }
    let mut span: Vec<(i64, i64)> = (-r..=r).map(|d| ((c + d).rem_euclid(extent), d)).collect();
    span.sort_unstable();
    span
}
