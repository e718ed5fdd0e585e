//! Bucketed spatial index for discrete worlds.
//!
//! [`DiscreteSpace`] keeps one bucket of keys per cell plus a reverse map from
//! key to cell, so point lookups and neighbourhood queries only touch the
//! cells inside the search volume.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::dims::{Cell, Dimensions};
use crate::error::SpaceError;
use crate::layer::CellLayers;
use crate::neighbourhood::{Neighbourhood, neighbour_cells};

/// A line, grid or cube world tracking the cell of every placed key.
#[derive(Debug, Clone)]
pub struct DiscreteSpace<K> {
    dims: Dimensions,
    toroidal: bool,
    buckets: Vec<Vec<K>>,
    positions: HashMap<K, Cell>,
    layers: CellLayers,
    /// Every bucket below this index is occupied.
    free_from: usize,
}

impl<K> DiscreteSpace<K>
where
    K: Clone + Eq + Hash + Display,
{
    #[must_use]
    pub fn new(dims: Dimensions, toroidal: bool) -> Self {
        Self {
            dims,
            toroidal,
            buckets: vec![Vec::new(); dims.cell_count()],
            positions: HashMap::new(),
            layers: CellLayers::new(dims),
            free_from: 0,
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Whether edges wrap to the opposite side.
    #[must_use]
    pub fn is_toroidal(&self) -> bool {
        self.toroidal
    }

    /// Number of placed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The first cell in row-major order with nothing in it, or the origin
    /// when every cell is occupied.
    #[must_use]
    pub fn first_free_cell(&self) -> Cell {
        self.buckets[self.free_from..]
            .iter()
            .position(Vec::is_empty)
            .and_then(|idx| self.dims.cell_at(self.free_from + idx).ok())
            .unwrap_or(Cell::ORIGIN)
    }

    /// Place a key at a cell, moving it if it is already placed.
    ///
    /// Returns the stored cell, with degenerate axes clamped to 0.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] if the cell is outside the world; the
    /// index is left unchanged.
    pub fn place(&mut self, key: K, cell: Cell) -> Result<Cell, SpaceError> {
        let cell = self.dims.validate(cell)?;
        self.detach(&key);
        self.attach(key, cell);
        Ok(cell)
    }

    /// Place a key at [`first_free_cell`](Self::first_free_cell).
    pub fn place_default(&mut self, key: K) -> Cell {
        let cell = self.first_free_cell();
        self.detach(&key);
        self.attach(key, cell);
        cell
    }

    /// Forget a key. Returns its last cell.
    pub fn remove(&mut self, key: &K) -> Option<Cell> {
        self.detach(key)
    }

    #[must_use]
    pub fn position(&self, key: &K) -> Option<Cell> {
        self.positions.get(key).copied()
    }

    /// Move a placed key to an absolute cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] for unknown keys, [`SpaceError::OutOfBounds`]
    /// for cells outside the world.
    pub fn move_to(&mut self, key: &K, cell: Cell) -> Result<Cell, SpaceError> {
        self.require(key)?;
        self.place(key.clone(), cell)
    }

    /// Move a placed key by a relative offset.
    ///
    /// The result wraps in toroidal worlds and is clamped to the edges
    /// otherwise, so it never fails on bounds.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] for unknown keys.
    pub fn move_by(&mut self, key: &K, delta: Cell) -> Result<Cell, SpaceError> {
        let from = self.require(key)?;
        let target = if self.toroidal {
            self.dims.wrap(from + delta)
        } else {
            self.dims.clamp(from + delta)
        };
        self.place(key.clone(), target)
    }

    /// Keys within Chebyshev distance `leeway` of a cell.
    ///
    /// Cells are visited in row-major order; keys within a cell keep their
    /// arrival order.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] if the cell is outside the world.
    pub fn agents_at(&self, cell: Cell, leeway: u32) -> Result<Vec<K>, SpaceError> {
        let cell = self.dims.validate(cell)?;
        let cells = neighbour_cells(&self.dims, cell, leeway, Neighbourhood::Moore, self.toroidal, true);
        Ok(self.collect(&cells, None))
    }

    /// Keys in the neighbourhood of a placed key, excluding the key itself.
    ///
    /// Other keys sharing the key's cell are included.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotPlaced`] for unknown keys.
    pub fn neighbours(&self, key: &K, radius: u32, mode: Neighbourhood) -> Result<Vec<K>, SpaceError> {
        let centre = self.require(key)?;
        let cells = neighbour_cells(&self.dims, centre, radius, mode, self.toroidal, true);
        Ok(self.collect(&cells, Some(key)))
    }

    /// Cells around `cell` in row-major order.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] if the cell is outside the world.
    pub fn neighbour_cells(
        &self,
        cell: Cell,
        radius: u32,
        mode: Neighbourhood,
        include_centre: bool,
    ) -> Result<Vec<Cell>, SpaceError> {
        let cell = self.dims.validate(cell)?;
        Ok(neighbour_cells(&self.dims, cell, radius, mode, self.toroidal, include_centre))
    }

    #[must_use]
    pub fn layers(&self) -> &CellLayers {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut CellLayers {
        &mut self.layers
    }

    fn require(&self, key: &K) -> Result<Cell, SpaceError> {
        self.position(key)
            .ok_or_else(|| SpaceError::NotPlaced(key.to_string()))
    }

    fn attach(&mut self, key: K, cell: Cell) {
        self.buckets[self.dims.index_of(cell)].push(key.clone());
        self.positions.insert(key, cell);
        while self.buckets.get(self.free_from).is_some_and(|bucket| !bucket.is_empty()) {
            self.free_from += 1;
        }
    }

    fn detach(&mut self, key: &K) -> Option<Cell> {
        let cell = self.positions.remove(key)?;
        let idx = self.dims.index_of(cell);
        let bucket = &mut self.buckets[idx];
        if let Some(pos) = bucket.iter().position(|k| k == key) {
            bucket.remove(pos);
        }
        if bucket.is_empty() {
            self.free_from = self.free_from.min(idx);
        }
        Some(cell)
    }

    fn collect(&self, cells: &[Cell], skip: Option<&K>) -> Vec<K> {
        cells
            .iter()
            .flat_map(|cell| &self.buckets[self.dims.index_of(*cell)])
            .filter(|k| skip != Some(*k))
            .cloned()
            .collect()
    }
}
