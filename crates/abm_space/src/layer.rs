//! Per-cell data layers.
//!
//! A layer is a named column holding one [`serde_json::Value`] per cell, in
//! row-major cell order. Layers give cells the same kind of dynamic state that
//! components give agents.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::dims::{Cell, Dimensions};
use crate::error::SpaceError;

/// Named per-cell value columns for one discrete world.
#[derive(Debug, Clone)]
pub struct CellLayers {
    dims: Dimensions,
    layers: IndexMap<String, Vec<Value>>,
}

impl CellLayers {
    #[must_use]
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            layers: IndexMap::new(),
        }
    }

    /// Add a layer from one value per cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::DuplicateLayer`] if the name is taken,
    /// [`SpaceError::LayerSizeMismatch`] if `values` does not cover every cell.
    pub fn add_layer(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<(), SpaceError> {
        let name = name.into();
        if self.layers.contains_key(&name) {
            return Err(SpaceError::DuplicateLayer(name));
        }
        let expected = self.dims.cell_count();
        if values.len() != expected {
            return Err(SpaceError::LayerSizeMismatch {
                name,
                expected,
                actual: values.len(),
            });
        }
        self.layers.insert(name, values);
        Ok(())
    }

    /// Add a layer by calling `generator` once per cell, in row-major order.
    ///
    /// # Errors
    ///
    /// [`SpaceError::DuplicateLayer`] if the name is taken.
    pub fn add_layer_with<F>(&mut self, name: impl Into<String>, mut generator: F) -> Result<(), SpaceError>
    where
        F: FnMut(Cell) -> Value,
    {
        let values = self.dims.cells().map(&mut generator).collect();
        self.add_layer(name, values)
    }

    /// Remove a layer and return its values.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`] for unknown names.
    pub fn remove_layer(&mut self, name: &str) -> Result<Vec<Value>, SpaceError> {
        self.layers
            .shift_remove(name)
            .ok_or_else(|| SpaceError::LayerNotFound(name.to_owned()))
    }

    /// Returns the whole column for a layer.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`] for unknown names.
    pub fn layer(&self, name: &str) -> Result<&[Value], SpaceError> {
        self.layers
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SpaceError::LayerNotFound(name.to_owned()))
    }

    /// Returns one layer's value at a cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`] or [`SpaceError::OutOfBounds`].
    pub fn value(&self, name: &str, cell: Cell) -> Result<&Value, SpaceError> {
        let idx = self.dims.cell_id(cell)?;
        let column = self.layer(name)?;
        Ok(&column[idx])
    }

    /// Returns one layer's value at a cell mutably.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`] or [`SpaceError::OutOfBounds`].
    pub fn value_mut(&mut self, name: &str, cell: Cell) -> Result<&mut Value, SpaceError> {
        let idx = self.dims.cell_id(cell)?;
        let column = self
            .layers
            .get_mut(name)
            .ok_or_else(|| SpaceError::LayerNotFound(name.to_owned()))?;
        Ok(&mut column[idx])
    }

    /// Returns every layer's value at a cell, keyed by layer name.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] if the cell is outside the world.
    pub fn cell(&self, cell: Cell) -> Result<Map<String, Value>, SpaceError> {
        let idx = self.dims.cell_id(cell)?;
        Ok(self
            .layers
            .iter()
            .map(|(name, column)| (name.clone(), column[idx].clone()))
            .collect())
    }

    /// Returns the layer names in creation order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_generator_runs_in_row_major_order() {
        let mut layers = CellLayers::new(Dimensions::grid(3, 2));
        layers
            .add_layer_with("id", |cell| json!(cell.y * 3 + cell.x))
            .unwrap();
        let column = layers.layer("id").unwrap();
        assert_eq!(column, &[json!(0), json!(1), json!(2), json!(3), json!(4), json!(5)]);
        assert_eq!(layers.value("id", Cell::new(2, 1, 0)).unwrap(), &json!(5));
    }

    #[test]
    fn test_size_mismatch_and_duplicates() {
        let mut layers = CellLayers::new(Dimensions::line(4));
        let err = layers.add_layer("grass", vec![json!(1); 3]).unwrap_err();
        assert!(matches!(err, SpaceError::LayerSizeMismatch { expected: 4, actual: 3, .. }));

        layers.add_layer("grass", vec![json!(1); 4]).unwrap();
        assert!(matches!(
            layers.add_layer("grass", vec![json!(0); 4]),
            Err(SpaceError::DuplicateLayer(_))
        ));
    }

    #[test]
    fn test_cell_view_and_mutation() {
        let mut layers = CellLayers::new(Dimensions::grid(2, 2));
        layers.add_layer_with("grass", |_| json!(true)).unwrap();
        layers.add_layer_with("height", |cell| json!(cell.x + cell.y)).unwrap();

        *layers.value_mut("grass", Cell::new(1, 1, 0)).unwrap() = json!(false);
        let view = layers.cell(Cell::new(1, 1, 0)).unwrap();
        assert_eq!(view["grass"], json!(false));
        assert_eq!(view["height"], json!(2));
        assert_eq!(layers.names(), vec!["grass", "height"]);
    }

    #[test]
    fn test_missing_layer_and_bad_cell() {
        let mut layers = CellLayers::new(Dimensions::line(2));
        assert!(matches!(layers.value("nope", Cell::ORIGIN), Err(SpaceError::LayerNotFound(_))));
        layers.add_layer("a", vec![json!(0), json!(1)]).unwrap();
        assert!(matches!(
            layers.value("a", Cell::new(5, 0, 0)),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert_eq!(layers.remove_layer("a").unwrap().len(), 2);
        assert!(layers.is_empty());
    }
}
