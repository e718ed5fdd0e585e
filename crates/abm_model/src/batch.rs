//! Parameter sweeps for batch experiments.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// Named parameters, each with one or more candidate values.
///
/// [`build`](Self::build) expands the list into the cartesian product of
/// every parameter's values. A JSON array contributes each of its elements;
/// any other value, strings and objects included, is a single candidate.
///
/// ```rust
/// use abm_model::ParameterList;
/// use serde_json::json;
///
/// let mut params = ParameterList::new();
/// params.add_parameter("size", json!(10)).unwrap();
/// params.add_parameter("agents", json!([10, 20])).unwrap();
///
/// let sets = params.build();
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets[1]["agents"], json!(20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterList {
    parameters: IndexMap<String, Value>,
}

impl ParameterList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateParameter`] if the name is taken.
    pub fn add_parameter(&mut self, name: impl Into<String>, values: Value) -> Result<(), ModelError> {
        let name = name.into();
        if self.parameters.contains_key(&name) {
            return Err(ModelError::DuplicateParameter(name));
        }
        self.parameters.insert(name, values);
        Ok(())
    }

    /// Remove a parameter and return its values.
    ///
    /// # Errors
    ///
    /// [`ModelError::ParameterNotFound`] for unknown names.
    pub fn remove_parameter(&mut self, name: &str) -> Result<Value, ModelError> {
        self.parameters
            .shift_remove(name)
            .ok_or_else(|| ModelError::ParameterNotFound(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Every combination of parameter values.
    ///
    /// The first parameter varies slowest. An empty list yields one empty set;
    /// a parameter with an empty array yields no sets at all.
    #[must_use]
    pub fn build(&self) -> Vec<Map<String, Value>> {
        let mut sets = vec![Map::new()];
        for (name, values) in &self.parameters {
            let candidates = match values {
                Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            sets = sets
                .into_iter()
                .flat_map(|set| {
                    candidates.iter().map(move |value| {
                        let mut next = set.clone();
                        next.insert(name.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        sets
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn to_values(sets: Vec<Map<String, Value>>) -> Vec<Value> {
        sets.into_iter().map(Value::Object).collect()
    }

    #[test]
    fn test_cartesian_product_order() {
        let mut params = ParameterList::new();
        params.add_parameter("a", json!([1, 2])).unwrap();
        params.add_parameter("b", json!(["x", "y"])).unwrap();
        params.add_parameter("name", json!("run")).unwrap();

        assert_eq!(
            to_values(params.build()),
            vec![
                json!({ "a": 1, "b": "x", "name": "run" }),
                json!({ "a": 1, "b": "y", "name": "run" }),
                json!({ "a": 2, "b": "x", "name": "run" }),
                json!({ "a": 2, "b": "y", "name": "run" }),
            ]
        );
    }

    #[test]
    fn test_empty_cases() {
        assert_eq!(to_values(ParameterList::new().build()), vec![json!({})]);

        let mut params = ParameterList::new();
        params.add_parameter("a", json!([1, 2])).unwrap();
        params.add_parameter("none", json!([])).unwrap();
        assert!(params.build().is_empty());
    }

    #[test]
    fn test_objects_are_single_values() {
        let mut params = ParameterList::new();
        params.add_parameter("world", json!({ "width": 3 })).unwrap();
        assert_eq!(to_values(params.build()), vec![json!({ "world": { "width": 3 } })]);
    }

    #[test]
    fn test_duplicate_and_missing_names() {
        let mut params = ParameterList::new();
        params.add_parameter("a", json!(1)).unwrap();
        assert!(matches!(
            params.add_parameter("a", json!(2)),
            Err(ModelError::DuplicateParameter(_))
        ));
        assert_eq!(params.remove_parameter("a").unwrap(), json!(1));
        assert!(matches!(
            params.remove_parameter("a"),
            Err(ModelError::ParameterNotFound(_))
        ));
        assert!(params.is_empty());
    }

    #[test]
    fn test_deserializes_from_object() {
        let params: ParameterList = serde_json::from_str(r#"{ "seed": [1, 2, 3] }"#).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.build().len(), 3);
    }
}
