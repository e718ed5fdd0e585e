//! Serializable model and run configuration.
//!
//! A loader can deserialize a [`ModelConfig`] and hand it to
//! [`Model::from_config`](crate::Model::from_config); agents and systems are
//! then added through the regular API.

use abm_space::{DVec3, Dimensions};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;

/// Configuration for a [`Model`](crate::Model).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// RNG seed. A random seed is drawn when absent.
    pub seed: Option<u64>,
    /// The spatial world.
    pub world: WorldConfig,
}

/// The spatial world of an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldConfig {
    /// No positions.
    #[default]
    Void,
    Line {
        width: usize,
        #[serde(default)]
        toroidal: bool,
    },
    Grid {
        width: usize,
        height: usize,
        #[serde(default)]
        toroidal: bool,
    },
    Cube {
        width: usize,
        height: usize,
        depth: usize,
        #[serde(default)]
        toroidal: bool,
    },
    /// A continuous world of `[0, bounds)` on every axis.
    Continuous {
        bounds: [f64; 3],
        #[serde(default)]
        toroidal: bool,
    },
}

/// How many timesteps [`Model::run`](crate::Model::run) executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { steps: 1 }
    }
}

impl Environment {
    /// Build an empty environment for a world configuration.
    #[must_use]
    pub fn from_config(world: &WorldConfig) -> Self {
        match *world {
            WorldConfig::Void => Self::new(),
            WorldConfig::Line { width, toroidal } => Self::discrete(Dimensions::line(width), toroidal),
            WorldConfig::Grid {
                width,
                height,
                toroidal,
            } => Self::discrete(Dimensions::grid(width, height), toroidal),
            WorldConfig::Cube {
                width,
                height,
                depth,
                toroidal,
            } => Self::discrete(Dimensions::cube(width, height, depth), toroidal),
            WorldConfig::Continuous { bounds, toroidal } => {
                Self::continuous(DVec3::from_array(bounds), toroidal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::Space;

    use super::*;

    #[test]
    fn test_world_config_from_json() {
        let config: ModelConfig = serde_json::from_str(
            r#"{ "seed": 42, "world": { "kind": "grid", "width": 4, "height": 3, "toroidal": true } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.world,
            WorldConfig::Grid {
                width: 4,
                height: 3,
                toroidal: true
            }
        );

        let env = Environment::from_config(&config.world);
        let space = env.discrete_space().unwrap();
        assert_eq!(space.dimensions(), Dimensions::grid(4, 3));
        assert!(space.is_toroidal());
    }

    #[test]
    fn test_defaults() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
        assert!(matches!(Environment::from_config(&config.world).space(), Space::Void));

        let run: RunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(run.steps, 1);
    }

    #[test]
    fn test_continuous_world() {
        let world = WorldConfig::Continuous {
            bounds: [5.0, 5.0, 0.0],
            toroidal: false,
        };
        let env = Environment::from_config(&world);
        assert_eq!(
            env.continuous_space().unwrap().bounds(),
            DVec3::new(5.0, 5.0, 0.0)
        );
    }
}
