//! # abm_model
//!
//! The simulation layer of the agent-based modelling runtime.
//!
//! - [`Environment`]: the agent registry, kept in step with the component
//!   pools, the tag groups and the spatial world.
//! - [`System`] / [`SystemConfig`]: behaviors and when they fire.
//! - [`SystemManager`]: priority-ordered systems and the timestep counter.
//! - [`Model`]: environment, scheduler and seeded RNG; [`Model::step`] runs
//!   one pass.
//! - [`AgentCollector`] and [`ParameterList`]: data collection and parameter
//!   sweeps.
//!
//! ```rust
//! use abm_component::{Agent, Component};
//! use abm_model::{FnSystem, Model, RunConfig, SystemConfig};
//!
//! struct Energy(u32);
//! impl Component for Energy {}
//!
//! let mut model = Model::new(42);
//! let agent = Agent::new("a1").with_component(Energy(3)).unwrap();
//! model.environment_mut().add_agent(agent).unwrap();
//! model
//!     .add_system(
//!         SystemConfig::new("decay"),
//!         FnSystem::new(|model: &mut Model| {
//!             model.environment_mut().get_component_mut::<Energy>("a1")?.0 -= 1;
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//!
//! model.run(&RunConfig { steps: 3 }).unwrap();
//! assert_eq!(model.environment().get_component::<Energy>("a1").unwrap().0, 0);
//! ```

pub mod batch;
pub mod collect;
pub mod config;
pub mod environment;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod system;

pub use batch::ParameterList;
pub use collect::{AgentCollector, Record};
pub use config::{ModelConfig, RunConfig, WorldConfig};
pub use environment::{Environment, Space};
pub use error::ModelError;
pub use model::Model;
pub use scheduler::SystemManager;
pub use system::{FnSystem, System, SystemConfig, SystemId};
