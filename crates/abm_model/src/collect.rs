//! Data collection.
//!
//! [`AgentCollector`] is an ordinary system that appends one JSON record
//! every time it fires. A record maps agent ids to whatever the agent
//! function returned for them, optionally carries the `timestep`, and is
//! merged with the output of the composite function. Empty records are
//! skipped.

use std::fmt;

use abm_component::Agent;
use serde_json::{Map, Value};
use tracing::trace;

use crate::environment::Environment;
use crate::error::ModelError;
use crate::model::Model;
use crate::system::{System, SystemConfig};

/// One collected record.
pub type Record = Map<String, Value>;

type AgentFn = Box<dyn FnMut(&Agent, &Environment) -> Option<Value>>;
type CompositeFn = Box<dyn FnMut(&Environment) -> Option<Record>>;

/// A system that records per-agent and aggregate values.
///
/// # Examples
///
/// ```rust
/// use abm_model::{AgentCollector, Model};
/// use serde_json::json;
///
/// let mut model = Model::new(1);
/// let collector = AgentCollector::new(|agent, _env| Some(json!(agent.len())))
///     .with_timestep();
/// model.add_system(AgentCollector::config(), collector).unwrap();
/// ```
pub struct AgentCollector {
    agent_fn: AgentFn,
    composite_fn: Option<CompositeFn>,
    include_timestep: bool,
    records: Vec<Record>,
}

impl AgentCollector {
    /// Id used by [`config`](Self::config).
    pub const DEFAULT_ID: &'static str = "AgentCollector";

    /// A collector calling `agent_fn` for every agent, in registration
    /// order. Agents for which it returns `None` are left out of the record.
    #[must_use]
    pub fn new<F>(agent_fn: F) -> Self
    where
        F: FnMut(&Agent, &Environment) -> Option<Value> + 'static,
    {
        Self {
            agent_fn: Box::new(agent_fn),
            composite_fn: None,
            include_timestep: false,
            records: Vec::new(),
        }
    }

    /// Merge the map returned by `composite_fn` into every record. Its keys
    /// overwrite agent entries of the same name.
    #[must_use]
    pub fn with_composite<F>(mut self, composite_fn: F) -> Self
    where
        F: FnMut(&Environment) -> Option<Record> + 'static,
    {
        self.composite_fn = Some(Box::new(composite_fn));
        self
    }

    /// Store the timestep under `"timestep"` in every record.
    #[must_use]
    pub fn with_timestep(mut self) -> Self {
        self.include_timestep = true;
        self
    }

    /// The usual registration: id `"AgentCollector"` and priority -1, so it
    /// observes the state left by systems of default priority.
    #[must_use]
    pub fn config() -> SystemConfig {
        SystemConfig::new(Self::DEFAULT_ID).with_priority(-1)
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Drain the records collected so far.
    pub fn take_records(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }

    /// Build and store one record from the current state.
    pub fn collect(&mut self, env: &Environment, timestep: u64) {
        let mut record = Record::new();
        if self.include_timestep {
            record.insert("timestep".to_owned(), Value::from(timestep));
        }
        for agent in env.agents() {
            if let Some(value) = (self.agent_fn)(agent, env) {
                record.insert(agent.id().to_string(), value);
            }
        }
        if let Some(composite) = self.composite_fn.as_mut().and_then(|f| f(env)) {
            record.extend(composite);
        }

        if record.is_empty() {
            return;
        }
        trace!(timestep, entries = record.len(), "record collected");
        self.records.push(record);
    }
}

impl System for AgentCollector {
    fn execute(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let timestep = model.timestep();
        self.collect(model.environment(), timestep);
        Ok(())
    }
}

impl fmt::Debug for AgentCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentCollector")
            .field("include_timestep", &self.include_timestep)
            .field("composite", &self.composite_fn.is_some())
            .field("records", &self.records.len())
            .finish()
    }
}
