//! The simulation root.
//!
//! A [`Model`] owns one [`Environment`], one [`SystemManager`] and one seeded
//! RNG. [`Model::step`] runs every system due at the current timestep, in
//! scheduler order, and then advances the timestep.

use abm_component::{AgentFilter, AgentId, Component, Holder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info};

use crate::config::{ModelConfig, RunConfig};
use crate::environment::Environment;
use crate::error::ModelError;
use crate::scheduler::SystemManager;
use crate::system::{System, SystemConfig};

/// Environment, scheduler and RNG of one simulation.
#[derive(Debug)]
pub struct Model {
    environment: Environment,
    systems: SystemManager,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Model {
    /// A model with an empty, non-spatial environment.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_environment(Environment::new(), seed)
    }

    #[must_use]
    pub fn with_environment(environment: Environment, seed: u64) -> Self {
        Self {
            environment,
            systems: SystemManager::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// A model built from configuration. Without a configured seed one is
    /// drawn from the thread RNG; [`seed`](Self::seed) reports it.
    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, world = ?config.world, "model created");
        Self::with_environment(Environment::from_config(&config.world), seed)
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    #[must_use]
    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    /// The model's RNG. Every random draw in a model should come from here so
    /// runs are reproducible from the seed.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn timestep(&self) -> u64 {
        self.systems.timestep()
    }

    /// Shorthand for [`SystemManager::add_system`].
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateSystem`] or [`ModelError::InvalidFrequency`].
    pub fn add_system<S: System>(&mut self, config: SystemConfig, behavior: S) -> Result<(), ModelError> {
        self.systems.add_system(config, behavior)
    }

    /// Snapshot of every holder of a live `T`.
    #[must_use]
    pub fn get_components<T: Component>(&self) -> Vec<Holder> {
        self.environment.get_components::<T>()
    }

    /// One agent matching `filter`, drawn with the model's RNG.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyPopulation`] if nothing matches.
    pub fn get_random_agent(&mut self, filter: &AgentFilter) -> Result<AgentId, ModelError> {
        self.environment.get_random_agent(filter, &mut self.rng)
    }

    /// Agents matching `filter`, shuffled with the model's RNG.
    pub fn shuffle(&mut self, filter: &AgentFilter) -> Vec<AgentId> {
        self.environment.shuffle(filter, &mut self.rng)
    }

    /// Run one pass of the scheduler.
    ///
    /// The systems due at the current timestep are fixed before the first
    /// one runs: systems added during the pass wait for the next one and
    /// systems removed during the pass are skipped. The timestep advances by
    /// one once every due system has returned, even if none were due.
    ///
    /// # Errors
    ///
    /// The first error returned by a system. The rest of the pass is skipped
    /// and the timestep is not advanced.
    pub fn step(&mut self) -> Result<(), ModelError> {
        let timestep = self.systems.timestep();
        let due = self.systems.due();
        debug!(timestep, systems = due.len(), "executing systems");

        for seq in due {
            let Some((id, mut behavior)) = self.systems.take(seq) else {
                continue;
            };
            let result = behavior.execute(self);
            self.systems.restore(seq, behavior);
            if let Err(err) = result {
                error!(timestep, system = %id, error = %err, "system failed");
                return Err(err);
            }
        }

        self.systems.advance();
        Ok(())
    }

    /// Step `config.steps` times. Returns the timestep reached.
    ///
    /// # Errors
    ///
    /// The first failing pass, see [`step`](Self::step).
    pub fn run(&mut self, config: &RunConfig) -> Result<u64, ModelError> {
        info!(steps = config.steps, seed = self.seed, "run started");
        for _ in 0..config.steps {
            self.step()?;
        }
        info!(timestep = self.timestep(), agents = self.environment.len(), "run complete");
        Ok(self.timestep())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use abm_component::Agent;

    use super::*;
    use crate::system::FnSystem;

    type Log = Rc<RefCell<Vec<(u64, &'static str)>>>;

    fn recorder(log: &Log, name: &'static str) -> impl System + use<> {
        let log = Rc::clone(log);
        FnSystem::new(move |model: &mut Model| {
            log.borrow_mut().push((model.timestep(), name));
            Ok(())
        })
    }

    struct Undefined;
    impl System for Undefined {}

    #[test]
    fn test_step_runs_due_systems_in_priority_order() {
        let log = Log::default();
        let mut model = Model::new(0);
        model.add_system(SystemConfig::new("late"), recorder(&log, "late")).unwrap();
        model
            .add_system(SystemConfig::new("early").with_priority(10), recorder(&log, "early"))
            .unwrap();
        model
            .add_system(
                SystemConfig::new("odd").with_start(1).with_frequency(2),
                recorder(&log, "odd"),
            )
            .unwrap();

        model.run(&RunConfig { steps: 3 }).unwrap();
        assert_eq!(model.timestep(), 3);
        assert_eq!(
            *log.borrow(),
            vec![
                (0, "early"),
                (0, "late"),
                (1, "early"),
                (1, "late"),
                (1, "odd"),
                (2, "early"),
                (2, "late"),
            ]
        );
    }

    #[test]
    fn test_empty_pass_still_advances() {
        let mut model = Model::new(0);
        model.step().unwrap();
        model.step().unwrap();
        assert_eq!(model.timestep(), 2);
    }

    #[test]
    fn test_failure_aborts_pass_without_advancing() {
        let log = Log::default();
        let mut model = Model::new(0);
        model
            .add_system(SystemConfig::new("broken").with_priority(1), Undefined)
            .unwrap();
        model.add_system(SystemConfig::new("after"), recorder(&log, "after")).unwrap();

        let err = model.step().unwrap_err();
        assert!(matches!(err, ModelError::UnimplementedBehavior(_)));
        assert_eq!(model.timestep(), 0);
        assert!(log.borrow().is_empty());
        assert!(model.systems().get::<Undefined>("broken").is_ok());
    }

    #[test]
    fn test_system_can_remove_itself_and_add_others() {
        let log = Log::default();
        let mut model = Model::new(0);
        let spawned = Rc::clone(&log);
        model
            .add_system(
                SystemConfig::new("once"),
                FnSystem::new(move |model: &mut Model| {
                    model.systems_mut().remove_system("once")?;
                    model.add_system(SystemConfig::new("next"), recorder(&spawned, "next"))?;
                    Ok(())
                }),
            )
            .unwrap();

        model.step().unwrap();
        assert!(log.borrow().is_empty());
        assert!(!model.systems().contains("once"));

        model.step().unwrap();
        assert_eq!(*log.borrow(), vec![(1, "next")]);
    }

    #[test]
    fn test_systems_removed_mid_pass_are_skipped() {
        let log = Log::default();
        let mut model = Model::new(0);
        model
            .add_system(
                SystemConfig::new("reaper").with_priority(1),
                FnSystem::new(|model: &mut Model| {
                    model.systems_mut().remove_system("victim")?;
                    Ok(())
                }),
            )
            .unwrap();
        model.add_system(SystemConfig::new("victim"), recorder(&log, "victim")).unwrap();

        model.step().unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(model.timestep(), 1);
    }

    #[test]
    fn test_systems_reach_the_environment() {
        let mut model = Model::new(3);
        model.environment_mut().add_agent(Agent::new("a")).unwrap();
        model
            .add_system(
                SystemConfig::new("spawn"),
                FnSystem::new(|model: &mut Model| {
                    let id = format!("born-{}", model.timestep());
                    model.environment_mut().add_agent(Agent::new(id))?;
                    Ok(())
                }),
            )
            .unwrap();
        model.run(&RunConfig { steps: 2 }).unwrap();
        assert_eq!(model.environment().len(), 3);
        assert!(model.environment().contains("born-1"));
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = Model::new(99);
        let mut b = Model::new(99);
        for i in 0..20 {
            a.environment_mut().add_agent(Agent::new(format!("a{i}"))).unwrap();
            b.environment_mut().add_agent(Agent::new(format!("a{i}"))).unwrap();
        }
        let filter = AgentFilter::new();
        assert_eq!(a.shuffle(&filter), b.shuffle(&filter));
        assert_eq!(a.get_random_agent(&filter).unwrap(), b.get_random_agent(&filter).unwrap());
        assert_eq!(a.rng().random::<u64>(), b.rng().random::<u64>());
    }

    #[test]
    fn test_from_config_records_seed() {
        let model = Model::from_config(&ModelConfig {
            seed: Some(7),
            ..ModelConfig::default()
        });
        assert_eq!(model.seed(), 7);
    }
}
