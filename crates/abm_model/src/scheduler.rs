//! System scheduler.
//!
//! The [`SystemManager`] keeps registered systems in execution order and owns
//! the model's timestep counter. Order is by descending priority; systems of
//! equal priority run in registration order.
//!
//! Behaviors are lent out to the model while they run: the model takes a
//! behavior, hands it `&mut Model`, and restores it afterwards. Each entry
//! carries a sequence number so a behavior removed (or replaced under the same
//! id) during its own run is never restored into the wrong slot.

use std::any::type_name;

use tracing::debug;

use crate::error::ModelError;
use crate::system::{System, SystemConfig, SystemId};

struct Entry {
    config: SystemConfig,
    seq: u64,
    behavior: Option<Box<dyn System>>,
}

/// Ordered system storage plus the timestep counter.
#[derive(Default)]
pub struct SystemManager {
    timestep: u64,
    entries: Vec<Entry>,
    next_seq: u64,
}

impl SystemManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current timestep. Starts at 0 and only increases.
    #[must_use]
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Register a behavior under `config`.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateSystem`] if the id is taken,
    /// [`ModelError::InvalidFrequency`] if `config.frequency` is 0.
    pub fn add_system<S: System>(&mut self, config: SystemConfig, behavior: S) -> Result<(), ModelError> {
        self.add_boxed(config, Box::new(behavior))
    }

    /// Register an already boxed behavior.
    ///
    /// # Errors
    ///
    /// See [`add_system`](Self::add_system).
    pub fn add_boxed(&mut self, config: SystemConfig, behavior: Box<dyn System>) -> Result<(), ModelError> {
        if self.contains(&config.id) {
            return Err(ModelError::DuplicateSystem(config.id));
        }
        if config.frequency == 0 {
            return Err(ModelError::InvalidFrequency(config.id));
        }
        let pos = self
            .entries
            .partition_point(|e| e.config.priority >= config.priority);
        debug!(
            system = %config.id,
            priority = config.priority,
            frequency = config.frequency,
            start = config.start,
            position = pos,
            "system added"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            pos,
            Entry {
                config,
                seq,
                behavior: Some(behavior),
            },
        );
        Ok(())
    }

    /// Deregister a system and return its configuration.
    ///
    /// Removing a system while it runs (including from its own behavior) is
    /// allowed; the behavior is dropped once its run returns.
    ///
    /// # Errors
    ///
    /// [`ModelError::SystemNotFound`] for unknown ids.
    pub fn remove_system(&mut self, id: &str) -> Result<SystemConfig, ModelError> {
        let pos = self.position(id)?;
        let entry = self.entries.remove(pos);
        debug!(system = %entry.config.id, "system removed");
        Ok(entry.config)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.config.id.as_str() == id)
    }

    /// Returns a system's configuration.
    ///
    /// # Errors
    ///
    /// [`ModelError::SystemNotFound`] for unknown ids.
    pub fn config(&self, id: &str) -> Result<&SystemConfig, ModelError> {
        let pos = self.position(id)?;
        Ok(&self.entries[pos].config)
    }

    /// Returns a registered behavior as its concrete type.
    ///
    /// A behavior is not reachable while it is running.
    ///
    /// # Errors
    ///
    /// [`ModelError::SystemNotFound`] for unknown or running systems,
    /// [`ModelError::SystemTypeMismatch`] if the behavior is not a `T`.
    pub fn get<T: System>(&self, id: &str) -> Result<&T, ModelError> {
        let pos = self.position(id)?;
        let entry = &self.entries[pos];
        let behavior = entry
            .behavior
            .as_deref()
            .ok_or_else(|| ModelError::SystemNotFound(entry.config.id.clone()))?;
        behavior
            .downcast_ref::<T>()
            .ok_or_else(|| ModelError::SystemTypeMismatch {
                id: entry.config.id.clone(),
                expected: type_name::<T>(),
            })
    }

    /// Returns a registered behavior as its concrete type, mutably.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_mut<T: System>(&mut self, id: &str) -> Result<&mut T, ModelError> {
        let pos = self.position(id)?;
        let entry = &mut self.entries[pos];
        let id = entry.config.id.clone();
        let behavior = entry
            .behavior
            .as_deref_mut()
            .ok_or_else(|| ModelError::SystemNotFound(id.clone()))?;
        behavior
            .downcast_mut::<T>()
            .ok_or_else(move || ModelError::SystemTypeMismatch {
                id,
                expected: type_name::<T>(),
            })
    }

    /// System ids in execution order.
    #[must_use]
    pub fn ids(&self) -> Vec<SystemId> {
        self.entries.iter().map(|e| e.config.id.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence numbers of the systems due at the current timestep, in
    /// execution order.
    pub(crate) fn due(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.config.is_due(self.timestep))
            .map(|e| e.seq)
            .collect()
    }

    /// Lend out a behavior for execution.
    ///
    /// Returns `None` if the entry was removed since [`due`](Self::due) was
    /// taken.
    pub(crate) fn take(&mut self, seq: u64) -> Option<(SystemId, Box<dyn System>)> {
        let entry = self.entries.iter_mut().find(|e| e.seq == seq)?;
        let behavior = entry.behavior.take()?;
        Some((entry.config.id.clone(), behavior))
    }

    /// Return a lent behavior. Dropped if its entry no longer exists.
    pub(crate) fn restore(&mut self, seq: u64, behavior: Box<dyn System>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.seq == seq) {
            entry.behavior = Some(behavior);
        }
    }

    pub(crate) fn advance(&mut self) {
        self.timestep += 1;
    }

    fn position(&self, id: &str) -> Result<usize, ModelError> {
        self.entries
            .iter()
            .position(|e| e.config.id.as_str() == id)
            .ok_or_else(|| ModelError::SystemNotFound(SystemId::from(id)))
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemManager")
            .field("timestep", &self.timestep)
            .field("systems", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    struct Noop;
    impl System for Noop {
        fn execute(&mut self, _model: &mut Model) -> Result<(), ModelError> {
            Ok(())
        }
    }

    struct Counter(u32);
    impl System for Counter {
        fn execute(&mut self, _model: &mut Model) -> Result<(), ModelError> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_higher_priority_first_ties_in_insertion_order() {
        let mut systems = SystemManager::new();
        systems.add_system(SystemConfig::new("low").with_priority(-1), Noop).unwrap();
        systems.add_system(SystemConfig::new("a"), Noop).unwrap();
        systems.add_system(SystemConfig::new("high").with_priority(5), Noop).unwrap();
        systems.add_system(SystemConfig::new("b"), Noop).unwrap();

        let ids: Vec<String> = systems.ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["high", "a", "b", "low"]);
    }

    #[test]
    fn test_duplicate_and_invalid_frequency() {
        let mut systems = SystemManager::new();
        systems.add_system(SystemConfig::new("s"), Noop).unwrap();
        assert!(matches!(
            systems.add_system(SystemConfig::new("s"), Noop),
            Err(ModelError::DuplicateSystem(_))
        ));
        assert!(matches!(
            systems.add_system(SystemConfig::new("z").with_frequency(0), Noop),
            Err(ModelError::InvalidFrequency(_))
        ));
        assert_eq!(systems.len(), 1);
    }

    #[test]
    fn test_remove_unknown_system() {
        let mut systems = SystemManager::new();
        assert!(matches!(systems.remove_system("ghost"), Err(ModelError::SystemNotFound(_))));
    }

    #[test]
    fn test_typed_lookup() {
        let mut systems = SystemManager::new();
        systems.add_system(SystemConfig::new("count"), Counter(4)).unwrap();
        assert_eq!(systems.get::<Counter>("count").unwrap().0, 4);
        systems.get_mut::<Counter>("count").unwrap().0 = 9;
        assert_eq!(systems.get::<Counter>("count").unwrap().0, 9);
        assert!(matches!(
            systems.get::<Noop>("count"),
            Err(ModelError::SystemTypeMismatch { .. })
        ));
        assert!(systems.config("count").is_ok());
    }

    #[test]
    fn test_restore_after_removal_drops_behavior() {
        let mut systems = SystemManager::new();
        systems.add_system(SystemConfig::new("s"), Noop).unwrap();
        let seq = systems.due()[0];
        let (_, behavior) = systems.take(seq).unwrap();
        systems.remove_system("s").unwrap();
        systems.add_system(SystemConfig::new("s"), Counter(0)).unwrap();
        systems.restore(seq, behavior);
        assert!(systems.get::<Counter>("s").is_ok());
    }

    #[test]
    fn test_due_respects_timestep() {
        let mut systems = SystemManager::new();
        systems
            .add_system(SystemConfig::new("late").with_start(2), Noop)
            .unwrap();
        assert!(systems.due().is_empty());
        systems.advance();
        systems.advance();
        assert_eq!(systems.due().len(), 1);
        assert_eq!(systems.timestep(), 2);
    }
}
