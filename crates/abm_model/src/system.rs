//! The [`System`] trait and system configuration.
//!
//! A system is a unit of behavior the scheduler runs on a cadence. Each
//! registered system pairs a behavior with a [`SystemConfig`] describing when
//! it fires:
//!
//! ```text
//! fires at t  <=>  start <= t <= end  and  (t - start) % frequency == 0
//! ```

use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::Model;

/// A unique system identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SystemId(String);

impl SystemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SystemId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SystemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SystemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SystemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A behavior run by the scheduler.
///
/// `execute` receives the whole model and may read or change anything in it,
/// including adding or removing agents and systems. A type that does not
/// override `execute` fails with [`ModelError::UnimplementedBehavior`] when
/// it is first scheduled, not when it is registered.
///
/// # Examples
///
/// ```rust
/// use abm_model::{Model, ModelError, System};
///
/// struct Counter(u32);
///
/// impl System for Counter {
///     fn execute(&mut self, _model: &mut Model) -> Result<(), ModelError> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait System: Any {
    /// Run the behavior once for the current timestep.
    fn execute(&mut self, _model: &mut Model) -> Result<(), ModelError> {
        Err(ModelError::UnimplementedBehavior(std::any::type_name::<Self>()))
    }
}

impl dyn System {
    /// Returns the behavior as `T` if it is one.
    #[must_use]
    pub fn downcast_ref<T: System>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Returns the behavior as `T` mutably if it is one.
    pub fn downcast_mut<T: System>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// A system backed by a closure.
pub struct FnSystem<F>(F);

impl<F> FnSystem<F>
where
    F: FnMut(&mut Model) -> Result<(), ModelError> + 'static,
{
    #[must_use]
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut Model) -> Result<(), ModelError> + 'static,
{
    fn execute(&mut self, model: &mut Model) -> Result<(), ModelError> {
        (self.0)(model)
    }
}

impl<F> fmt::Debug for FnSystem<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSystem")
    }
}

/// Scheduling parameters for a registered system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Unique system id.
    pub id: SystemId,
    /// Higher priorities run earlier within a timestep.
    pub priority: i32,
    /// Fire every `frequency` timesteps. Must be at least 1.
    pub frequency: u64,
    /// First eligible timestep.
    pub start: u64,
    /// Last eligible timestep, inclusive.
    pub end: u64,
}

impl SystemConfig {
    /// A system that fires every timestep from 0 with priority 0.
    #[must_use]
    pub fn new(id: impl Into<SystemId>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            frequency: 1,
            start: 0,
            end: u64::MAX,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: u64) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: u64) -> Self {
        self.end = end;
        self
    }

    /// Returns `true` if the system fires at `timestep`.
    #[must_use]
    pub fn is_due(&self, timestep: u64) -> bool {
        self.frequency > 0
            && (self.start..=self.end).contains(&timestep)
            && (timestep - self.start) % self.frequency == 0
    }
}
