//! Component pool index.
//!
//! A secondary index from component type to every holder currently owning an
//! instance of that type. Pools never own components: each entry names a
//! [`Holder`] and the registry resolves it. Entries appear in attach order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentClass, AgentId};
use crate::component::ComponentTypeId;
use crate::error::ComponentError;

/// The owner of a pooled component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    /// An instance-level component on a single agent.
    Agent(AgentId),
    /// A class component shared by every agent of the class.
    Class(AgentClass),
    /// A component attached to the environment itself.
    Environment,
}

impl Holder {
    /// Returns the agent id if this holder is a single agent.
    #[must_use]
    pub fn agent(&self) -> Option<&AgentId> {
        match self {
            Self::Agent(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(id) => write!(f, "agent `{id}`"),
            Self::Class(class) => write!(f, "class `{class}`"),
            Self::Environment => f.write_str("the environment"),
        }
    }
}

/// Type-keyed index of live component holders.
#[derive(Debug, Default)]
pub struct ComponentPools {
    pools: BTreeMap<ComponentTypeId, Vec<Holder>>,
}

impl ComponentPools {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one component instance held by `holder`.
    ///
    /// Single-instance types may only be registered once per holder.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::AlreadyRegistered`] on a second registration
    /// of a single-instance type for the same holder.
    pub fn register(
        &mut self,
        type_id: ComponentTypeId,
        holder: Holder,
        multi: bool,
    ) -> Result<(), ComponentError> {
        let pool = self.pools.entry(type_id).or_default();
        if !multi && pool.contains(&holder) {
            return Err(ComponentError::AlreadyRegistered {
                component: type_id,
                holder,
            });
        }
        pool.push(holder);
        Ok(())
    }

    /// Deregister the most recently registered instance held by `holder`.
    ///
    /// Pools left empty are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NotRegistered`] if no such entry exists.
    pub fn deregister(
        &mut self,
        type_id: ComponentTypeId,
        holder: &Holder,
    ) -> Result<(), ComponentError> {
        let not_registered = || ComponentError::NotRegistered {
            component: type_id,
            holder: holder.clone(),
        };
        let pool = self.pools.get_mut(&type_id).ok_or_else(not_registered)?;
        let pos = pool
            .iter()
            .rposition(|h| h == holder)
            .ok_or_else(not_registered)?;
        pool.remove(pos);
        if pool.is_empty() {
            self.pools.remove(&type_id);
        }
        Ok(())
    }

    /// Deregister every instance of the type held by `holder`.
    ///
    /// Returns the number of entries removed.
    pub fn deregister_all(&mut self, type_id: ComponentTypeId, holder: &Holder) -> usize {
        let Some(pool) = self.pools.get_mut(&type_id) else {
            return 0;
        };
        let before = pool.len();
        pool.retain(|h| h != holder);
        let removed = before - pool.len();
        if pool.is_empty() {
            self.pools.remove(&type_id);
        }
        removed
    }

    /// Returns a snapshot of the pool for a type, in attach order.
    ///
    /// An unknown type yields an empty vector.
    #[must_use]
    pub fn get(&self, type_id: ComponentTypeId) -> Vec<Holder> {
        self.pools.get(&type_id).cloned().unwrap_or_default()
    }

    /// Returns the number of pooled instances of a type.
    #[must_use]
    pub fn count(&self, type_id: ComponentTypeId) -> usize {
        self.pools.get(&type_id).map_or(0, Vec::len)
    }

    /// Returns `true` if `holder` has at least one pooled instance of the type.
    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId, holder: &Holder) -> bool {
        self.pools
            .get(&type_id)
            .is_some_and(|pool| pool.contains(holder))
    }

    /// Returns every component type with a non-empty pool.
    #[must_use]
    pub fn types(&self) -> Vec<ComponentTypeId> {
        self.pools.keys().copied().collect()
    }

    /// Returns the number of non-empty pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns `true` if nothing is pooled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
