//! Agent type and identifiers.
//!
//! An [`Agent`] is the entity of the ECS pattern: a caller-supplied
//! [`AgentId`] plus the components attached to it. Ids are opaque strings
//! chosen by the model author; uniqueness is enforced by the registry that
//! holds the agent, not by the agent itself.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentMap, ComponentTypeId};
use crate::error::ComponentError;
use crate::pool::Holder;
use crate::tag::Tag;

/// A unique, caller-supplied agent identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Create an identifier from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for AgentId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&AgentId> for AgentId {
    fn from(id: &AgentId) -> Self {
        id.clone()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The class (kind) of an agent.
///
/// Agents of the same class share any class components attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentClass(String);

impl AgentClass {
    /// Create a class name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AgentClass {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentClass {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for AgentClass {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for AgentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An agent: identity, optional class, tag and instance-level components.
///
/// Components attached before the agent is handed to a registry are indexed
/// when the registry accepts it. Once registered, components should be
/// attached through the registry so its pool index stays in step.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    class: Option<AgentClass>,
    tag: Tag,
    components: ComponentMap,
}

impl Agent {
    /// Create an untagged, classless agent with no components.
    #[must_use]
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            class: None,
            tag: Tag::NONE,
            components: ComponentMap::new(),
        }
    }

    /// Set the agent's class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<AgentClass>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Set the agent's tag.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    /// Attach a component, builder style.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateComponent`] if a single-instance
    /// component of the same type is already attached.
    pub fn with_component<T: Component>(mut self, component: T) -> Result<Self, ComponentError> {
        self.add_component(component)?;
        Ok(self)
    }

    /// Returns the agent's identifier.
    #[must_use]
    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the agent's class, if any.
    #[must_use]
    pub fn class(&self) -> Option<&AgentClass> {
        self.class.as_ref()
    }

    /// Returns the agent's tag.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Replace the agent's tag.
    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    /// Attach a component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DuplicateComponent`] if a single-instance
    /// component of the same type is already attached.
    pub fn add_component<T: Component>(&mut self, component: T) -> Result<(), ComponentError> {
        self.components
            .insert(component)
            .map_err(|_| ComponentError::DuplicateComponent {
                holder: Holder::Agent(self.id.clone()),
                component: T::type_name(),
            })
    }

    /// Detach the most recently attached instance of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::ComponentNotFound`] if the agent holds no `T`.
    pub fn remove_component<T: Component>(&mut self) -> Result<T, ComponentError> {
        self.components
            .remove::<T>()
            .ok_or_else(|| ComponentError::ComponentNotFound {
                holder: Holder::Agent(self.id.clone()),
                component: T::type_name(),
            })
    }

    /// Returns the agent's own instance of `T`.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    /// Returns the agent's own instance of `T` mutably.
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.get_mut::<T>()
    }

    /// Returns every instance of `T` held by the agent.
    #[must_use]
    pub fn get_all_components<T: Component>(&self) -> Vec<&T> {
        self.components.get_all::<T>()
    }

    /// Returns `true` if the agent itself holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.has_type(T::component_type_id())
    }

    /// Returns `true` if the agent itself holds a component of the type.
    #[must_use]
    pub fn has_type(&self, type_id: ComponentTypeId) -> bool {
        self.components.contains_type(type_id)
    }

    /// Returns the agent's component storage.
    #[must_use]
    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    /// Returns the number of component types attached to the agent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the agent has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
