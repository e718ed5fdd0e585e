//! Agent filters.
//!
//! An [`AgentFilter`] declares which agents a query selects: the component
//! types they must and must not hold, a tag, a class, and ids to skip. The
//! registry evaluates filters against its agents in insertion order.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentClass, AgentId};
use crate::component::{Component, ComponentMap, ComponentTypeId};
use crate::tag::Tag;

/// Declarative agent selection.
///
/// An empty filter matches every agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentFilter {
    /// Component types every matched agent must hold.
    pub with: Vec<ComponentTypeId>,
    /// Component types no matched agent may hold.
    pub without: Vec<ComponentTypeId>,
    /// Only match agents carrying this tag.
    pub tag: Option<Tag>,
    /// Only match agents of this class.
    pub class: Option<AgentClass>,
    /// Agents to skip.
    pub except: Vec<AgentId>,
}

impl AgentFilter {
    /// Create a filter that matches every agent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require component `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_type(T::component_type_id())
    }

    /// Require a component type by id.
    #[must_use]
    pub fn with_type(mut self, type_id: ComponentTypeId) -> Self {
        self.with.push(type_id);
        self
    }

    /// Exclude agents holding component `T`.
    #[must_use]
    pub fn without<T: Component>(mut self) -> Self {
        self.without.push(T::component_type_id());
        self
    }

    /// Only match agents carrying `tag`.
    #[must_use]
    pub fn tagged(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Only match agents of `class`.
    #[must_use]
    pub fn of_class(mut self, class: impl Into<AgentClass>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Skip the given agent.
    #[must_use]
    pub fn except(mut self, id: impl Into<AgentId>) -> Self {
        self.except.push(id.into());
        self
    }

    /// Returns `true` if the agent satisfies every constraint.
    ///
    /// `shared` holds the components of the agent's class, which count as
    /// held by the agent.
    #[must_use]
    pub fn matches(&self, agent: &Agent, shared: Option<&ComponentMap>) -> bool {
        let holds = |ty: &ComponentTypeId| {
            agent.has_type(*ty) || shared.is_some_and(|map| map.contains_type(*ty))
        };

        if self.tag.is_some_and(|tag| agent.tag() != tag) {
            return false;
        }
        if let Some(class) = &self.class {
            if agent.class() != Some(class) {
                return false;
            }
        }
        if self.except.contains(agent.id()) {
            return false;
        }
        self.with.iter().all(holds) && !self.without.iter().any(holds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wealth(u32);
    impl Component for Wealth {}

    struct Hunger;
    impl Component for Hunger {}

    #[test]
    fn test_empty_filter_matches_everything() {
        let agent = Agent::new("a");
        assert!(AgentFilter::new().matches(&agent, None));
    }

    #[test]
    fn test_with_and_without() {
        let rich = Agent::new("rich").with_component(Wealth(10)).unwrap();
        let hungry = Agent::new("hungry")
            .with_component(Wealth(1))
            .unwrap()
            .with_component(Hunger)
            .unwrap();

        let filter = AgentFilter::new().with::<Wealth>().without::<Hunger>();
        assert!(filter.matches(&rich, None));
        assert!(!filter.matches(&hungry, None));
        assert_eq!(rich.get_component::<Wealth>().map(|w| w.0), Some(10));
    }

    #[test]
    fn test_class_components_count_as_held() {
        let agent = Agent::new("sheep-1").with_class("Sheep");
        let mut shared = ComponentMap::new();
        assert!(shared.insert(Hunger).is_ok());

        let filter = AgentFilter::new().with::<Hunger>();
        assert!(!filter.matches(&agent, None));
        assert!(filter.matches(&agent, Some(&shared)));
    }

    #[test]
    fn test_tag_class_and_except() {
        let agent = Agent::new("w1").with_class("Wolf").with_tag(Tag(2));

        assert!(AgentFilter::new().tagged(Tag(2)).matches(&agent, None));
        assert!(!AgentFilter::new().tagged(Tag::NONE).matches(&agent, None));
        assert!(AgentFilter::new().of_class("Wolf").matches(&agent, None));
        assert!(!AgentFilter::new().of_class("Sheep").matches(&agent, None));
        assert!(!AgentFilter::new().except("w1").matches(&agent, None));
    }
}
