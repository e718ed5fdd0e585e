//! The agent registry and its spatial world.
//!
//! [`Environment`] owns every live agent and keeps the derived indices in step
//! with it: the component pools, the tag groups and, when the environment has
//! a spatial world, the position index. All mutation goes through the
//! environment so the indices can never drift from the agents they describe.
//!
//! Components resolve in two layers. An agent's own instance wins; otherwise
//! the component attached to the agent's class is used. Class components are
//! stored once per class and appear once in the pools however many agents
//! share them. The environment can also hold components of its own.

use abm_component::{
    Agent, AgentClass, AgentFilter, AgentId, Component, ComponentError, ComponentMap,
    ComponentPools, Holder, Tag, TagLibrary,
};
use abm_space::{
    Cell, ContinuousSpace, DVec3, Dimensions, DiscreteSpace, Neighbourhood, SpaceError,
};
use indexmap::IndexMap;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ModelError;

/// The spatial world of an environment.
#[derive(Debug)]
pub enum Space {
    /// No positions.
    Void,
    /// Line, grid or cube of cells.
    Discrete(DiscreteSpace<AgentId>),
    /// Continuous [`DVec3`] positions.
    Continuous(ContinuousSpace<AgentId>),
}

enum Placement {
    Default,
    Cell(Cell),
    Point(DVec3),
}

/// Agent registry, component pools, tag groups and spatial world.
#[derive(Debug)]
pub struct Environment {
    agents: IndexMap<AgentId, Agent>,
    class_components: IndexMap<AgentClass, ComponentMap>,
    components: ComponentMap,
    pools: ComponentPools,
    tags: TagLibrary,
    space: Space,
}

impl Default for Environment {
    fn default() -> Self {
        Self::with_space(Space::Void)
    }
}

impl Environment {
    /// An environment without a spatial world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment over a discrete world.
    #[must_use]
    pub fn discrete(dims: Dimensions, toroidal: bool) -> Self {
        Self::with_space(Space::Discrete(DiscreteSpace::new(dims, toroidal)))
    }

    /// A bounded one-dimensional world of `width` cells.
    #[must_use]
    pub fn line(width: usize) -> Self {
        Self::discrete(Dimensions::line(width), false)
    }

    /// A bounded two-dimensional world.
    #[must_use]
    pub fn grid(width: usize, height: usize) -> Self {
        Self::discrete(Dimensions::grid(width, height), false)
    }

    /// A bounded three-dimensional world.
    ///
    /// Use [`discrete`](Self::discrete) for a toroidal one.
    #[must_use]
    pub fn cube(width: usize, height: usize, depth: usize) -> Self {
        Self::discrete(Dimensions::cube(width, height, depth), false)
    }

    /// An environment over a continuous world of the given size.
    #[must_use]
    pub fn continuous(bounds: DVec3, toroidal: bool) -> Self {
        Self::with_space(Space::Continuous(ContinuousSpace::new(bounds, toroidal)))
    }

    fn with_space(space: Space) -> Self {
        Self {
            agents: IndexMap::new(),
            class_components: IndexMap::new(),
            components: ComponentMap::new(),
            pools: ComponentPools::new(),
            tags: TagLibrary::new(),
            space,
        }
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Register an agent.
    ///
    /// Its components are indexed, it joins its tag group and, in a spatial
    /// world, it is placed at the default position: the first empty cell in
    /// row-major order (the origin if every cell is taken) or the origin of a
    /// continuous world.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateAgent`] if the id is taken and
    /// [`ComponentError::TagNotFound`] if the agent's tag was never
    /// registered; the registry is left unchanged.
    pub fn add_agent(&mut self, agent: Agent) -> Result<(), ModelError> {
        self.admit(agent, Placement::Default)
    }

    /// Register an agent at a cell of a discrete world.
    ///
    /// # Errors
    ///
    /// As [`add_agent`](Self::add_agent), plus [`SpaceError::OutOfBounds`]
    /// for cells outside the world and [`ModelError::NotSpatial`] /
    /// [`SpaceError::WrongTopology`] for environments without cells.
    pub fn add_agent_at(&mut self, agent: Agent, cell: impl Into<Cell>) -> Result<(), ModelError> {
        self.admit(agent, Placement::Cell(cell.into()))
    }

    /// Register an agent at a point of a continuous world.
    ///
    /// # Errors
    ///
    /// As [`add_agent_at`](Self::add_agent_at).
    pub fn add_agent_at_point(&mut self, agent: Agent, point: DVec3) -> Result<(), ModelError> {
        self.admit(agent, Placement::Point(point))
    }

    fn admit(&mut self, agent: Agent, placement: Placement) -> Result<(), ModelError> {
        let id = agent.id().clone();
        if self.agents.contains_key(&id) {
            return Err(ModelError::DuplicateAgent(id));
        }
        self.tags.name_of(agent.tag())?;

        match (&mut self.space, placement) {
            (Space::Void, Placement::Default) => {}
            (Space::Void, _) => return Err(ModelError::NotSpatial),
            (Space::Discrete(space), Placement::Default) => {
                space.place_default(id.clone());
            }
            (Space::Discrete(space), Placement::Cell(cell)) => {
                space.place(id.clone(), cell)?;
            }
            (Space::Discrete(_), Placement::Point(_)) => {
                return Err(SpaceError::WrongTopology { expected: "continuous" }.into());
            }
            (Space::Continuous(space), Placement::Default) => {
                space.place(id.clone(), DVec3::ZERO)?;
            }
            (Space::Continuous(space), Placement::Point(point)) => {
                space.place(id.clone(), point)?;
            }
            (Space::Continuous(_), Placement::Cell(_)) => {
                return Err(SpaceError::WrongTopology { expected: "discrete" }.into());
            }
        }

        let holder = Holder::Agent(id.clone());
        for slot in agent.components().slots() {
            for _ in 0..slot.instances {
                self.pools.register(slot.type_id, holder.clone(), slot.multi)?;
            }
        }
        self.tags.assign(&id, agent.tag());
        debug!(agent = %id, components = agent.len(), "agent added");
        self.agents.insert(id, agent);
        Ok(())
    }

    /// Remove an agent and every index entry that refers to it.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] for unknown ids.
    pub fn remove_agent(&mut self, id: &str) -> Result<Agent, ModelError> {
        let agent = self
            .agents
            .shift_remove(id)
            .ok_or_else(|| agent_not_found(id))?;
        let holder = Holder::Agent(agent.id().clone());
        for slot in agent.components().slots() {
            self.pools.deregister_all(slot.type_id, &holder);
        }
        self.tags.unassign(agent.id());
        match &mut self.space {
            Space::Void => {}
            Space::Discrete(space) => {
                space.remove(agent.id());
            }
            Space::Continuous(space) => {
                space.remove(agent.id());
            }
        }
        debug!(agent = %agent.id(), "agent removed");
        Ok(agent)
    }

    /// Returns a registered agent.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] for unknown ids.
    pub fn get_agent(&self, id: &str) -> Result<&Agent, ModelError> {
        self.agents.get(id).ok_or_else(|| agent_not_found(id))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Every agent, in registration order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Ids of the agents matching `filter`, in registration order.
    #[must_use]
    pub fn get_agents(&self, filter: &AgentFilter) -> Vec<AgentId> {
        let accept = |agent: &Agent| filter.matches(agent, self.shared_components(agent));
        match filter.tag {
            Some(tag) => {
                let mut indices: Vec<usize> = self
                    .tags
                    .members(tag)
                    .iter()
                    .filter_map(|id| self.agents.get_index_of(id))
                    .collect();
                indices.sort_unstable();
                indices
                    .into_iter()
                    .filter_map(|idx| self.agents.get_index(idx))
                    .filter(|(_, agent)| accept(agent))
                    .map(|(id, _)| id.clone())
                    .collect()
            }
            None => self
                .agents
                .values()
                .filter(|agent| accept(agent))
                .map(|agent| agent.id().clone())
                .collect(),
        }
    }

    /// One agent matching `filter`, drawn uniformly.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyPopulation`] if nothing matches.
    pub fn get_random_agent<R: Rng + ?Sized>(
        &self,
        filter: &AgentFilter,
        rng: &mut R,
    ) -> Result<AgentId, ModelError> {
        self.get_agents(filter)
            .choose(rng)
            .cloned()
            .ok_or(ModelError::EmptyPopulation)
    }

    /// Ids of the agents matching `filter`, in random order.
    #[must_use]
    pub fn shuffle<R: Rng + ?Sized>(&self, filter: &AgentFilter, rng: &mut R) -> Vec<AgentId> {
        let mut ids = self.get_agents(filter);
        ids.shuffle(rng);
        ids
    }

    // ---------------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------------

    /// Register a tag name.
    ///
    /// # Errors
    ///
    /// [`ComponentError::DuplicateTag`] if the name is taken.
    pub fn add_tag(&mut self, name: impl Into<String>) -> Result<Tag, ModelError> {
        Ok(self.tags.add_tag(name)?)
    }

    /// Change an agent's tag and move it to the matching group.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] for unknown ids and
    /// [`ComponentError::TagNotFound`] for unregistered tags. The agent keeps
    /// its old tag on error.
    pub fn set_tag(&mut self, id: &str, tag: Tag) -> Result<(), ModelError> {
        let agent = self.agents.get_mut(id).ok_or_else(|| agent_not_found(id))?;
        self.tags.name_of(tag)?;
        agent.set_tag(tag);
        self.tags.assign(agent.id(), tag);
        Ok(())
    }

    #[must_use]
    pub fn tags(&self) -> &TagLibrary {
        &self.tags
    }

    // ---------------------------------------------------------------------
    // Agent components
    // ---------------------------------------------------------------------

    /// Attach a component to an agent.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or [`ComponentError::DuplicateComponent`].
    pub fn add_component<T: Component>(&mut self, id: &str, component: T) -> Result<(), ModelError> {
        let agent = self.agents.get_mut(id).ok_or_else(|| agent_not_found(id))?;
        agent.add_component(component)?;
        self.pools.register(
            T::component_type_id(),
            Holder::Agent(agent.id().clone()),
            T::MULTI_INSTANCE,
        )?;
        Ok(())
    }

    /// Detach every instance of `T` from an agent, returned in attach order.
    ///
    /// Class components are not affected.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or [`ComponentError::ComponentNotFound`].
    pub fn remove_component<T: Component>(&mut self, id: &str) -> Result<Vec<T>, ModelError> {
        let agent = self.agents.get_mut(id).ok_or_else(|| agent_not_found(id))?;
        let mut removed = vec![agent.remove_component::<T>()?];
        while agent.has_component::<T>() {
            removed.push(agent.remove_component::<T>()?);
        }
        removed.reverse();
        self.pools
            .deregister_all(T::component_type_id(), &Holder::Agent(agent.id().clone()));
        Ok(removed)
    }

    /// Returns an agent's `T`, falling back to its class component.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or [`ComponentError::ComponentNotFound`].
    pub fn get_component<T: Component>(&self, id: &str) -> Result<&T, ModelError> {
        let agent = self.get_agent(id)?;
        agent
            .get_component::<T>()
            .or_else(|| self.shared_components(agent)?.get::<T>())
            .ok_or_else(|| component_not_found::<T>(id))
    }

    /// Returns an agent's `T` mutably, falling back to its class component.
    ///
    /// Mutating a class component changes it for every agent of the class.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or [`ComponentError::ComponentNotFound`].
    pub fn get_component_mut<T: Component>(&mut self, id: &str) -> Result<&mut T, ModelError> {
        let agent = self.agents.get_mut(id).ok_or_else(|| agent_not_found(id))?;
        if agent.has_component::<T>() {
            return agent
                .get_component_mut::<T>()
                .ok_or_else(|| component_not_found::<T>(id));
        }
        let class = agent.class().cloned();
        class
            .and_then(|class| self.class_components.get_mut(&class))
            .and_then(|map| map.get_mut::<T>())
            .ok_or_else(|| component_not_found::<T>(id))
    }

    /// Returns every `T` visible to an agent: its own instances, then its
    /// class's.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] for unknown ids.
    pub fn get_all_components<T: Component>(&self, id: &str) -> Result<Vec<&T>, ModelError> {
        let agent = self.get_agent(id)?;
        let mut found = agent.get_all_components::<T>();
        if let Some(shared) = self.shared_components(agent) {
            found.extend(shared.get_all::<T>());
        }
        Ok(found)
    }

    /// Returns `true` if the agent or its class holds a `T`.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] for unknown ids.
    pub fn has_component<T: Component>(&self, id: &str) -> Result<bool, ModelError> {
        let agent = self.get_agent(id)?;
        let type_id = T::component_type_id();
        Ok(agent.has_type(type_id)
            || self
                .shared_components(agent)
                .is_some_and(|shared| shared.contains_type(type_id)))
    }

    fn shared_components(&self, agent: &Agent) -> Option<&ComponentMap> {
        agent
            .class()
            .and_then(|class| self.class_components.get(class))
    }

    // ---------------------------------------------------------------------
    // Class components
    // ---------------------------------------------------------------------

    /// Attach a component shared by every agent of `class`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::DuplicateComponent`] if the class already holds a
    /// single-instance `T`.
    pub fn add_class_component<T: Component>(
        &mut self,
        class: impl Into<AgentClass>,
        component: T,
    ) -> Result<(), ModelError> {
        let class = class.into();
        let map = self.class_components.entry(class.clone()).or_default();
        if map.insert(component).is_err() {
            return Err(ComponentError::DuplicateComponent {
                holder: Holder::Class(class),
                component: T::type_name(),
            }
            .into());
        }
        self.pools
            .register(T::component_type_id(), Holder::Class(class), T::MULTI_INSTANCE)?;
        Ok(())
    }

    /// Detach the most recently attached class component of type `T`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the class holds no `T`.
    pub fn remove_class_component<T: Component>(&mut self, class: &str) -> Result<T, ModelError> {
        let holder = Holder::Class(AgentClass::from(class));
        let missing = || ComponentError::ComponentNotFound {
            holder: holder.clone(),
            component: T::type_name(),
        };
        let map = self.class_components.get_mut(class).ok_or_else(missing)?;
        let component = map.remove::<T>().ok_or_else(missing)?;
        if map.is_empty() {
            self.class_components.shift_remove(class);
        }
        self.pools.deregister(T::component_type_id(), &holder)?;
        Ok(component)
    }

    /// Returns the class component `T` of `class`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the class holds no `T`.
    pub fn class_component<T: Component>(&self, class: &str) -> Result<&T, ModelError> {
        self.class_components
            .get(class)
            .and_then(ComponentMap::get::<T>)
            .ok_or_else(|| class_component_not_found::<T>(class))
    }

    /// Returns the class component `T` of `class` mutably.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the class holds no `T`.
    pub fn class_component_mut<T: Component>(&mut self, class: &str) -> Result<&mut T, ModelError> {
        self.class_components
            .get_mut(class)
            .and_then(ComponentMap::get_mut::<T>)
            .ok_or_else(|| class_component_not_found::<T>(class))
    }

    // ---------------------------------------------------------------------
    // Environment components
    // ---------------------------------------------------------------------

    /// Attach a component to the environment itself.
    ///
    /// # Errors
    ///
    /// [`ComponentError::DuplicateComponent`] for a second single-instance `T`.
    pub fn add_environment_component<T: Component>(&mut self, component: T) -> Result<(), ModelError> {
        if self.components.insert(component).is_err() {
            return Err(ComponentError::DuplicateComponent {
                holder: Holder::Environment,
                component: T::type_name(),
            }
            .into());
        }
        self.pools
            .register(T::component_type_id(), Holder::Environment, T::MULTI_INSTANCE)?;
        Ok(())
    }

    /// Detach the most recently attached environment component of type `T`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the environment holds no `T`.
    pub fn remove_environment_component<T: Component>(&mut self) -> Result<T, ModelError> {
        let component = self
            .components
            .remove::<T>()
            .ok_or_else(environment_component_not_found::<T>)?;
        self.pools
            .deregister(T::component_type_id(), &Holder::Environment)?;
        Ok(component)
    }

    /// Returns the environment's `T`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the environment holds no `T`.
    pub fn environment_component<T: Component>(&self) -> Result<&T, ModelError> {
        self.components
            .get::<T>()
            .ok_or_else(environment_component_not_found::<T>)
    }

    /// Returns the environment's `T` mutably.
    ///
    /// # Errors
    ///
    /// [`ComponentError::ComponentNotFound`] if the environment holds no `T`.
    pub fn environment_component_mut<T: Component>(&mut self) -> Result<&mut T, ModelError> {
        self.components
            .get_mut::<T>()
            .ok_or_else(environment_component_not_found::<T>)
    }

    // ---------------------------------------------------------------------
    // Pools
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn pools(&self) -> &ComponentPools {
        &self.pools
    }

    /// Snapshot of every holder of a live `T`, in attach order.
    #[must_use]
    pub fn get_components<T: Component>(&self) -> Vec<Holder> {
        self.pools.get(T::component_type_id())
    }

    // ---------------------------------------------------------------------
    // Space
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Returns the discrete world.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotSpatial`] or [`SpaceError::WrongTopology`].
    pub fn discrete_space(&self) -> Result<&DiscreteSpace<AgentId>, ModelError> {
        match &self.space {
            Space::Discrete(space) => Ok(space),
            Space::Continuous(_) => Err(SpaceError::WrongTopology { expected: "discrete" }.into()),
            Space::Void => Err(ModelError::NotSpatial),
        }
    }

    fn discrete_space_mut(&mut self) -> Result<&mut DiscreteSpace<AgentId>, ModelError> {
        match &mut self.space {
            Space::Discrete(space) => Ok(space),
            Space::Continuous(_) => Err(SpaceError::WrongTopology { expected: "discrete" }.into()),
            Space::Void => Err(ModelError::NotSpatial),
        }
    }

    /// Returns the continuous world.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotSpatial`] or [`SpaceError::WrongTopology`].
    pub fn continuous_space(&self) -> Result<&ContinuousSpace<AgentId>, ModelError> {
        match &self.space {
            Space::Continuous(space) => Ok(space),
            Space::Discrete(_) => Err(SpaceError::WrongTopology { expected: "continuous" }.into()),
            Space::Void => Err(ModelError::NotSpatial),
        }
    }

    fn continuous_space_mut(&mut self) -> Result<&mut ContinuousSpace<AgentId>, ModelError> {
        match &mut self.space {
            Space::Continuous(space) => Ok(space),
            Space::Discrete(_) => Err(SpaceError::WrongTopology { expected: "continuous" }.into()),
            Space::Void => Err(ModelError::NotSpatial),
        }
    }

    /// Size of the discrete world.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotSpatial`] or [`SpaceError::WrongTopology`].
    pub fn dimensions(&self) -> Result<Dimensions, ModelError> {
        Ok(self.discrete_space()?.dimensions())
    }

    /// An agent's cell.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or a topology error.
    pub fn position(&self, id: &str) -> Result<Cell, ModelError> {
        let key = self.get_agent(id)?.id();
        self.discrete_space()?
            .position(key)
            .ok_or_else(|| SpaceError::NotPlaced(id.to_owned()).into())
    }

    /// An agent's point.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or a topology error.
    pub fn point(&self, id: &str) -> Result<DVec3, ModelError> {
        let key = self.get_agent(id)?.id();
        self.continuous_space()?
            .position(key)
            .ok_or_else(|| SpaceError::NotPlaced(id.to_owned()).into())
    }

    /// Move an agent to a cell.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`], [`SpaceError::OutOfBounds`] (the agent
    /// stays put), or a topology error.
    pub fn move_to(&mut self, id: &str, cell: impl Into<Cell>) -> Result<Cell, ModelError> {
        let key = self.get_agent(id)?.id().clone();
        Ok(self.discrete_space_mut()?.move_to(&key, cell.into())?)
    }

    /// Move an agent by a cell offset, clamped at the edges or wrapped in a
    /// toroidal world.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or a topology error.
    pub fn move_by(&mut self, id: &str, delta: impl Into<Cell>) -> Result<Cell, ModelError> {
        let key = self.get_agent(id)?.id().clone();
        Ok(self.discrete_space_mut()?.move_by(&key, delta.into())?)
    }

    /// Move an agent to a point.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`], [`SpaceError::PointOutOfBounds`], or a
    /// topology error.
    pub fn move_to_point(&mut self, id: &str, point: DVec3) -> Result<DVec3, ModelError> {
        let key = self.get_agent(id)?.id().clone();
        Ok(self.continuous_space_mut()?.move_to(&key, point)?)
    }

    /// Move an agent by an offset, clamped or wrapped.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or a topology error.
    pub fn move_by_point(&mut self, id: &str, delta: DVec3) -> Result<DVec3, ModelError> {
        let key = self.get_agent(id)?.id().clone();
        Ok(self.continuous_space_mut()?.move_by(&key, delta)?)
    }

    /// Agents within Chebyshev distance `leeway` of a cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] or a topology error.
    pub fn get_agents_at(&self, cell: impl Into<Cell>, leeway: u32) -> Result<Vec<AgentId>, ModelError> {
        Ok(self.discrete_space()?.agents_at(cell.into(), leeway)?)
    }

    /// Agents within Euclidean distance `radius` of a point.
    ///
    /// # Errors
    ///
    /// [`SpaceError::PointOutOfBounds`] or a topology error.
    pub fn get_agents_near(&self, point: DVec3, radius: f64) -> Result<Vec<AgentId>, ModelError> {
        Ok(self.continuous_space()?.agents_near(point, radius)?)
    }

    /// Agents in the neighbourhood of `id`, excluding `id` itself.
    ///
    /// Works on both discrete and continuous worlds.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or [`ModelError::NotSpatial`].
    pub fn get_neighbours(&self, id: &str, radius: u32, mode: Neighbourhood) -> Result<Vec<AgentId>, ModelError> {
        let key = self.get_agent(id)?.id();
        match &self.space {
            Space::Discrete(space) => Ok(space.neighbours(key, radius, mode)?),
            Space::Continuous(space) => Ok(space.neighbours(key, f64::from(radius), mode)?),
            Space::Void => Err(ModelError::NotSpatial),
        }
    }

    /// Agents of a continuous world within a fractional `radius` of `id`.
    ///
    /// # Errors
    ///
    /// [`ModelError::AgentNotFound`] or a topology error.
    pub fn get_neighbours_within(
        &self,
        id: &str,
        radius: f64,
        mode: Neighbourhood,
    ) -> Result<Vec<AgentId>, ModelError> {
        let key = self.get_agent(id)?.id();
        Ok(self.continuous_space()?.neighbours(key, radius, mode)?)
    }

    /// Cells around `cell` in row-major order.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] or a topology error.
    pub fn neighbour_cells(
        &self,
        cell: impl Into<Cell>,
        radius: u32,
        mode: Neighbourhood,
        include_centre: bool,
    ) -> Result<Vec<Cell>, ModelError> {
        Ok(self
            .discrete_space()?
            .neighbour_cells(cell.into(), radius, mode, include_centre)?)
    }

    /// Row-major id of a cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] or a topology error.
    pub fn cell_id(&self, cell: impl Into<Cell>) -> Result<usize, ModelError> {
        Ok(self.dimensions()?.cell_id(cell.into())?)
    }

    /// Cell for a row-major id.
    ///
    /// # Errors
    ///
    /// [`SpaceError::CellIdOutOfRange`] or a topology error.
    pub fn cell_at(&self, id: usize) -> Result<Cell, ModelError> {
        Ok(self.dimensions()?.cell_at(id)?)
    }

    // ---------------------------------------------------------------------
    // Cell layers
    // ---------------------------------------------------------------------

    /// Add a per-cell layer from one value per cell, in row-major order.
    ///
    /// # Errors
    ///
    /// [`SpaceError::DuplicateLayer`], [`SpaceError::LayerSizeMismatch`] or a
    /// topology error.
    pub fn add_cell_layer(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<(), ModelError> {
        Ok(self.discrete_space_mut()?.layers_mut().add_layer(name, values)?)
    }

    /// Add a per-cell layer computed from each cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::DuplicateLayer`] or a topology error.
    pub fn add_cell_layer_with<F>(&mut self, name: impl Into<String>, generator: F) -> Result<(), ModelError>
    where
        F: FnMut(Cell) -> Value,
    {
        Ok(self
            .discrete_space_mut()?
            .layers_mut()
            .add_layer_with(name, generator)?)
    }

    /// Remove a layer and return its values.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`] or a topology error.
    pub fn remove_cell_layer(&mut self, name: &str) -> Result<Vec<Value>, ModelError> {
        Ok(self.discrete_space_mut()?.layers_mut().remove_layer(name)?)
    }

    /// One layer's value at a cell.
    ///
    /// # Errors
    ///
    /// [`SpaceError::LayerNotFound`], [`SpaceError::OutOfBounds`] or a
    /// topology error.
    pub fn cell_value(&self, name: &str, cell: impl Into<Cell>) -> Result<&Value, ModelError> {
        Ok(self.discrete_space()?.layers().value(name, cell.into())?)
    }

    /// One layer's value at a cell, mutably.
    ///
    /// # Errors
    ///
    /// As [`cell_value`](Self::cell_value).
    pub fn cell_value_mut(&mut self, name: &str, cell: impl Into<Cell>) -> Result<&mut Value, ModelError> {
        Ok(self
            .discrete_space_mut()?
            .layers_mut()
            .value_mut(name, cell.into())?)
    }

    /// Every layer's value at a cell, keyed by layer name.
    ///
    /// # Errors
    ///
    /// [`SpaceError::OutOfBounds`] or a topology error.
    pub fn cell(&self, cell: impl Into<Cell>) -> Result<Map<String, Value>, ModelError> {
        Ok(self.discrete_space()?.layers().cell(cell.into())?)
    }
}

fn agent_not_found(id: &str) -> ModelError {
    ModelError::AgentNotFound(AgentId::from(id))
}

fn component_not_found<T: Component>(id: &str) -> ModelError {
    ComponentError::ComponentNotFound {
        holder: Holder::Agent(AgentId::from(id)),
        component: T::type_name(),
    }
    .into()
}

fn class_component_not_found<T: Component>(class: &str) -> ModelError {
    ComponentError::ComponentNotFound {
        holder: Holder::Class(AgentClass::from(class)),
        component: T::type_name(),
    }
    .into()
}

fn environment_component_not_found<T: Component>() -> ModelError {
    ComponentError::ComponentNotFound {
        holder: Holder::Environment,
        component: T::type_name(),
    }
    .into()
}
