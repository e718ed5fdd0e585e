//! # abm_component
//!
//! The "E" and "C" of the agent-based modelling runtime. Defines what a
//! component is, how components are attached to agents, and the secondary
//! indices kept alongside the agent registry.
//!
//! This crate provides:
//!
//! - [`Component`]: the contract all agent data must satisfy.
//! - [`ComponentTypeId`]: deterministic, name-derived component type ids.
//! - [`Agent`] / [`AgentId`]: caller-identified entities owning a [`ComponentMap`].
//! - [`ComponentPools`]: the type-keyed index of live component holders.
//! - [`TagLibrary`]: tag names and tag → agent groups.
//! - [`AgentFilter`]: declarative agent selection by components, tag and class.

pub mod agent;
pub mod component;
pub mod error;
pub mod pool;
pub mod query;
pub mod tag;

pub use agent::{Agent, AgentClass, AgentId};
pub use component::{Component, ComponentMap, ComponentTypeId, SlotInfo};
pub use error::ComponentError;
pub use pool::{ComponentPools, Holder};
pub use query::AgentFilter;
pub use tag::{Tag, TagLibrary};
