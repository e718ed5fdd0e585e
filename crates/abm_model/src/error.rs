//! Error type for the model layer.

use abm_component::{AgentId, ComponentError};
use abm_space::SpaceError;
use thiserror::Error;

use crate::system::SystemId;

/// Errors returned by the environment, the scheduler and the model root.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("agent `{0}` already exists")]
    DuplicateAgent(AgentId),

    #[error("agent `{0}` not found")]
    AgentNotFound(AgentId),

    #[error("system `{0}` already exists")]
    DuplicateSystem(SystemId),

    #[error("system `{0}` not found")]
    SystemNotFound(SystemId),

    /// A typed system lookup named a system of another type.
    #[error("system `{id}` is not a `{expected}`")]
    SystemTypeMismatch { id: SystemId, expected: &'static str },

    #[error("system `{0}` has a frequency of 0")]
    InvalidFrequency(SystemId),

    /// A random draw found no agent matching the filter.
    #[error("no agent matches the filter")]
    EmptyPopulation,

    /// The system type never overrode [`System::execute`](crate::System::execute).
    #[error("system type `{0}` does not define a behavior")]
    UnimplementedBehavior(&'static str),

    /// A spatial operation was used on an environment without a world.
    #[error("the environment has no spatial world")]
    NotSpatial,

    #[error("parameter `{0}` already exists")]
    DuplicateParameter(String),

    #[error("parameter `{0}` not found")]
    ParameterNotFound(String),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Space(#[from] SpaceError),

    /// A failure raised by user system code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
