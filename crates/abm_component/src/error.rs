//! Error types for component storage, the pool index and the tag library.

use thiserror::Error;

use crate::component::ComponentTypeId;
use crate::pool::Holder;

/// Errors raised by component bookkeeping.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A single-instance component of this type is already attached.
    #[error("{holder} already has a component of type `{component}`")]
    DuplicateComponent {
        holder: Holder,
        component: &'static str,
    },

    /// The holder has no component of this type.
    #[error("{holder} has no component of type `{component}`")]
    ComponentNotFound {
        holder: Holder,
        component: &'static str,
    },

    /// The pool index already tracks this holder for a single-instance type.
    #[error("component {component} is already registered for {holder}")]
    AlreadyRegistered {
        component: ComponentTypeId,
        holder: Holder,
    },

    /// The pool index has no entry for this holder and type.
    #[error("component {component} is not registered for {holder}")]
    NotRegistered {
        component: ComponentTypeId,
        holder: Holder,
    },

    #[error("tag `{0}` is already defined")]
    DuplicateTag(String),

    #[error("tag `{0}` is not defined")]
    TagNotFound(String),
}
