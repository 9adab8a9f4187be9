//! World-level error types.

use engine_component::{CodecError, ComponentError, ComponentHandle, ObjectId};

use crate::scheduler::UpdatePhase;

/// Errors raised while setting up or mutating a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A second manager was registered for a component type. Fatal.
    #[error("a manager for '{0}' is already registered in this world")]
    DuplicateManager(&'static str),

    /// A manager registered two update functions for one phase. Fatal.
    #[error("'{module}' already has an update function in phase {phase:?}")]
    DuplicateUpdateFunction {
        /// Manager name.
        module: &'static str,
        /// The phase registered twice.
        phase: UpdatePhase,
    },

    /// The manager exists but cannot be reached right now.
    #[error("manager '{0}' is not available")]
    ManagerUnavailable(&'static str),

    /// No object with this id exists.
    #[error("{0} does not exist")]
    ObjectNotFound(ObjectId),

    /// No manager handles the handle's component type.
    #[error("no manager owns {0}")]
    NoManager(ComponentHandle),

    /// Component storage or lifecycle error.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Component record error.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
