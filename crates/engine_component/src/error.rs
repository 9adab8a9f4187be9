//! Component-layer error types.

use crate::component::LifecycleState;
use crate::handle::ComponentHandle;
use crate::registry::ComponentTypeId;

/// Errors raised by component storage, lifecycle and type registration.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A lifecycle hook was requested out of order.
    #[error("illegal lifecycle transition from {from:?} to {to:?}")]
    IllegalTransition {
        /// State the component was in.
        from: LifecycleState,
        /// State that was requested.
        to: LifecycleState,
    },

    /// The handle no longer refers to a live component.
    #[error("stale component handle {0}")]
    StaleHandle(ComponentHandle),

    /// The handle belongs to a different component type.
    #[error("handle {handle} does not belong to component type {expected}")]
    WrongType {
        /// The offending handle.
        handle: ComponentHandle,
        /// The type the storage holds.
        expected: ComponentTypeId,
    },

    /// No more type ids can be handed out. Fatal configuration error.
    #[error("component type id space exhausted after {limit} types")]
    TypeIdSpaceExhausted {
        /// Highest id the registry may assign.
        limit: u16,
    },
}

/// Errors raised while encoding or decoding component records.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Failed to encode a value to MessagePack.
    #[error("failed to encode record: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a value from MessagePack.
    #[error("failed to decode record: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The record was written for another component type.
    #[error("record holds '{found}', expected '{expected}'")]
    TypeMismatch {
        /// Type name the reader expected.
        expected: String,
        /// Type name stored in the record.
        found: String,
    },

    /// The record was written by a newer version of the component type.
    #[error("record version {found} of '{type_name}' is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Component type name.
        type_name: String,
        /// Version stored in the record.
        found: u32,
        /// Version of the running type.
        supported: u32,
    },
}
