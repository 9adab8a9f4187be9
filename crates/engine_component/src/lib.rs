//! # engine_component
//!
//! The "C" of the runtime: what a component is, how its kind is identified,
//! how instances are stored and addressed, and how their fields persist.
//!
//! This crate provides:
//!
//! - [`TypeRegistry`]: assigns stable [`ComponentTypeId`]s.
//! - [`Component`] trait: lifecycle hooks every component may override.
//! - [`ComponentBase`]: flags, owner and lifecycle state per instance.
//! - [`ComponentHandle`] / [`ComponentStorage`]: generational arena.
//! - [`OwnerObject`]: what a component may ask of its owner.
//! - [`ComponentRecord`]: versioned MessagePack persistence.

pub mod codec;
pub mod component;
pub mod error;
pub mod handle;
pub mod object;
pub mod registry;
pub mod storage;

pub use codec::{ComponentRecord, decode, encode};
pub use component::{Component, ComponentBase, ComponentContext, ComponentFlags, LifecycleState};
pub use error::{CodecError, ComponentError};
pub use handle::ComponentHandle;
pub use object::{ObjectId, ObjectIdAllocator, OwnerObject};
pub use registry::{ComponentTypeId, ComponentTypeInfo, TypeRegistry};
pub use storage::ComponentStorage;
