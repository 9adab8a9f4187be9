//! # engine_world
//!
//! Worlds, the per-type managers that own their components, and the phased
//! update schedule that drives them.
//!
//! This crate provides:
//!
//! - [`ComponentManager`]: storage, lifecycle driver and pending-update
//!   queue for one component type.
//! - [`ComponentManagerModule`]: how a manager plugs into a world.
//! - [`UpdateScheduler`] / [`UpdatePhase`]: per-phase update functions.
//! - [`UpdateContext`]: what an update function sees of the world.
//! - [`World`]: objects, managers and the tick.

pub mod config;
pub mod context;
pub mod error;
pub mod manager;
pub mod module;
pub mod object;
pub mod scheduler;
pub mod world;

pub use config::WorldConfig;
pub use context::UpdateContext;
pub use error::WorldError;
pub use manager::{ComponentManager, DrainStats, ManagerShared};
pub use module::{ComponentManagerModule, ModuleInit, ModuleView};
pub use object::{GameObject, ObjectTable};
pub use scheduler::{UpdateFn, UpdateFunctionDesc, UpdatePhase, UpdateScheduler};
pub use world::World;
