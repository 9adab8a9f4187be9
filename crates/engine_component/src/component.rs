//! Core [`Component`] trait, per-instance base state, and lifecycle rules.
//!
//! A component is a unit of behavior attached to exactly one owner object.
//! Its manager allocates it, drives it through the lifecycle
//!
//! ```text
//! Unattached -> Attached -> Initialized -> Deinitialized -> Detached
//! ```
//!
//! and calls the matching hook on each step. Activation is a flag that can
//! be toggled any number of times while the component is alive.

use bitflags::bitflags;

use crate::error::ComponentError;
use crate::handle::ComponentHandle;
use crate::object::ObjectId;
use crate::registry::ComponentTypeId;

bitflags! {
    /// Per-instance state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentFlags: u8 {
        /// The component takes part in updates and extraction.
        const ACTIVE = 1 << 0;
        /// `initialize` has run and `deinitialize` has not.
        const INITIALIZED = 1 << 1;
    }
}

/// Position of a component in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed but not yet bound to an owner.
    Unattached,
    /// Bound to an owner, waiting for world-level initialisation.
    Attached,
    /// Fully initialised and live.
    Initialized,
    /// `deinitialize` has run.
    Deinitialized,
    /// Unbound from its owner. Terminal.
    Detached,
}

impl LifecycleState {
    /// Returns `true` if moving from `self` to `to` is allowed.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        use LifecycleState::*;
        matches!(
            (self, to),
            (Unattached, Attached)
                | (Attached, Initialized)
                | (Initialized, Deinitialized)
                | (Deinitialized, Detached)
                | (Attached, Detached)
        )
    }

    /// Move to `to`, or report the illegal transition.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IllegalTransition`] if the move is not
    /// allowed. The state is left unchanged in that case.
    pub fn advance(&mut self, to: Self) -> Result<(), ComponentError> {
        if !self.can_transition_to(to) {
            return Err(ComponentError::IllegalTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

/// What a lifecycle hook can see and request.
#[derive(Debug)]
pub struct ComponentContext {
    handle: ComponentHandle,
    owner: ObjectId,
    update_requested: bool,
}

impl ComponentContext {
    /// Create a context for one hook invocation.
    #[must_use]
    pub fn new(handle: ComponentHandle, owner: ObjectId) -> Self {
        Self {
            handle,
            owner,
            update_requested: false,
        }
    }

    /// The component's own handle.
    #[must_use]
    pub fn handle(&self) -> ComponentHandle {
        self.handle
    }

    /// The owning object.
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Ask the manager to enqueue this component for deferred work.
    pub fn request_update(&mut self) {
        self.update_requested = true;
    }

    /// Returns `true` if the hook asked for deferred work.
    #[must_use]
    pub fn update_requested(&self) -> bool {
        self.update_requested
    }
}

/// The component trait.
///
/// Implementors supply behavior; bookkeeping (flags, owner, lifecycle state)
/// lives in the [`ComponentBase`] the manager keeps next to each instance, so
/// overriding a hook never skips base behavior.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, ComponentContext};
///
/// struct Light {
///     intensity: f32,
/// }
///
/// impl Component for Light {
///     fn type_name() -> &'static str { "Light" }
///
///     fn initialize(&mut self, ctx: &mut ComponentContext) {
///         ctx.request_update();
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Version of the persisted record format.
    fn type_version() -> u32 {
        1
    }

    /// Called once after the world initialises the component.
    fn initialize(&mut self, _ctx: &mut ComponentContext) {}

    /// Called once before the component is detached, if it was initialised.
    fn deinitialize(&mut self, _ctx: &mut ComponentContext) {}

    /// Called right after the component is bound to its owner.
    fn on_after_attached_to_object(&mut self, _ctx: &mut ComponentContext) {}

    /// Called right before the component is unbound from its owner.
    fn on_before_detached_from_object(&mut self, _ctx: &mut ComponentContext) {}
}

/// State the runtime keeps for every component instance.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    handle: ComponentHandle,
    owner: ObjectId,
    flags: ComponentFlags,
    state: LifecycleState,
}

impl ComponentBase {
    /// Base state for a freshly created, active, unattached component.
    #[must_use]
    pub fn new(handle: ComponentHandle, owner: ObjectId) -> Self {
        Self {
            handle,
            owner,
            flags: ComponentFlags::ACTIVE,
            state: LifecycleState::Unattached,
        }
    }

    /// The instance's handle.
    #[must_use]
    pub fn handle(&self) -> ComponentHandle {
        self.handle
    }

    /// The component type.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.handle.type_id()
    }

    /// The owning object.
    #[must_use]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Current flag bits.
    #[must_use]
    pub fn flags(&self) -> ComponentFlags {
        self.flags
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Set or clear the active flag.
    pub fn set_active(&mut self, active: bool) {
        self.flags.set(ComponentFlags::ACTIVE, active);
    }

    /// Set the active flag.
    pub fn activate(&mut self) {
        self.flags.insert(ComponentFlags::ACTIVE);
    }

    /// Clear the active flag.
    pub fn deactivate(&mut self) {
        self.flags.remove(ComponentFlags::ACTIVE);
    }

    /// Returns `true` if the active flag is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flags.contains(ComponentFlags::ACTIVE)
    }

    /// Returns `true` between `initialize` and `deinitialize`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.flags.contains(ComponentFlags::INITIALIZED)
    }

    /// Advance the lifecycle and keep the `INITIALIZED` flag in sync.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::IllegalTransition`] on an out-of-order step.
    pub fn advance(&mut self, to: LifecycleState) -> Result<(), ComponentError> {
        self.state.advance(to)?;
        self.flags
            .set(ComponentFlags::INITIALIZED, to == LifecycleState::Initialized);
        Ok(())
    }
}
