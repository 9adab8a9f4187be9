//! Phased update scheduling.
//!
//! Managers register at most one update function per [`UpdatePhase`]. Each
//! tick the world walks the phases in [`UpdatePhase::ALL`] order and, within
//! a phase, calls the functions in registration order. A phase completes
//! before the next starts, so phase boundaries are join points.

use std::any::Any;
use std::fmt;

use tracing::debug;

use crate::context::UpdateContext;
use crate::error::WorldError;

/// A named ordering bucket within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdatePhase {
    /// Runs before any parallel work is dispatched; exclusive access to
    /// manager state.
    PreAsync,
    /// Parallelisable work. Functions in this phase currently run one after
    /// another on the simulation thread.
    Async,
    /// Runs after the async phase has joined.
    PostAsync,
    /// Runs after transforms have been finalised for the tick.
    PostTransform,
}

impl UpdatePhase {
    /// Every phase in execution order.
    pub const ALL: [Self; 4] = [
        Self::PreAsync,
        Self::Async,
        Self::PostAsync,
        Self::PostTransform,
    ];
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreAsync => "pre-async",
            Self::Async => "async",
            Self::PostAsync => "post-async",
            Self::PostTransform => "post-transform",
        };
        f.write_str(name)
    }
}

/// Signature of a manager's update function.
pub type UpdateFn<M> = fn(&mut M, &mut UpdateContext<'_>);

pub(crate) type ErasedUpdateFn = Box<dyn FnMut(&mut dyn Any, &mut UpdateContext<'_>) + Send>;

/// Describes an update function a manager wants to run every tick.
pub struct UpdateFunctionDesc<M> {
    /// Name used in logs.
    pub name: &'static str,
    /// The phase the function runs in.
    pub phase: UpdatePhase,
    /// The function itself.
    pub function: UpdateFn<M>,
}

impl<M> fmt::Debug for UpdateFunctionDesc<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateFunctionDesc")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

pub(crate) struct RegisteredUpdate {
    pub(crate) module_index: usize,
    pub(crate) module_name: &'static str,
    pub(crate) name: &'static str,
    pub(crate) phase: UpdatePhase,
    pub(crate) function: ErasedUpdateFn,
}

/// Update functions of every module in a world, in registration order.
#[derive(Default)]
pub struct UpdateScheduler {
    updates: Vec<RegisteredUpdate>,
}

impl UpdateScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register<M: Any>(
        &mut self,
        module_index: usize,
        module_name: &'static str,
        desc: UpdateFunctionDesc<M>,
    ) -> Result<(), WorldError> {
        let duplicate = self
            .updates
            .iter()
            .any(|u| u.module_index == module_index && u.phase == desc.phase);
        if duplicate {
            return Err(WorldError::DuplicateUpdateFunction {
                module: module_name,
                phase: desc.phase,
            });
        }

        let function = desc.function;
        self.updates.push(RegisteredUpdate {
            module_index,
            module_name,
            name: desc.name,
            phase: desc.phase,
            function: Box::new(move |module, ctx| {
                if let Some(module) = module.downcast_mut::<M>() {
                    function(module, ctx);
                }
            }),
        });

        debug!(
            module = module_name,
            update = desc.name,
            phase = %desc.phase,
            "update function registered"
        );
        Ok(())
    }

    /// Indices of the functions registered for `phase`, in run order.
    pub(crate) fn phase_indices(&self, phase: UpdatePhase) -> Vec<usize> {
        self.updates
            .iter()
            .enumerate()
            .filter(|(_, u)| u.phase == phase)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn update_mut(&mut self, index: usize) -> Option<&mut RegisteredUpdate> {
        self.updates.get_mut(index)
    }

    /// `(module, function)` names registered for `phase`, in run order.
    #[must_use]
    pub fn phase_functions(&self, phase: UpdatePhase) -> Vec<(&'static str, &'static str)> {
        self.updates
            .iter()
            .filter(|u| u.phase == phase)
            .map(|u| (u.module_name, u.name))
            .collect()
    }

    /// Drop every function registered by the module at `module_index`.
    pub(crate) fn remove_module(&mut self, module_index: usize) {
        self.updates.retain(|u| u.module_index != module_index);
    }

    /// Total number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.updates
                    .iter()
                    .map(|u| (u.module_name, u.name, u.phase)),
            )
            .finish()
    }
}
