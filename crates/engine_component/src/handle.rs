//! Generation-tagged component handles.

use serde::{Deserialize, Serialize};

use crate::registry::ComponentTypeId;

/// An indirect reference into a component manager's storage.
///
/// A handle names a storage slot by index and remembers the slot's
/// generation at the time the component was created. Removing the component
/// bumps the slot's generation, so every handle to the old occupant stops
/// resolving, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentHandle {
    type_id: ComponentTypeId,
    index: u32,
    generation: u32,
}

impl ComponentHandle {
    /// A handle that never resolves.
    pub const INVALID: Self = Self {
        type_id: ComponentTypeId::INVALID,
        index: u32::MAX,
        generation: 0,
    };

    /// Build a handle from its parts.
    #[must_use]
    pub const fn new(type_id: ComponentTypeId, index: u32, generation: u32) -> Self {
        Self {
            type_id,
            index,
            generation,
        }
    }

    /// The component type this handle refers to.
    #[must_use]
    pub const fn type_id(self) -> ComponentTypeId {
        self.type_id
    }

    /// The storage slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The slot generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns `false` for [`ComponentHandle::INVALID`]. A handle that
    /// passes this check may still be stale.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.type_id.is_valid()
    }
}

impl Default for ComponentHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Component({}, {}v{})",
            self.type_id, self.index, self.generation
        )
    }
}
