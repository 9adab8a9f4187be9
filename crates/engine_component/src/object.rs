//! Owner object identity and the capability set components may rely on.
//!
//! The runtime never assumes a concrete object graph. A component sees its
//! owner only through [`OwnerObject`]: a global transform, global bounds,
//! and a typed sibling-component query.

use engine_math::{BoundingBoxSphere, Transform3D};
use serde::{Deserialize, Serialize};

use crate::handle::ComponentHandle;
use crate::registry::ComponentTypeId;

/// A unique game object identifier.
///
/// Objects own their components. A component stores its owner's id, never a
/// reference, and cannot outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The null / invalid object sentinel.
    pub const INVALID: ObjectId = ObjectId(0);

    /// Create an object id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Hands out object ids. Ids start at 1 and are never recycled.
#[derive(Debug)]
pub struct ObjectIdAllocator {
    next_id: u64,
}

impl ObjectIdAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh object id.
    pub fn allocate(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        ObjectId(id)
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// What a component may ask of the object that owns it.
pub trait OwnerObject {
    /// The object's id.
    fn id(&self) -> ObjectId;

    /// The object's transform in world space.
    fn global_transform(&self) -> Transform3D;

    /// The object's bounds in world space, if any component provides some.
    fn global_bounds(&self) -> Option<BoundingBoxSphere>;

    /// The first attached component of the given type, if any.
    fn try_get_component_of_type(&self, type_id: ComponentTypeId) -> Option<ComponentHandle>;
}
