//! Component type registration.
//!
//! Every component kind gets a small [`ComponentTypeId`] the first time it is
//! registered. Ids come from a monotonically increasing counter, are stable
//! for the lifetime of the [`TypeRegistry`] and are never reused.
//!
//! The registry is an explicit context object rather than static state. A
//! process typically creates one, wraps it in an `Arc` and hands it to every
//! world it creates, so all worlds agree on the ids.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::Component;
use crate::error::ComponentError;

/// A process-unique identifier for a component kind.
///
/// Id `0` is reserved for [`ComponentTypeId::INVALID`]; registered types
/// start at `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u16);

impl ComponentTypeId {
    /// The id never assigned to a registered type.
    pub const INVALID: Self = Self(0);

    /// Returns `true` if this id could have come from a registry.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Metadata recorded for each registered component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTypeInfo {
    /// The assigned id.
    pub id: ComponentTypeId,
    /// The human-readable name (e.g. `"VisColMeshComponent"`).
    pub name: &'static str,
    /// The persisted-format version of the type.
    pub version: u32,
}

#[derive(Debug)]
struct RegistryInner {
    next_id: u16,
    by_type: HashMap<TypeId, ComponentTypeId>,
    infos: Vec<ComponentTypeInfo>,
}

/// Assigns and caches [`ComponentTypeId`]s.
#[derive(Debug)]
pub struct TypeRegistry {
    limit: u16,
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    /// Create a registry that may hand out the full 16-bit id range.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_limit(u16::MAX)
    }

    /// Create a registry that refuses to assign ids above `limit`.
    #[must_use]
    pub fn with_id_limit(limit: u16) -> Self {
        Self {
            limit,
            inner: RwLock::new(RegistryInner {
                next_id: 1,
                by_type: HashMap::new(),
                infos: Vec::new(),
            }),
        }
    }

    /// Register `T`, returning its id.
    ///
    /// Registering the same type again returns the id assigned the first
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TypeIdSpaceExhausted`] when the id limit has
    /// been reached. Callers are expected to treat this as fatal.
    pub fn register<T: Component>(&self) -> Result<ComponentTypeId, ComponentError> {
        if let Some(id) = self.type_id::<T>() {
            return Ok(id);
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the read and write lock.
        if let Some(&id) = inner.by_type.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        if inner.next_id == 0 || inner.next_id > self.limit {
            return Err(ComponentError::TypeIdSpaceExhausted { limit: self.limit });
        }

        let id = ComponentTypeId(inner.next_id);
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.by_type.insert(TypeId::of::<T>(), id);
        inner.infos.push(ComponentTypeInfo {
            id,
            name: T::type_name(),
            version: T::type_version(),
        });

        debug!(type_name = T::type_name(), %id, "registered component type");
        Ok(id)
    }

    /// Returns the id of `T` if it has been registered.
    #[must_use]
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the metadata for a registered id.
    #[must_use]
    pub fn info(&self, id: ComponentTypeId) -> Option<ComponentTypeInfo> {
        if !id.is_valid() {
            return None;
        }
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.infos.get(usize::from(id.0) - 1).cloned()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .infos
            .len()
    }

    /// Returns `true` if no type has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
