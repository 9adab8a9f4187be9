//! Generational arena for homogeneous component storage.
//!
//! Slots are reused after removal with an incremented generation. Lookups
//! compare the handle's generation against the slot's and fail on mismatch,
//! so a stale handle can never alias the slot's new occupant.

use crate::handle::ComponentHandle;
use crate::registry::ComponentTypeId;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena storage for the components of one type.
#[derive(Debug)]
pub struct ComponentStorage<T> {
    type_id: ComponentTypeId,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> ComponentStorage<T> {
    /// Create empty storage for the given component type.
    #[must_use]
    pub fn new(type_id: ComponentTypeId) -> Self {
        Self {
            type_id,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// The component type stored here.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Insert a value built from its future handle.
    pub fn insert_with(&mut self, build: impl FnOnce(ComponentHandle) -> T) -> ComponentHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                // Slot count is bounded by u32 handles; growing past that is a logic error.
                u32::try_from(self.slots.len() - 1).unwrap_or(u32::MAX)
            }
        };

        let slot = &mut self.slots[index as usize];
        let handle = ComponentHandle::new(self.type_id, index, slot.generation);
        slot.value = Some(build(handle));
        self.len += 1;
        handle
    }

    /// Returns `true` if `handle` refers to a live value in this storage.
    #[must_use]
    pub fn contains(&self, handle: ComponentHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Resolve a handle. Fails for stale, foreign or out-of-range handles.
    #[must_use]
    pub fn get(&self, handle: ComponentHandle) -> Option<&T> {
        if handle.type_id() != self.type_id {
            return None;
        }
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Resolve a handle mutably.
    #[must_use]
    pub fn get_mut(&mut self, handle: ComponentHandle) -> Option<&mut T> {
        if handle.type_id() != self.type_id {
            return None;
        }
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Remove the value behind `handle` and retire the handle.
    pub fn remove(&mut self, handle: ComponentHandle) -> Option<T> {
        self.get(handle)?;
        let slot = &mut self.slots[handle.index() as usize];
        let value = slot.value.take();
        self.len -= 1;

        // A slot whose generation would wrap is retired instead of reused.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(handle.index());
        }
        value
    }

    /// Number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no value is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live values with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentHandle, &T)> {
        let type_id = self.type_id;
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            let value = slot.value.as_ref()?;
            Some((
                ComponentHandle::new(type_id, i as u32, slot.generation),
                value,
            ))
        })
    }

    /// Iterate mutably over live values with their handles, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ComponentHandle, &mut T)> {
        let type_id = self.type_id;
        self.slots.iter_mut().enumerate().filter_map(move |(i, slot)| {
            let generation = slot.generation;
            let value = slot.value.as_mut()?;
            Some((ComponentHandle::new(type_id, i as u32, generation), value))
        })
    }
}
