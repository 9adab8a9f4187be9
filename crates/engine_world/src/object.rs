//! Game objects and the per-world object table.

use std::collections::BTreeMap;

use engine_component::{
    ComponentHandle, ComponentTypeId, ObjectId, ObjectIdAllocator, OwnerObject,
};
use engine_math::{BoundingBoxSphere, Transform3D};

/// A game object: a transform plus the components attached to it.
///
/// The object owns its components. Handles are kept in attach order.
#[derive(Debug, Clone)]
pub struct GameObject {
    id: ObjectId,
    name: String,
    transform: Transform3D,
    local_bounds: Option<BoundingBoxSphere>,
    components: Vec<ComponentHandle>,
}

impl GameObject {
    fn new(id: ObjectId, name: String, transform: Transform3D) -> Self {
        Self {
            id,
            name,
            transform,
            local_bounds: None,
            components: Vec::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object's transform. Objects are not parented, so this is also the
    /// global transform.
    #[must_use]
    pub fn transform(&self) -> &Transform3D {
        &self.transform
    }

    pub(crate) fn set_transform(&mut self, transform: Transform3D) {
        self.transform = transform;
    }

    /// Union of the local bounds of all components, as of the last bounds
    /// update.
    #[must_use]
    pub fn local_bounds(&self) -> Option<BoundingBoxSphere> {
        self.local_bounds
    }

    pub(crate) fn set_local_bounds(&mut self, bounds: Option<BoundingBoxSphere>) {
        self.local_bounds = bounds;
    }

    /// Attached component handles, in attach order.
    #[must_use]
    pub fn components(&self) -> &[ComponentHandle] {
        &self.components
    }

    pub(crate) fn add_component(&mut self, handle: ComponentHandle) {
        self.components.push(handle);
    }

    pub(crate) fn remove_component(&mut self, handle: ComponentHandle) -> bool {
        let before = self.components.len();
        self.components.retain(|h| *h != handle);
        self.components.len() != before
    }
}

impl OwnerObject for GameObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn global_transform(&self) -> Transform3D {
        self.transform
    }

    fn global_bounds(&self) -> Option<BoundingBoxSphere> {
        self.local_bounds
            .map(|bounds| bounds.transformed(&self.transform))
    }

    fn try_get_component_of_type(&self, type_id: ComponentTypeId) -> Option<ComponentHandle> {
        self.components
            .iter()
            .copied()
            .find(|h| h.type_id() == type_id)
    }
}

/// All objects in one world, keyed by id.
#[derive(Debug, Default)]
pub struct ObjectTable {
    allocator: ObjectIdAllocator,
    objects: BTreeMap<ObjectId, GameObject>,
}

impl ObjectTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object with no components.
    pub fn create(&mut self, name: impl Into<String>, transform: Transform3D) -> ObjectId {
        let id = self.allocator.allocate();
        self.objects
            .insert(id, GameObject::new(id, name.into(), transform));
        id
    }

    /// Look up an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.objects.remove(&id)
    }

    /// Iterate over objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no objects exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use engine_math::Vec3;

    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut table = ObjectTable::new();
        let a = table.create("a", Transform3D::IDENTITY);
        let b = table.create("b", Transform3D::IDENTITY);
        assert_ne!(a, b);
        assert_eq!(table.get(a).unwrap().name(), "a");
        assert_eq!(table.len(), 2);

        assert!(table.remove(a).is_some());
        assert!(table.get(a).is_none());
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn test_sibling_lookup_by_type() {
        let mut table = ObjectTable::new();
        let id = table.create("crate", Transform3D::IDENTITY);
        let first = ComponentHandle::new(ComponentTypeId(2), 0, 0);
        let second = ComponentHandle::new(ComponentTypeId(3), 0, 0);

        let object = table.get_mut(id).unwrap();
        object.add_component(first);
        object.add_component(second);

        assert_eq!(
            object.try_get_component_of_type(ComponentTypeId(3)),
            Some(second)
        );
        assert!(object.try_get_component_of_type(ComponentTypeId(9)).is_none());

        assert!(object.remove_component(second));
        assert!(!object.remove_component(second));
        assert_eq!(object.components(), &[first]);
    }

    #[test]
    fn test_global_bounds_follow_transform() {
        let mut table = ObjectTable::new();
        let id = table.create(
            "moved",
            Transform3D::from_position(Vec3::new(0.0, 5.0, 0.0)),
        );
        let object = table.get_mut(id).unwrap();
        assert!(object.global_bounds().is_none());

        object.set_local_bounds(BoundingBoxSphere::from_points([
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        ]));
        let global = object.global_bounds().unwrap();
        assert!((global.center - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-5);
    }
}
