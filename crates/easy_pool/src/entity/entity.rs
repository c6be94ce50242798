//! Entity implementation
//!
//! An entity is a named bag of aspects with a transform. Pool bookkeeping
//! (owner, idle flag, container) lives on the entity itself so any aspect
//! combination can be pooled.

use super::aspect::Aspect;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::pooling::SubPool;
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Entity identifier, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A poolable object instance
pub struct Entity {
    id: EntityId,

    /// Display name; pooled instances carry their sub-pool's name
    pub name: String,

    /// Spatial transform
    pub transform: Transform,

    active: bool,
    aspects: Vec<Box<dyn Aspect>>,

    /// Sub-pool this entity returns to on despawn
    owner: Option<Weak<SubPool>>,

    /// Sitting in an idle queue
    idle: bool,

    /// Name of the sub-pool holding this entity while idle
    container: Option<String>,

    destroyed: bool,
}

impl Entity {
    /// Create a new, active entity without aspects
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            transform: Transform::default(),
            active: true,
            aspects: Vec::new(),
            owner: None,
            idle: false,
            container: None,
            destroyed: false,
        }
    }

    /// Builder-style aspect attachment
    pub fn with_aspect<A: Aspect>(mut self, aspect: A) -> Self {
        self.add_aspect(aspect);
        self
    }

    /// Builder-style initial position
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity is live in the scene
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Activate or deactivate the entity
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the entity is sitting in an idle queue
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub(crate) fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    /// Sub-pool currently holding this entity while idle
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub(crate) fn set_container(&mut self, container: Option<String>) {
        self.container = container;
    }

    /// Whether the entity was destroyed permanently
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the entity records an owning sub-pool
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// Forget the owning sub-pool; the entity is destroyed on despawn
    pub fn clear_owner(&mut self) {
        self.owner = None;
    }

    /// The owning sub-pool, if it is still alive
    pub(crate) fn owner(&self) -> Option<Arc<SubPool>> {
        self.owner.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_owner(&mut self, owner: Weak<SubPool>) {
        self.owner = Some(owner);
    }

    /// Position and rotation in one call
    pub fn place(&mut self, position: Vec3, rotation: Quat) {
        self.transform.position = position;
        self.transform.rotation = rotation;
    }

    // ========================================================================
    // ASPECTS
    // ========================================================================

    /// Attach an aspect, replacing any existing aspect of the same type
    pub fn add_aspect<A: Aspect>(&mut self, aspect: A) {
        self.add_boxed_aspect(Box::new(aspect));
    }

    /// Attach a boxed aspect, replacing any existing aspect of the same type
    pub fn add_boxed_aspect(&mut self, aspect: Box<dyn Aspect>) {
        let type_id = aspect.aspect_type_id();
        if let Some(slot) = self.aspects.iter_mut().find(|a| a.aspect_type_id() == type_id) {
            *slot = aspect;
        } else {
            self.aspects.push(aspect);
        }
    }

    /// Borrow an aspect by type
    pub fn aspect<A: Aspect>(&self) -> Option<&A> {
        self.aspects
            .iter()
            .find_map(|a| a.as_any().downcast_ref::<A>())
    }

    /// Mutably borrow an aspect by type
    pub fn aspect_mut<A: Aspect>(&mut self) -> Option<&mut A> {
        self.aspects
            .iter_mut()
            .find_map(|a| a.as_any_mut().downcast_mut::<A>())
    }

    /// Whether an aspect of type `A` is attached
    pub fn has_aspect<A: Aspect>(&self) -> bool {
        self.has_aspect_type(TypeId::of::<A>())
    }

    /// Whether an aspect with the given type id is attached
    pub fn has_aspect_type(&self, type_id: TypeId) -> bool {
        self.aspects.iter().any(|a| a.aspect_type_id() == type_id)
    }

    /// Mutably borrow an aspect by type id
    pub fn aspect_by_type_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Aspect> {
        self.aspects
            .iter_mut()
            .find(|a| a.aspect_type_id() == type_id)
            .map(|a| a.as_mut() as &mut dyn Aspect)
    }

    /// Remove an aspect by type, firing its destroy hook
    pub fn remove_aspect<A: Aspect>(&mut self) -> bool {
        self.remove_aspect_by_type(TypeId::of::<A>())
    }

    /// Remove an aspect by type id, firing its destroy hook
    pub fn remove_aspect_by_type(&mut self, type_id: TypeId) -> bool {
        let Some(index) = self.aspects.iter().position(|a| a.aspect_type_id() == type_id) else {
            return false;
        };
        let mut removed = self.aspects.remove(index);
        if let Some(poolable) = removed.as_poolable() {
            poolable.on_destroy();
        }
        true
    }

    /// Remove every aspect, newest first, firing destroy hooks
    ///
    /// The transform is not an aspect and always survives.
    pub fn strip_aspects(&mut self) {
        while let Some(mut aspect) = self.aspects.pop() {
            if let Some(poolable) = aspect.as_poolable() {
                poolable.on_destroy();
            }
        }
    }

    /// Iterate over attached aspects
    pub fn aspects(&self) -> impl Iterator<Item = &dyn Aspect> {
        self.aspects.iter().map(|a| a.as_ref())
    }

    /// Number of attached aspects
    pub fn aspect_count(&self) -> usize {
        self.aspects.len()
    }

    /// Names of the attached aspect types, in attachment order
    pub fn aspect_names(&self) -> Vec<&'static str> {
        self.aspects.iter().map(|a| a.type_name()).collect()
    }

    pub(crate) fn for_each_poolable(&mut self, mut f: impl FnMut(&mut dyn super::Poolable)) {
        for aspect in &mut self.aspects {
            if let Some(poolable) = aspect.as_poolable() {
                f(poolable);
            }
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Create an independent copy with a fresh id and no pool state
    ///
    /// Every aspect is deep-copied through [`Aspect::clone_box`](super::AspectAny::clone_box),
    /// so field values are copied rather than shared.
    pub fn instantiate(&self) -> Entity {
        Entity {
            id: EntityId::next(),
            name: self.name.clone(),
            transform: self.transform.clone(),
            active: self.active,
            aspects: self.aspects.iter().map(|a| a.clone_box()).collect(),
            owner: None,
            idle: false,
            container: None,
            destroyed: false,
        }
    }

    /// Destroy permanently: fire destroy hooks and drop every aspect
    ///
    /// Destroying twice is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.for_each_poolable(|p| p.on_destroy());
        self.aspects.clear();
        self.active = false;
        self.idle = false;
        self.owner = None;
        self.container = None;
        self.destroyed = true;
        log::trace!("Destroyed entity '{}' {}", self.name, self.id);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("idle", &self.idle)
            .field("container", &self.container)
            .field("destroyed", &self.destroyed)
            .field("aspects", &self.aspect_names())
            .finish()
    }
}

/// Shared, lockable reference to an entity
///
/// Spawning hands one out; despawning takes it back. Clones refer to the
/// same entity.
#[derive(Clone)]
pub struct EntityHandle {
    id: EntityId,
    inner: Arc<Mutex<Entity>>,
}

impl EntityHandle {
    /// Wrap an entity in a handle
    pub fn new(entity: Entity) -> Self {
        Self {
            id: entity.id(),
            inner: Arc::new(Mutex::new(entity)),
        }
    }

    /// ID of the referenced entity
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Lock the entity for reading or writing
    ///
    /// A poisoned lock is recovered; entity state stays usable.
    pub fn lock(&self) -> MutexGuard<'_, Entity> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the referenced entity was destroyed
    pub fn is_destroyed(&self) -> bool {
        self.lock().is_destroyed()
    }

    /// Whether two handles refer to the same entity
    pub fn ptr_eq(&self, other: &EntityHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for EntityHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EntityHandle {}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityHandle").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Body2D, Body3D};
    use crate::foundation::math::Vec2;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = Entity::new("a");
        let b = Entity::new("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_add_aspect_replaces_same_type() {
        let mut entity = Entity::new("ship")
            .with_aspect(Body2D::with_velocity(Vec2::new(1.0, 0.0)));
        entity.add_aspect(Body2D::with_velocity(Vec2::new(0.0, 2.0)));

        assert_eq!(entity.aspect_count(), 1);
        assert_eq!(entity.aspect::<Body2D>().unwrap().velocity, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_instantiate_copies_aspects_independently() {
        let template = Entity::new("rock")
            .with_aspect(Body3D::with_velocity(Vec3::new(1.0, 2.0, 3.0)));
        let mut copy = template.instantiate();

        assert_ne!(copy.id(), template.id());
        assert_eq!(copy.name, "rock");

        copy.aspect_mut::<Body3D>().unwrap().velocity = Vec3::zeros();
        assert_eq!(template.aspect::<Body3D>().unwrap().velocity, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_strip_aspects_keeps_transform() {
        let mut entity = Entity::new("rock")
            .at(Vec3::new(4.0, 5.0, 6.0))
            .with_aspect(Body3D::default())
            .with_aspect(Body2D::default());

        entity.strip_aspects();

        assert_eq!(entity.aspect_count(), 0);
        assert_eq!(entity.transform.position, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_remove_aspect() {
        let mut entity = Entity::new("rock").with_aspect(Body3D::default());
        assert!(entity.has_aspect::<Body3D>());
        assert!(entity.remove_aspect::<Body3D>());
        assert!(!entity.has_aspect::<Body3D>());
        assert!(!entity.remove_aspect::<Body3D>());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut entity = Entity::new("rock").with_aspect(Body3D::default());
        entity.destroy();
        entity.destroy();

        assert!(entity.is_destroyed());
        assert!(!entity.is_active());
        assert_eq!(entity.aspect_count(), 0);
    }

    #[test]
    fn test_handle_equality_is_identity() {
        let handle = EntityHandle::new(Entity::new("a"));
        let clone = handle.clone();
        let other = EntityHandle::new(Entity::new("a"));

        assert_eq!(handle, clone);
        assert_ne!(handle, other);
        assert_eq!(handle.id(), clone.id());
    }
}
