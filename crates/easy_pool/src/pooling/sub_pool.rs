//! Sub-pool: the idle queue of one blueprint
//!
//! All state changes of a sub-pool happen under its own lock. Lock order is
//! always pool state first, then the entity; hooks and decorators run with
//! both held.

use super::{PoolError, PoolStats, PoolingStrategy, SpawnParams};
use crate::blueprint::EntityBlueprint;
use crate::decorator::{Decorator, FullUnDecorator, UnDecorator};
use crate::entity::{Entity, EntityHandle};
use crate::foundation::math::{Quat, Vec3};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Growth step applied when a spawn has to construct past capacity
pub const GROW_STEP: usize = 5;

/// Upper bound of a growing pool, as a multiple of its minimum capacity
pub const GROW_LIMIT_FACTOR: usize = 5;

#[derive(Debug, Default)]
struct PoolState {
    capacity: usize,
    idle: VecDeque<EntityHandle>,
    /// Entities handed out and not yet despawned
    active: usize,
    created: u64,
    destroyed: u64,
    spawned: u64,
    despawned: u64,
}

/// Outcome of a sub-pool despawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnOutcome {
    /// The entity was deactivated and queued for reuse
    Pooled,
    /// The pool was full; the entity was destroyed
    Destroyed,
    /// Nothing happened (already idle, destroyed, or owned elsewhere)
    Ignored,
}

/// Reusable instances of one blueprint
pub struct SubPool {
    name: String,
    /// Inactive reference entity every instance is cloned from
    template: Entity,
    blueprint: EntityBlueprint,
    strategy: PoolingStrategy,
    min_capacity: usize,
    /// Serves aspect-less entities; despawns always strip fully
    empty: bool,
    state: Mutex<PoolState>,
    self_ref: Weak<SubPool>,
}

impl SubPool {
    /// Create a sub-pool from a template entity
    ///
    /// The template is cloned; the caller keeps its own copy. With
    /// [`PoolingStrategy::FILL`] the idle queue is populated to `capacity`
    /// before returning.
    pub fn create(
        name: impl Into<String>,
        template: &Entity,
        strategy: PoolingStrategy,
        capacity: usize,
    ) -> Result<Arc<SubPool>, PoolError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PoolError::EmptyName);
        }
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity { name, capacity });
        }

        let mut reference = template.instantiate();
        reference.name = name.clone();
        reference.set_active(false);

        let blueprint = EntityBlueprint::capture(name.clone(), &reference).map_err(|source| {
            PoolError::Blueprint {
                name: name.clone(),
                source,
            }
        })?;

        Ok(Self::build(name, reference, blueprint, strategy, capacity, false))
    }

    /// Create a sub-pool of aspect-less entities
    ///
    /// Its entities are fully un-decorated on every despawn, whichever
    /// manager routes the despawn and whatever un-decorator is passed.
    pub fn empty(name: impl Into<String>, strategy: PoolingStrategy, capacity: usize) -> Arc<SubPool> {
        let name = name.into();
        let mut reference = Entity::new(name.clone());
        reference.set_active(false);
        let blueprint = EntityBlueprint::empty(name.clone());

        Self::build(name, reference, blueprint, strategy, capacity.max(1), true)
    }

    fn build(
        name: String,
        template: Entity,
        blueprint: EntityBlueprint,
        strategy: PoolingStrategy,
        capacity: usize,
        empty: bool,
    ) -> Arc<SubPool> {
        let pool = Arc::new_cyclic(|self_ref| SubPool {
            name,
            template,
            blueprint,
            strategy,
            min_capacity: capacity,
            empty,
            state: Mutex::new(PoolState {
                capacity,
                ..Default::default()
            }),
            self_ref: self_ref.clone(),
        });

        if strategy.fills() {
            pool.fill();
        }

        log::debug!(
            "Created sub-pool '{}' (strategy {:?}, capacity {})",
            pool.name,
            strategy,
            capacity
        );
        pool
    }

    fn fill(&self) {
        let mut state = self.lock_state();
        while state.idle.len() < state.capacity {
            let mut entity = self.construct(Some(&self.blueprint), Vec3::zeros(), Quat::identity());
            entity.set_idle(true);
            entity.set_active(false);
            entity.set_container(Some(self.name.clone()));
            state.created += 1;
            state.idle.push_back(EntityHandle::new(entity));
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Pool name, shared with its blueprint and every instance
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Captured template defaults
    pub fn blueprint(&self) -> &EntityBlueprint {
        &self.blueprint
    }

    /// Strategy flags
    pub fn strategy(&self) -> PoolingStrategy {
        self.strategy
    }

    /// Capacity the pool was created with
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Whether this is an empty-entity pool
    pub fn is_empty_pool(&self) -> bool {
        self.empty
    }

    /// Current capacity
    pub fn capacity(&self) -> usize {
        self.lock_state().capacity
    }

    /// Number of idle entities
    pub fn idle_count(&self) -> usize {
        self.lock_state().idle.len()
    }

    /// Whether `entity` records this pool as its owner
    pub fn owns(&self, entity: &Entity) -> bool {
        entity
            .owner()
            .is_some_and(|owner| std::ptr::eq(Arc::as_ptr(&owner), self))
    }

    /// Snapshot of counters and sizes
    pub fn stats(&self) -> PoolStats {
        let state = self.lock_state();
        PoolStats {
            name: self.name.clone(),
            strategy: self.strategy,
            capacity: state.capacity,
            min_capacity: self.min_capacity,
            idle: state.idle.len(),
            active: state.active,
            created: state.created,
            destroyed: state.destroyed,
            spawned: state.spawned,
            despawned: state.despawned,
        }
    }

    // ========================================================================
    // SPAWN / DESPAWN
    // ========================================================================

    /// Hand out an entity, reusing an idle one when possible
    ///
    /// Without an explicit decorator the pool's blueprint is used. A
    /// create-only decorator is skipped for reused entities.
    pub fn spawn(&self, params: &SpawnParams<'_>) -> EntityHandle {
        let decorator: &dyn Decorator = params.decorator.unwrap_or(&self.blueprint);
        let mut state = self.lock_state();

        let handle = match self.take_idle(&mut state) {
            Some(handle) => {
                {
                    let mut entity = handle.lock();
                    entity.set_container(None);
                    entity.place(params.position, params.rotation);
                    if !decorator.is_create_only() {
                        self.decorate(decorator, &mut entity);
                    }
                }
                log::trace!("Reused entity {} from '{}'", handle.id(), self.name);
                handle
            }
            None => {
                let entity = self.construct(Some(decorator), params.position, params.rotation);
                state.created += 1;
                log::trace!("Constructed entity {} for '{}'", entity.id(), self.name);
                self.grow(&mut state);
                EntityHandle::new(entity)
            }
        };

        state.active += 1;
        state.spawned += 1;

        {
            let mut entity = handle.lock();
            entity.set_idle(false);
            if let Some(policy) = params.policy {
                policy.apply(&mut entity);
            }
            entity.set_active(true);
            entity.for_each_poolable(|p| p.on_spawn());
        }

        handle
    }

    /// Take an entity back
    ///
    /// Below capacity the entity is un-decorated, deactivated and queued.
    /// At capacity it is destroyed, and a growing pool that is exactly full
    /// above its minimum gives up one slot and its oldest idle entity.
    /// An empty-entity pool ignores `undecorator` and strips every aspect.
    pub fn despawn(&self, handle: &EntityHandle, undecorator: Option<&dyn UnDecorator>) -> DespawnOutcome {
        let undecorator: Option<&dyn UnDecorator> = if self.empty {
            Some(&FullUnDecorator)
        } else {
            undecorator
        };
        let mut state = self.lock_state();
        let mut entity = handle.lock();

        if entity.is_destroyed() {
            log::warn!("Ignoring despawn of destroyed entity {} in '{}'", handle.id(), self.name);
            return DespawnOutcome::Ignored;
        }
        if entity.is_idle() {
            log::warn!("Entity {} is already idle in '{}'", handle.id(), self.name);
            return DespawnOutcome::Ignored;
        }
        if !self.owns(&entity) {
            log::warn!("Entity {} is not owned by '{}'", handle.id(), self.name);
            return DespawnOutcome::Ignored;
        }

        entity.for_each_poolable(|p| p.on_despawn());
        entity.set_idle(true);
        state.active = state.active.saturating_sub(1);
        state.despawned += 1;

        if state.idle.len() < state.capacity {
            if let Some(undecorator) = undecorator {
                if let Err(e) = undecorator.undecorate(&mut entity) {
                    log::warn!(
                        "Un-decoration of '{}' {} in '{}' failed: {}",
                        entity.name,
                        entity.id(),
                        self.name,
                        e
                    );
                }
            }
            entity.set_active(false);
            entity.set_container(Some(self.name.clone()));
            drop(entity);

            state.idle.push_back(handle.clone());
            log::trace!("Pooled entity {} in '{}'", handle.id(), self.name);
            return DespawnOutcome::Pooled;
        }

        entity.destroy();
        drop(entity);
        state.destroyed += 1;
        log::debug!("Pool '{}' is full, destroyed entity {}", self.name, handle.id());

        self.shrink(&mut state);
        DespawnOutcome::Destroyed
    }

    /// Destroy every idle entity; returns how many were destroyed
    pub fn drain(&self) -> usize {
        let mut state = self.lock_state();
        let drained: Vec<_> = state.idle.drain(..).collect();
        for handle in &drained {
            handle.lock().destroy();
        }
        state.destroyed += drained.len() as u64;
        drained.len()
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Pop the oldest idle entity, skipping any destroyed from outside
    fn take_idle(&self, state: &mut PoolState) -> Option<EntityHandle> {
        while let Some(handle) = state.idle.pop_front() {
            if handle.is_destroyed() {
                log::debug!("Dropping externally destroyed entity {} from '{}'", handle.id(), self.name);
                continue;
            }
            return Some(handle);
        }
        None
    }

    fn construct(&self, decorator: Option<&dyn Decorator>, position: Vec3, rotation: Quat) -> Entity {
        let mut entity = self.template.instantiate();
        entity.name = self.name.clone();
        entity.place(position, rotation);

        if let Some(decorator) = decorator {
            self.decorate(decorator, &mut entity);
        }

        entity.set_owner(self.self_ref.clone());
        entity.for_each_poolable(|p| p.on_create());
        entity
    }

    fn decorate(&self, decorator: &dyn Decorator, entity: &mut Entity) {
        if let Err(e) = decorator.decorate(entity) {
            log::warn!(
                "Decoration of '{}' {} in '{}' failed: {}",
                entity.name,
                entity.id(),
                self.name,
                e
            );
        }
    }

    /// Grow when the outstanding entities outnumber the capacity
    fn grow(&self, state: &mut PoolState) {
        let limit = self.min_capacity * GROW_LIMIT_FACTOR;
        if !self.strategy.grows() || !state.idle.is_empty() {
            return;
        }
        if state.active + 1 > state.capacity && state.capacity < limit {
            state.capacity = (state.capacity + GROW_STEP).min(limit);
            log::debug!("Pool '{}' grew to capacity {}", self.name, state.capacity);
        }
    }

    fn shrink(&self, state: &mut PoolState) {
        if !self.strategy.grows() {
            return;
        }
        if state.idle.len() == state.capacity && state.idle.len() > self.min_capacity {
            state.capacity -= 1;
            if let Some(oldest) = state.idle.pop_front() {
                oldest.lock().destroy();
                state.destroyed += 1;
            }
            log::debug!("Pool '{}' shrank to capacity {}", self.name, state.capacity);
        }
    }
}

impl fmt::Debug for SubPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("SubPool")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("capacity", &state.capacity)
            .field("min_capacity", &self.min_capacity)
            .field("idle", &state.idle.len())
            .finish()
    }
}
