//! Pool manager
//!
//! A name-indexed registry of sub-pools plus one implicit sub-pool of empty
//! entities. The registry lock is only held while the map is read or
//! mutated, never while a sub-pool spawns, despawns or fills.

use super::{
    DespawnOutcome, PoolError, PoolStats, PoolingStrategy, SpawnParams, SubPool, DEFAULT_CAPACITY,
    EMPTY_POOL_NAME,
};
use crate::blueprint::BlueprintPoolDefinition;
use crate::config::{PoolSettings, TemplateLibrary};
use crate::decorator::UnDecorator;
use crate::entity::{Entity, EntityHandle};
use crate::foundation::time::TimerQueue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lifetime of a pool manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolScope {
    /// Lives for the whole process
    Global,
    /// Torn down with the scene that created it
    Scene,
}

impl PoolScope {
    /// Whether pools outlive scene changes
    pub fn is_persistent(self) -> bool {
        matches!(self, PoolScope::Global)
    }

    fn label(self) -> &'static str {
        match self {
            PoolScope::Global => "global",
            PoolScope::Scene => "scene",
        }
    }
}

enum RegistryEntry {
    /// Reserved while the sub-pool is being built
    Pending,
    Ready(Arc<SubPool>),
}

/// Name-indexed façade over many sub-pools
///
/// # Example
///
/// ```rust
/// use easy_pool::prelude::*;
///
/// let pools = PoolManager::new(PoolScope::Scene);
/// let template = Entity::new("Rock").with_aspect(Body3D::default());
/// pools.register("Rock", &template, PoolingStrategy::FILL, 8).unwrap();
///
/// let rock = pools.spawn("Rock", &SpawnParams::new()).unwrap();
/// pools.despawn(&rock, None);
/// assert_eq!(pools.stats("Rock").unwrap().idle, 8);
/// ```
pub struct PoolManager {
    scope: PoolScope,
    empty_pool: Arc<SubPool>,
    registry: Mutex<HashMap<String, RegistryEntry>>,
    timers: TimerQueue,
}

impl PoolManager {
    /// Create a manager with an empty-entity pool of default capacity
    pub fn new(scope: PoolScope) -> Self {
        Self::with_empty_capacity(scope, DEFAULT_CAPACITY)
    }

    /// Create a manager whose empty-entity pool holds `capacity` entities
    pub fn with_empty_capacity(scope: PoolScope, capacity: usize) -> Self {
        let empty_pool = SubPool::empty(EMPTY_POOL_NAME, PoolingStrategy::DEFAULT, capacity);
        log::info!("Created {} pool manager", scope.label());

        Self {
            scope,
            empty_pool,
            registry: Mutex::new(HashMap::new()),
            timers: TimerQueue::new(format!("{}-pool-timer", scope.label())),
        }
    }

    /// Create a manager and register every startup pool in `settings`
    ///
    /// Startup pools that fail to register are logged and skipped.
    pub fn from_settings(scope: PoolScope, settings: &PoolSettings, templates: &TemplateLibrary) -> Self {
        let manager = Self::with_empty_capacity(scope, settings.default_capacity);
        manager.register_startup(settings, templates);
        manager
    }

    /// Scope this manager was created for
    pub fn scope(&self) -> PoolScope {
        self.scope
    }

    fn lock_registry(&self) -> MutexGuard<'_, HashMap<String, RegistryEntry>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, name: &str) -> Option<Arc<SubPool>> {
        match self.lock_registry().get(name) {
            Some(RegistryEntry::Ready(pool)) => Some(Arc::clone(pool)),
            _ => None,
        }
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Register a blueprint under `name`
    ///
    /// An existing registration is never replaced. The name is reserved
    /// before the sub-pool is built, so a concurrent registration of the same
    /// name fails as a duplicate. On failure the reservation is released.
    pub fn register(
        &self,
        name: &str,
        template: &Entity,
        strategy: PoolingStrategy,
        capacity: usize,
    ) -> Result<(), PoolError> {
        if name.is_empty() {
            log::warn!("Refusing to register a blueprint without a name");
            return Err(PoolError::EmptyName);
        }

        {
            let mut registry = self.lock_registry();
            if registry.contains_key(name) {
                log::warn!("Blueprint '{}' is already registered", name);
                return Err(PoolError::DuplicateBlueprint(name.to_string()));
            }
            registry.insert(name.to_string(), RegistryEntry::Pending);
        }

        match SubPool::create(name, template, strategy, capacity) {
            Ok(pool) => {
                self.install(name, pool)?;
                log::info!(
                    "Registered blueprint '{}' in {} pool ({:?}, capacity {})",
                    name,
                    self.scope.label(),
                    strategy,
                    capacity
                );
                Ok(())
            }
            Err(e) => {
                self.release(name);
                match &e {
                    PoolError::Blueprint { .. } => log::error!("{}", e),
                    _ => log::warn!("{}", e),
                }
                Err(e)
            }
        }
    }

    /// Swap the placeholder of `name` for the built pool
    ///
    /// If the placeholder is gone the name was claimed by someone else in the
    /// meantime; the new pool is drained and the registration fails.
    fn install(&self, name: &str, pool: Arc<SubPool>) -> Result<(), PoolError> {
        let unclaimed = match self.lock_registry().get_mut(name) {
            Some(entry) if matches!(entry, RegistryEntry::Pending) => {
                *entry = RegistryEntry::Ready(pool);
                None
            }
            _ => Some(pool),
        };

        match unclaimed {
            None => Ok(()),
            Some(pool) => {
                let drained = pool.drain();
                log::warn!(
                    "Blueprint '{}' was claimed while its pool was built, discarded it ({} idle destroyed)",
                    name,
                    drained
                );
                Err(PoolError::DuplicateBlueprint(name.to_string()))
            }
        }
    }

    /// Drop the placeholder of `name`, leaving any finished registration alone
    fn release(&self, name: &str) {
        let mut registry = self.lock_registry();
        if matches!(registry.get(name), Some(RegistryEntry::Pending)) {
            registry.remove(name);
        }
    }

    /// Register an in-code pool definition
    pub fn register_definition(&self, definition: &BlueprintPoolDefinition) -> Result<(), PoolError> {
        self.register(
            &definition.pool_name,
            &definition.template,
            definition.strategy,
            definition.initial_size,
        )
    }

    /// Register every startup pool in `settings`; returns how many succeeded
    pub fn register_startup(&self, settings: &PoolSettings, templates: &TemplateLibrary) -> usize {
        let mut registered = 0;

        for startup in &settings.startup {
            let Some(template) = templates.get(&startup.template) else {
                log::warn!(
                    "{}",
                    PoolError::UnknownTemplate {
                        pool: startup.pool_name.clone(),
                        template: startup.template.clone(),
                    }
                );
                continue;
            };

            let capacity = startup.initial_size.unwrap_or(settings.default_capacity);
            let strategy = startup.strategy.unwrap_or(settings.default_strategy);
            if self.register(&startup.pool_name, template, strategy, capacity).is_ok() {
                registered += 1;
            }
        }

        registered
    }

    /// Whether a blueprint is registered and ready
    pub fn has_blueprint(&self, name: &str) -> bool {
        matches!(self.lock_registry().get(name), Some(RegistryEntry::Ready(_)))
    }

    /// Remove a blueprint and destroy its idle entities
    ///
    /// Entities still handed out keep working; they are destroyed on despawn
    /// since their owning sub-pool is gone.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut registry = self.lock_registry();
            match registry.get(name) {
                Some(RegistryEntry::Ready(_)) => registry.remove(name),
                _ => None,
            }
        };

        match removed {
            Some(RegistryEntry::Ready(pool)) => {
                let drained = pool.drain();
                log::info!("Unregistered blueprint '{}' ({} idle destroyed)", name, drained);
                true
            }
            _ => {
                log::warn!("Cannot unregister unknown blueprint '{}'", name);
                false
            }
        }
    }

    /// Names of all registered blueprints, sorted
    pub fn blueprint_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .lock_registry()
            .iter()
            .filter(|(_, entry)| matches!(entry, RegistryEntry::Ready(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    // ========================================================================
    // SPAWN
    // ========================================================================

    /// Spawn an entity of blueprint `name`
    ///
    /// Returns `None` for an unknown blueprint.
    pub fn spawn(&self, name: &str, params: &SpawnParams<'_>) -> Option<EntityHandle> {
        let Some(pool) = self.lookup(name) else {
            log::warn!("Cannot spawn: {}", PoolError::UnknownBlueprint(name.to_string()));
            return None;
        };
        Some(pool.spawn(params))
    }

    /// Spawn `count` entities of blueprint `name`
    ///
    /// Each spawn resolves the blueprint again; a blueprint that disappears
    /// mid-batch leaves `None` entries rather than failing the batch.
    pub fn spawn_many(&self, name: &str, count: usize, params: &SpawnParams<'_>) -> Vec<Option<EntityHandle>> {
        (0..count).map(|_| self.spawn(name, params)).collect()
    }

    /// Spawn an entity from the empty-entity pool
    pub fn spawn_empty(&self, params: &SpawnParams<'_>) -> EntityHandle {
        self.empty_pool.spawn(params)
    }

    /// Spawn `count` entities from the empty-entity pool
    pub fn spawn_many_empty(&self, count: usize, params: &SpawnParams<'_>) -> Vec<EntityHandle> {
        (0..count).map(|_| self.empty_pool.spawn(params)).collect()
    }

    // ========================================================================
    // DESPAWN
    // ========================================================================

    /// Return an entity to its owning sub-pool
    ///
    /// Entities without a live owner are destroyed. Entities of any empty
    /// pool, including another manager's, are always fully un-decorated,
    /// whatever `undecorator` says.
    pub fn despawn(&self, handle: &EntityHandle, undecorator: Option<&dyn UnDecorator>) -> DespawnOutcome {
        despawn_entity(handle, undecorator)
    }

    /// Despawn after `delay` without blocking
    ///
    /// The despawn runs on the manager's timer thread. If the entity was
    /// destroyed in the meantime nothing happens. Pending despawns are
    /// discarded when the manager shuts down.
    pub fn despawn_after(
        &self,
        handle: &EntityHandle,
        undecorator: Option<Arc<dyn UnDecorator>>,
        delay: Duration,
    ) -> bool {
        let handle = handle.clone();

        self.timers.schedule(delay, move || {
            if handle.is_destroyed() {
                log::trace!("Delayed despawn of {} skipped, already destroyed", handle.id());
                return;
            }
            despawn_entity(&handle, undecorator.as_deref());
        })
    }

    // ========================================================================
    // STATISTICS / TEARDOWN
    // ========================================================================

    /// Statistics of a registered sub-pool
    pub fn stats(&self, name: &str) -> Option<PoolStats> {
        self.lookup(name).map(|pool| pool.stats())
    }

    /// Statistics of the empty-entity pool
    pub fn empty_stats(&self) -> PoolStats {
        self.empty_pool.stats()
    }

    /// Stop pending delayed despawns and destroy every idle entity
    ///
    /// The manager stays usable: registrations are dropped but the empty pool
    /// keeps serving spawns. Registrations still being built keep their
    /// reservation.
    pub fn shutdown(&self) {
        self.timers.shutdown();

        let pools: Vec<_> = {
            let mut registry = self.lock_registry();
            let ready: Vec<String> = registry
                .iter()
                .filter(|(_, entry)| matches!(entry, RegistryEntry::Ready(_)))
                .map(|(name, _)| name.clone())
                .collect();
            ready
                .iter()
                .filter_map(|name| match registry.remove(name) {
                    Some(RegistryEntry::Ready(pool)) => Some(pool),
                    _ => None,
                })
                .collect()
        };

        let mut destroyed = self.empty_pool.drain();
        for pool in &pools {
            destroyed += pool.drain();
        }

        log::info!(
            "Shut down {} pool manager ({} pools, {} idle destroyed)",
            self.scope.label(),
            pools.len(),
            destroyed
        );
    }
}

impl Drop for PoolManager {
    fn drop(&mut self) {
        if self.scope.is_persistent() {
            self.timers.shutdown();
        } else {
            self.shutdown();
        }
    }
}

impl fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("scope", &self.scope)
            .field("blueprints", &self.blueprint_names())
            .finish()
    }
}

/// Route a despawn by the entity's recorded owner
fn despawn_entity(handle: &EntityHandle, undecorator: Option<&dyn UnDecorator>) -> DespawnOutcome {
    // Entity lock is released before the owner's pool lock is taken
    let owner = {
        let entity = handle.lock();
        if entity.is_destroyed() {
            log::warn!("Cannot despawn destroyed entity {}", handle.id());
            return DespawnOutcome::Ignored;
        }
        entity.owner()
    };

    match owner {
        None => {
            handle.lock().destroy();
            log::debug!("Entity {} has no pool, destroyed", handle.id());
            DespawnOutcome::Destroyed
        }
        Some(pool) => pool.despawn(handle, undecorator),
    }
}
