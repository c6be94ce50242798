//! Delayed despawn through the manager's timer queue

use crate::decorator::{DecorationError, FnDecorator, FnUnDecorator, UnDecorator};
use crate::entity::{Body3D, Entity};
use crate::foundation::logging;
use crate::pooling::{PoolManager, PoolScope, PoolingStrategy, SpawnParams};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(50);
const SETTLE: Duration = Duration::from_millis(400);

fn manager() -> PoolManager {
    logging::init_for_tests();
    let pools = PoolManager::new(PoolScope::Scene);
    pools
        .register("Cube", &Entity::new("Cube").with_aspect(Body3D::default()), PoolingStrategy::DEFAULT, 5)
        .unwrap();
    pools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delayed_despawn_of_empty_entity() {
        let pools = manager();
        let handle = pools.spawn_empty(&SpawnParams::new());

        assert!(pools.despawn_after(&handle, None, DELAY));
        assert!(handle.lock().is_active());

        thread::sleep(SETTLE);
        assert!(!handle.lock().is_active());
        assert_eq!(pools.empty_stats().idle, 1);
    }

    #[test]
    fn test_delayed_despawn_returns_to_pool() {
        let pools = manager();
        let handle = pools.spawn("Cube", &SpawnParams::new()).unwrap();

        pools.despawn_after(&handle, None, DELAY);
        assert_eq!(pools.stats("Cube").unwrap().idle, 0);

        thread::sleep(SETTLE);
        let entity = handle.lock();
        assert!(entity.is_idle());
        assert!(!entity.is_active());
        assert_eq!(pools.stats("Cube").unwrap().idle, 1);
    }

    #[test]
    fn test_delayed_despawn_of_destroyed_entity_is_noop() {
        let pools = manager();
        let handle = pools.spawn("Cube", &SpawnParams::new()).unwrap();

        pools.despawn_after(&handle, None, DELAY);
        handle.lock().destroy();

        thread::sleep(SETTLE);
        let stats = pools.stats("Cube").unwrap();
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.despawned, 0);
    }

    #[test]
    fn test_despawn_after_does_not_block() {
        let pools = manager();
        let handle = pools.spawn("Cube", &SpawnParams::new()).unwrap();

        let started = std::time::Instant::now();
        pools.despawn_after(&handle, None, Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(1));

        // Spawning and despawning other entities proceeds meanwhile
        let other = pools.spawn("Cube", &SpawnParams::new()).unwrap();
        pools.despawn(&other, None);
        assert_eq!(pools.stats("Cube").unwrap().idle, 1);
    }

    #[test]
    fn test_shutdown_discards_pending_despawns() {
        let pools = manager();
        let handle = pools.spawn("Cube", &SpawnParams::new()).unwrap();

        pools.despawn_after(&handle, None, DELAY);
        pools.shutdown();

        thread::sleep(SETTLE);
        assert!(handle.lock().is_active());
        assert!(!handle.is_destroyed());
    }

    #[test]
    fn test_delayed_despawn_strips_other_managers_empty_entity() {
        let global = PoolManager::new(PoolScope::Global);
        let scene = manager();

        let add_body = FnDecorator::new(|e: &mut Entity| {
            e.add_aspect(Body3D::default());
            Ok(())
        });
        let keep_everything: Arc<dyn UnDecorator> =
            Arc::new(FnUnDecorator(|_: &mut Entity| -> Result<(), DecorationError> { Ok(()) }));

        let handle = scene.spawn_empty(&SpawnParams::new().with_decorator(&add_body));
        global.despawn_after(&handle, Some(keep_everything), DELAY);

        thread::sleep(SETTLE);
        let entity = handle.lock();
        assert!(entity.is_idle());
        assert_eq!(entity.aspect_count(), 0);
        assert_eq!(scene.empty_stats().idle, 1);
    }
}
