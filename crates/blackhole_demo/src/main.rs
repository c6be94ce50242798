//! Black hole demo
//!
//! Headless asteroid field spiraling into a black hole. Asteroids come from a
//! scene pool and break into particle bursts when they reach the event
//! horizon; particles come from a global pool and return to it when their
//! lifetime runs out.
//!
//! Pass a `.toml` or `.ron` pool settings file as the first argument to
//! override the built-in startup registration.

mod components;

use components::{Asteroid, TimeToLive};
use easy_pool::foundation::math::normalize_or_zero;
use easy_pool::prelude::*;
use rand::Rng;
use slotmap::{DefaultKey, SlotMap};
use std::f32::consts::PI;
use std::time::Duration;

const ASTEROID: &str = "Asteroid";
const PARTICLE: &str = "ExplosionParticle";

const START_SPAWN_COUNT: usize = 50;
const SPAWN_INTERVAL: f32 = 1.0;
const SPAWN_MIN_RADIUS: f32 = 16.0;
const SPAWN_RADIUS: f32 = 18.0;
const START_MIN_RADIUS: f32 = 5.0;

const GRAVITY_RANGE: f32 = 25.0;
const GRAVITY_STRENGTH: f32 = 2.5;

const BURSTS: usize = 5;
const PARTICLES_PER_BURST: usize = 15;
const STRAY_DESPAWN_DELAY: Duration = Duration::from_millis(250);

const FIXED_DT: f32 = 1.0 / 30.0;
const SIMULATED_SECONDS: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Asteroid,
    Particle,
}

struct Live {
    handle: EntityHandle,
    kind: Kind,
}

struct BlackHoleDemo {
    global: PoolManager,
    scene: PoolManager,
    explosion: SpawnPolicy,
    black_hole: EntityHandle,
    live: SlotMap<DefaultKey, Live>,
    spawn_timer: f32,
    explosions: usize,
}

impl BlackHoleDemo {
    fn new(settings: &PoolSettings) -> Self {
        let templates = TemplateLibrary::new()
            .with(
                ASTEROID,
                Entity::new(ASTEROID)
                    .with_aspect(Asteroid::default())
                    .with_aspect(Body3D::default()),
            )
            .with(
                PARTICLE,
                Entity::new(PARTICLE)
                    .with_aspect(TimeToLive::default())
                    .with_aspect(Body3D::default()),
            );

        let global = PoolManager::from_settings(PoolScope::Global, settings, &templates);
        let scene = PoolManager::new(PoolScope::Scene);

        if let Some(asteroid) = templates.get(ASTEROID) {
            if let Err(e) = scene.register(ASTEROID, asteroid, PoolingStrategy::GROW, 60) {
                log::error!("Failed to register asteroid pool: {}", e);
            }
        }

        let half_pi = 0.5 * PI;
        let spread = 0.05 * PI;
        let explosion = SpawnPolicyBuilder::new()
            .center(Vec3::zeros())
            .spawn_in_circle_limited(
                0.5,
                Plane::XZ,
                vec![(-spread - half_pi, spread - half_pi), (-spread + half_pi, spread + half_pi)],
            )
            .velocity_away(5.0)
            .build();

        let black_hole = global.spawn_empty(&SpawnParams::new());
        black_hole.lock().name = "BlackHole".to_string();

        Self {
            global,
            scene,
            explosion,
            black_hole,
            live: SlotMap::new(),
            spawn_timer: 0.0,
            explosions: 0,
        }
    }

    fn ring_position(min_radius: f32) -> Vec3 {
        let mut rng = rand::thread_rng();
        let mut x = rng.gen_range(min_radius..SPAWN_RADIUS);
        let mut z = rng.gen_range(min_radius..SPAWN_RADIUS);
        if rng.gen_bool(0.5) {
            x = -x;
        }
        if rng.gen_bool(0.5) {
            z = -z;
        }
        Vec3::new(x, 0.0, z)
    }

    fn spawn_asteroid(&mut self, min_radius: f32) {
        let params = SpawnParams::new().at(Self::ring_position(min_radius));
        if let Some(handle) = self.scene.spawn(ASTEROID, &params) {
            self.live.insert(Live {
                handle,
                kind: Kind::Asteroid,
            });
        }
    }

    fn start(&mut self) {
        for _ in 0..START_SPAWN_COUNT {
            self.spawn_asteroid(START_MIN_RADIUS);
        }
        log::info!("Spawned {} asteroids", START_SPAWN_COUNT);
    }

    fn update(&mut self, dt: f32) {
        self.spawn_timer += dt;
        while self.spawn_timer >= SPAWN_INTERVAL {
            self.spawn_timer -= SPAWN_INTERVAL;
            self.spawn_asteroid(SPAWN_MIN_RADIUS);
        }

        let center = self.black_hole.lock().transform.position;
        let mut exploding = Vec::new();
        let mut expired = Vec::new();
        let mut strays = Vec::new();

        for (key, live) in &self.live {
            let mut entity = live.handle.lock();
            match live.kind {
                Kind::Asteroid => {
                    let position = entity.transform.position;
                    entity.transform.position = position + gravity_step(center, position, dt);

                    let offset = entity.transform.position - center;
                    let Some(asteroid) = entity.aspect_mut::<Asteroid>() else {
                        continue;
                    };
                    let close = offset.norm() < asteroid.explode_distance
                        && (offset.x.abs() < 1.0 || offset.z.abs() < 1.0);
                    if close && !asteroid.exploded {
                        asteroid.exploded = true;
                        exploding.push(key);
                    }
                }
                Kind::Particle => {
                    let velocity = entity.aspect::<Body3D>().map_or_else(Vec3::zeros, |b| b.velocity);
                    entity.transform.position += velocity * dt;

                    if (entity.transform.position - center).norm() > GRAVITY_RANGE {
                        strays.push(key);
                    } else if entity.aspect_mut::<TimeToLive>().is_some_and(|t| t.tick(dt)) {
                        expired.push(key);
                    }
                }
            }
        }

        for key in exploding {
            self.explode(key);
        }

        for key in expired {
            if let Some(live) = self.live.remove(key) {
                self.global.despawn(&live.handle, None);
            }
        }

        for key in strays {
            if let Some(live) = self.live.remove(key) {
                self.global.despawn_after(&live.handle, None, STRAY_DESPAWN_DELAY);
            }
        }
    }

    fn explode(&mut self, key: DefaultKey) {
        let params = SpawnParams::new().with_policy(&self.explosion);
        for _ in 0..BURSTS {
            for handle in self
                .global
                .spawn_many(PARTICLE, PARTICLES_PER_BURST, &params)
                .into_iter()
                .flatten()
            {
                self.live.insert(Live {
                    handle,
                    kind: Kind::Particle,
                });
            }
        }

        if let Some(live) = self.live.remove(key) {
            self.scene.despawn(&live.handle, None);
        }
        self.explosions += 1;
        log::debug!("Asteroid exploded ({} so far)", self.explosions);
    }

    fn report(&self) {
        let asteroids = self.live.values().filter(|l| l.kind == Kind::Asteroid).count();
        log::info!(
            "{} explosions, {} asteroids and {} particles alive",
            self.explosions,
            asteroids,
            self.live.len() - asteroids
        );
        for stats in [self.scene.stats(ASTEROID), self.global.stats(PARTICLE)]
            .into_iter()
            .flatten()
        {
            log::info!("{}", stats);
        }
        log::info!("{}", self.global.empty_stats());
    }

    fn finish(self) {
        self.report();
        self.global.despawn(&self.black_hole, None);
        self.scene.shutdown();
        self.global.shutdown();
    }
}

/// Displacement towards `center` with an orbital component, kept in the XZ plane
fn gravity_step(center: Vec3, position: Vec3, dt: f32) -> Vec3 {
    let to_center = center - position;
    if to_center.norm() > GRAVITY_RANGE {
        return Vec3::zeros();
    }

    let direction = normalize_or_zero(to_center);
    let orbital = normalize_or_zero(direction.cross(&Vec3::y()));
    let step = normalize_or_zero(direction / 5.0 + orbital) * dt * GRAVITY_STRENGTH;
    Vec3::new(step.x, 0.0, step.z)
}

fn load_settings() -> PoolSettings {
    let Some(path) = std::env::args().nth(1) else {
        return PoolSettings {
            startup: vec![StartupPool {
                strategy: Some(PoolingStrategy::FILL | PoolingStrategy::GROW),
                initial_size: Some(150),
                ..StartupPool::new(PARTICLE, PARTICLE)
            }],
            ..PoolSettings::default()
        };
    };

    match PoolSettings::load_from_file(&path).and_then(|s| s.validate().map(|()| s)) {
        Ok(settings) => {
            log::info!("Loaded pool settings from {}", path);
            settings
        }
        Err(e) => {
            log::warn!("Ignoring pool settings {}: {}", path, e);
            PoolSettings::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting black hole demo");

    let settings = load_settings();
    let mut demo = BlackHoleDemo::new(&settings);
    demo.start();

    let frames = (SIMULATED_SECONDS / FIXED_DT) as usize;
    for frame in 0..frames {
        demo.update(FIXED_DT);
        if frame % 300 == 0 {
            demo.report();
        }
    }

    std::thread::sleep(STRAY_DESPAWN_DELAY * 2);
    demo.finish();
    log::info!("Black hole demo finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_stays_in_plane() {
        let step = gravity_step(Vec3::zeros(), Vec3::new(10.0, 3.0, -4.0), 0.1);
        assert_eq!(step.y, 0.0);
        assert!(step.norm() > 0.0);
    }

    #[test]
    fn test_gravity_pulls_inward() {
        let position = Vec3::new(10.0, 0.0, 0.0);
        let step = gravity_step(Vec3::zeros(), position, 0.1);
        assert!((position + step).norm() < position.norm() + 1e-3);
        assert!(step.x < 0.0);
    }

    #[test]
    fn test_gravity_at_center_is_finite() {
        let step = gravity_step(Vec3::zeros(), Vec3::zeros(), 0.1);
        assert_eq!(step, Vec3::zeros());
    }

    #[test]
    fn test_gravity_on_vertical_axis_is_finite() {
        let step = gravity_step(Vec3::zeros(), Vec3::new(0.0, 4.0, 0.0), 0.1);
        assert!(step.iter().all(|c| c.is_finite()));
        assert_eq!(step, Vec3::zeros());
    }

    #[test]
    fn test_gravity_ignores_far_bodies() {
        let step = gravity_step(Vec3::zeros(), Vec3::new(100.0, 0.0, 0.0), 0.1);
        assert_eq!(step, Vec3::zeros());
    }

    #[test]
    fn test_ring_position_within_bounds() {
        for _ in 0..200 {
            let p = BlackHoleDemo::ring_position(SPAWN_MIN_RADIUS);
            assert_eq!(p.y, 0.0);
            assert!((SPAWN_MIN_RADIUS..SPAWN_RADIUS).contains(&p.x.abs()));
            assert!((SPAWN_MIN_RADIUS..SPAWN_RADIUS).contains(&p.z.abs()));
        }
    }

    #[test]
    fn test_explosion_returns_asteroid_and_spawns_particles() {
        let mut demo = BlackHoleDemo::new(&PoolSettings {
            startup: vec![StartupPool::new(PARTICLE, PARTICLE)],
            ..PoolSettings::default()
        });

        let handle = demo.scene.spawn(ASTEROID, &SpawnParams::new()).unwrap();
        let key = demo.live.insert(Live {
            handle,
            kind: Kind::Asteroid,
        });
        demo.explode(key);

        let particles = demo.live.values().filter(|l| l.kind == Kind::Particle).count();
        assert_eq!(particles, BURSTS * PARTICLES_PER_BURST);
        assert_eq!(demo.scene.stats(ASTEROID).unwrap().idle, 1);
        assert_eq!(demo.explosions, 1);
    }
}
