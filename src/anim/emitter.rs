//! Rate-controlled particle emitter
//!
//! Spawns are driven by a time accumulator: `spawn_rate * dt` is added every
//! update and each whole unit becomes one spawn. Spawns that find the pool
//! exhausted are dropped, not queued, which keeps memory bounded at the cost
//! of exact timing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::particle::FlameParticle;
use super::pool::ObjectPool;

/// Horizontal spawn jitter (total width, centred on the spawn point)
const SPAWN_JITTER_X: f32 = 28.0;
/// Upward spawn jitter
const SPAWN_JITTER_Y: f32 = 8.0;

/// What happened during one emitter update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Particles acquired and reset this update
    pub spawned: u32,
    /// Whole spawns discarded because the pool was exhausted
    pub dropped: u32,
    /// Particles that finished and went back to the pool
    pub retired: u32,
}

/// Flame emitter backed by a fixed particle pool
pub struct ParticleEmitter {
    pool: ObjectPool<FlameParticle>,
    spawn_rate: f32,
    spawn_accumulator: f32,
    spawn_point: Vec2,
    wobble: bool,
    rng: Pcg32,
    /// Lifetime totals
    total_spawned: u64,
    total_dropped: u64,
}

impl ParticleEmitter {
    pub fn new(capacity: usize, spawn_rate: f32, seed: u64) -> Self {
        Self {
            pool: ObjectPool::build(capacity, |_| FlameParticle::default()),
            spawn_rate: spawn_rate.max(0.0),
            spawn_accumulator: 0.0,
            spawn_point: Vec2::ZERO,
            wobble: true,
            rng: Pcg32::seed_from_u64(seed),
            total_spawned: 0,
            total_dropped: 0,
        }
    }

    /// Enable or disable lateral wobble on future spawns
    pub fn set_wobble(&mut self, wobble: bool) {
        self.wobble = wobble;
    }

    pub fn set_spawn_point(&mut self, point: Vec2) {
        self.spawn_point = point;
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    pub fn spawn_rate(&self) -> f32 {
        self.spawn_rate
    }

    pub fn pool(&self) -> &ObjectPool<FlameParticle> {
        &self.pool
    }

    /// Currently simulated particles
    pub fn active_particles(&self) -> impl Iterator<Item = &FlameParticle> {
        self.pool.iter_active()
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    /// Advance by `dt` seconds: spawn from the accumulator, then simulate and
    /// retire active particles.
    pub fn update(&mut self, dt: f32) -> EmitStats {
        let mut stats = EmitStats::default();
        self.spawn_accumulator += dt.max(0.0) * self.spawn_rate;

        while self.spawn_accumulator >= 1.0 {
            let Some(handle) = self.pool.acquire() else {
                break;
            };
            self.spawn_accumulator -= 1.0;

            let jitter = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * SPAWN_JITTER_X,
                -self.rng.random::<f32>() * SPAWN_JITTER_Y,
            );
            let origin = self.spawn_point + jitter;
            let wobble = self.wobble;
            if let Some(particle) = self.pool.get_mut(handle) {
                particle.reset(origin, &mut self.rng, wobble);
            }
            stats.spawned += 1;
        }

        // Pool exhausted: discard the backlog instead of queueing it
        if self.spawn_accumulator >= 1.0 {
            let backlog = self.spawn_accumulator.floor();
            self.spawn_accumulator -= backlog;
            stats.dropped = backlog as u32;
            log::debug!("Particle pool exhausted, dropped {} spawns", stats.dropped);
        }

        stats.retired = self.pool.retain_active(|particle| {
            let finished = particle.update(dt);
            if finished {
                particle.deactivate();
            }
            !finished
        }) as u32;

        self.total_spawned += u64::from(stats.spawned);
        self.total_dropped += u64::from(stats.dropped);
        stats
    }

    /// Move the spawn point for a new scene size and re-seat live particles there
    pub fn resize(&mut self, width: f32, height: f32) {
        self.spawn_point = Vec2::new(width * 0.5, height * 0.8);
        let origin = self.spawn_point;
        let wobble = self.wobble;
        let rng = &mut self.rng;
        self.pool.for_each_active_mut(|particle| particle.reset(origin, rng, wobble));
    }

    /// Return every particle to the pool and clear the accumulator
    pub fn clear(&mut self) {
        self.pool.for_each_active_mut(FlameParticle::deactivate);
        self.pool.release_all();
        self.spawn_accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exhausted_pool_drops_extra_spawns() {
        // Capacity 3 receives 5 spawn requests in one step
        let mut emitter = ParticleEmitter::new(3, 50.0, 1);
        let stats = emitter.update(0.1);
        assert_eq!(stats.spawned, 3);
        assert_eq!(stats.dropped, 2);
        assert_eq!(emitter.pool().active_count(), 3);

        // Dropped spawns are gone, not queued for the next frame
        let stats = emitter.update(0.0);
        assert_eq!(stats.spawned, 0);
    }

    #[test]
    fn test_particles_return_to_pool() {
        let mut emitter = ParticleEmitter::new(4, 10.0, 2);
        emitter.update(0.25);
        assert!(emitter.pool().active_count() > 0);

        // Longest lifetime is 1.6s; stop spawning and run past it
        emitter.spawn_rate = 0.0;
        for _ in 0..120 {
            emitter.update(1.0 / 60.0);
        }
        assert_eq!(emitter.pool().active_count(), 0);
        assert_eq!(emitter.pool().idle_count(), 4);
        assert!(emitter.pool().items().iter().all(|p| !p.active && p.alpha == 0.0));
    }

    #[test]
    fn test_spawn_jitter_around_point() {
        let mut emitter = ParticleEmitter::new(10, 1000.0, 3);
        emitter.set_spawn_point(Vec2::new(400.0, 480.0));
        emitter.set_wobble(false);
        // A tiny step so particles barely move after spawning
        emitter.update(0.01);
        for p in emitter.active_particles() {
            assert!((p.position.x - 400.0).abs() <= 14.0 + 1.0);
            assert!(p.position.y <= 480.0 + 0.1 && p.position.y >= 480.0 - 8.0 - 3.0);
        }
    }

    #[test]
    fn test_resize_moves_spawn_point() {
        let mut emitter = ParticleEmitter::new(5, 100.0, 4);
        emitter.update(0.05);
        emitter.resize(1000.0, 500.0);
        assert_eq!(emitter.spawn_point(), Vec2::new(500.0, 400.0));
        for p in emitter.active_particles() {
            assert_eq!(p.position, Vec2::new(500.0, 400.0));
            assert_eq!(p.age, 0.0);
        }
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut emitter = ParticleEmitter::new(5, 100.0, 5);
        emitter.update(0.05);
        emitter.clear();
        assert_eq!(emitter.pool().active_count(), 0);
        assert_eq!(emitter.update(0.0), EmitStats::default());
    }

    proptest! {
        #[test]
        fn prop_spawn_count_tracks_rate(rate in 1.0f32..60.0, frames in prop::collection::vec(0.0f32..0.05, 1..200)) {
            // Capacity large enough that nothing is ever dropped
            let mut emitter = ParticleEmitter::new(512, rate, 9);
            let mut elapsed = 0.0f32;
            for dt in frames {
                emitter.update(dt);
                elapsed += dt;
                prop_assert_eq!(emitter.pool().idle_count() + emitter.pool().active_count(), 512);
            }
            let expected = (rate * elapsed).floor() as i64;
            let spawned = emitter.total_spawned() as i64;
            prop_assert!((spawned - expected).abs() <= 1, "spawned {} expected {}", spawned, expected);
            prop_assert_eq!(emitter.total_dropped(), 0);
        }

        #[test]
        fn prop_small_pool_never_overflows(capacity in 0usize..8, rate in 1.0f32..500.0, steps in 1usize..100) {
            let mut emitter = ParticleEmitter::new(capacity, rate, 11);
            for _ in 0..steps {
                let stats = emitter.update(1.0 / 60.0);
                prop_assert!(stats.spawned as usize <= capacity);
                prop_assert_eq!(emitter.pool().idle_count() + emitter.pool().active_count(), capacity);
            }
        }
    }
}
