//! Flame particle simulation
//!
//! Particles are allocated once by the emitter's pool and re-seeded with
//! `reset` on every spawn. Visual state (alpha, size, tint) is recomputed
//! each update from lifetime progress.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::consts::{FLAME_BASE_SIZE, FLAME_BUOYANCY};

/// Spawn tints, picked per particle
pub const FLAME_COLORS: [u32; 3] = [0xffa500, 0xff4500, 0xffd700];

/// Fraction of the lifetime spent fading in
const FADE_IN_FRACTION: f32 = 0.12;
/// Exponent of the fade-out curve on remaining lifetime
const FADE_OUT_POWER: f32 = 1.6;

/// Gradient breakpoints: (progress, tint, size factor).
/// The first tint is replaced by the particle's spawn tint.
const GRADIENT: [(f32, u32, f32); 4] = [
    (0.0, 0xffd700, 1.0),
    (0.35, 0xff8c00, 0.95),
    (0.7, 0xff4500, 0.8),
    (1.0, 0x3a0a00, 0.55),
];

/// A single pooled flame particle
#[derive(Debug, Clone)]
pub struct FlameParticle {
    /// Rendered position (integrated position plus wobble)
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub initial_alpha: f32,
    pub initial_scale: Vec2,
    pub active: bool,
    /// Current opacity (0 when inactive)
    pub alpha: f32,
    /// Current rendered size in pixels
    pub size: Vec2,
    /// Current tint (0xRRGGBB)
    pub tint: u32,
    spawn_tint: u32,
    /// Position without the lateral wobble
    drift: Vec2,
    wobble_amplitude: f32,
    wobble_frequency: f32,
    wobble_phase: f32,
}

impl Default for FlameParticle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            age: 0.0,
            lifetime: 1.0,
            initial_alpha: 1.0,
            initial_scale: Vec2::ONE,
            active: false,
            alpha: 0.0,
            size: Vec2::splat(FLAME_BASE_SIZE),
            tint: FLAME_COLORS[0],
            spawn_tint: FLAME_COLORS[0],
            drift: Vec2::ZERO,
            wobble_amplitude: 0.0,
            wobble_frequency: 0.0,
            wobble_phase: 0.0,
        }
    }
}

impl FlameParticle {
    /// Re-seed the particle at `position` and mark it active
    pub fn reset(&mut self, position: Vec2, rng: &mut impl Rng, wobble: bool) {
        self.drift = position;
        self.position = position;
        self.spawn_tint = FLAME_COLORS[rng.random_range(0..FLAME_COLORS.len())];
        self.tint = self.spawn_tint;

        let scale = rng.random_range(0.8..1.8);
        self.initial_scale = Vec2::splat(scale);
        self.initial_alpha = rng.random_range(0.6..1.0);
        self.velocity = Vec2::new(rng.random_range(-24.0..24.0), -rng.random_range(80.0..220.0));
        self.lifetime = rng.random_range(0.8..1.6);
        self.age = 0.0;

        if wobble {
            self.wobble_amplitude = rng.random_range(4.0..10.0);
            self.wobble_frequency = rng.random_range(6.0..11.0);
            self.wobble_phase = rng.random_range(0.0..std::f32::consts::TAU);
        } else {
            self.wobble_amplitude = 0.0;
        }

        self.size = FLAME_BASE_SIZE * self.initial_scale;
        // Fade-in starts from zero
        self.alpha = 0.0;
        self.active = true;
    }

    /// Advance the simulation. Returns true when the particle has finished.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.active {
            return true;
        }

        self.age = (self.age + dt.max(0.0)).min(self.lifetime);
        let progress = self.progress();

        // Hot air rises: accelerate upward (screen y grows downward)
        self.velocity.y -= FLAME_BUOYANCY * dt;
        self.drift += self.velocity * dt;

        // Lateral wobble fades out with remaining lifetime
        let remaining = 1.0 - progress;
        let sway = self.wobble_amplitude
            * remaining
            * (self.wobble_phase + self.age * self.wobble_frequency).sin();
        self.position = self.drift + Vec2::new(sway, 0.0);

        let fade_in = (progress / FADE_IN_FRACTION).min(1.0);
        let fade_out = remaining.powf(FADE_OUT_POWER);
        self.alpha = self.initial_alpha * fade_in * fade_out;

        let (tint, size_factor) = gradient_at(self.spawn_tint, progress);
        self.tint = tint;
        self.size = FLAME_BASE_SIZE * self.initial_scale * size_factor;

        self.age >= self.lifetime
    }

    /// Hide the particle and exclude it from simulation
    pub fn deactivate(&mut self) {
        self.active = false;
        self.alpha = 0.0;
    }

    /// Lifetime progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }
}

/// Sample the flame gradient: tint and size factor at `progress`
pub fn gradient_at(spawn_tint: u32, progress: f32) -> (u32, f32) {
    let progress = progress.clamp(0.0, 1.0);
    for pair in GRADIENT.windows(2) {
        let (p0, mut c0, s0) = pair[0];
        let (p1, c1, s1) = pair[1];
        if progress <= p1 {
            if p0 == 0.0 {
                c0 = spawn_tint;
            }
            let t = (progress - p0) / (p1 - p0);
            return (lerp_rgb(c0, c1, t), crate::lerp(s0, s1, t));
        }
    }
    let (_, c, s) = GRADIENT[GRADIENT.len() - 1];
    (c, s)
}

/// Linear interpolation between two 0xRRGGBB colours
pub fn lerp_rgb(a: u32, b: u32, t: f32) -> u32 {
    let a = rgb_to_vec(a);
    let b = rgb_to_vec(b);
    let c = a.lerp(b, t.clamp(0.0, 1.0)).round();
    ((c.x as u32) << 16) | ((c.y as u32) << 8) | (c.z as u32)
}

fn rgb_to_vec(c: u32) -> Vec3 {
    Vec3::new(
        ((c >> 16) & 0xff) as f32,
        ((c >> 8) & 0xff) as f32,
        (c & 0xff) as f32,
    )
}
