//! Triptych - animation and layout core for a three-scene presentation
//!
//! Core modules:
//! - `anim`: Easing, tweens, object pool, flame particles, card stack mover
//! - `scroll`: Drag/wheel scroll state with clamped bounds and thumb geometry
//! - `rich`: Async, version-guarded rich text (text + inline image) layout
//! - `board`: Dialogue board wiring content, layout and scrolling together
//! - `scene`: Per-frame host hook implemented by the three scenes
//! - `settings`: Data-driven tuning and quality presets

pub mod anim;
pub mod board;
pub mod error;
pub mod rich;
pub mod scene;
pub mod scroll;
pub mod settings;

pub use error::{Error, Result};
pub use settings::{QualityPreset, Settings};

/// Presentation configuration constants
pub mod consts {
    /// Host frame units per second (the render loop reports deltas in 60 Hz frames)
    pub const FRAMES_PER_SECOND: f32 = 60.0;
    /// Largest frame delta accepted in one update, in seconds (tab switches, debugger stops)
    pub const MAX_FRAME_SECONDS: f32 = 0.25;

    /// Flame particles
    pub const FLAME_BASE_SIZE: f32 = 24.0;
    pub const FLAME_SPAWN_PER_SECOND: f32 = 24.0;
    /// Buoyancy pulling flames upward (pixels/s²)
    pub const FLAME_BUOYANCY: f32 = 60.0;

    /// Card stacks
    pub const CARD_COUNT: usize = 144;
    pub const CARD_VISIBLE_DEPTH: usize = 15;
    pub const CARD_STACK_STEP: f32 = 2.0;

    /// Rich text
    pub const LINE_HEIGHT: f32 = 28.0;
    pub const EMOJI_SIZE: f32 = 24.0;
    pub const EMOJI_GAP: f32 = 4.0;

    /// Scrolling
    pub const WHEEL_LINE_PX: f32 = 16.0;
    pub const WHEEL_PAGE_FRACTION: f32 = 0.9;
    pub const MIN_THUMB_HEIGHT: f32 = 34.0;
}

/// Convert a host frame delta (60 units per second) into seconds
#[inline]
pub fn frames_to_seconds(delta_frames: f32) -> f32 {
    (delta_frames.max(0.0) / consts::FRAMES_PER_SECOND).min(consts::MAX_FRAME_SECONDS)
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
