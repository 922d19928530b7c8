//! Frame-driven animation primitives
//!
//! Everything here is synchronous and allocation-free per frame:
//! - Fixed-capacity pools, never grown after build
//! - Explicit tickers instead of ambient timers
//! - Tweens own their completion payloads instead of boxed callbacks

pub mod easing;
pub mod emitter;
pub mod particle;
pub mod pool;
pub mod stacks;
pub mod ticker;
pub mod tween;

pub use easing::Easing;
pub use emitter::{EmitStats, ParticleEmitter};
pub use particle::FlameParticle;
pub use pool::{ObjectPool, PoolHandle};
pub use stacks::{ItemId, MoverConfig, MoverState, StackSlot, StackedItemMover};
pub use ticker::IntervalTicker;
pub use tween::{Interpolate, TransitionTask, TweenScheduler};
