//! Scene hook for the host render loop
//!
//! The host owns routing and calls into whichever scene is active. Frame
//! deltas arrive in host frame units (60 per second) and are converted here.

use std::rc::Rc;

use glam::Vec2;

use crate::anim::{FlameParticle, ItemId, MoverState, ParticleEmitter, StackedItemMover};
use crate::board::DialogueBoard;
use crate::frames_to_seconds;
use crate::settings::Settings;

/// Lifecycle and per-frame hooks; all optional
pub trait Scene {
    fn name(&self) -> &'static str;

    /// Scene became active
    fn on_enter(&mut self) {}

    /// Scene is about to be replaced
    fn on_exit(&mut self) {}

    fn resize(&mut self, _width: f32, _height: f32) {}

    /// Advance by `delta_frames` host frames
    fn update(&mut self, _delta_frames: f32) {}
}

/// Rising flame built from pooled particles
pub struct PhoenixFlameScene {
    emitter: ParticleEmitter,
    size: Vec2,
}

impl PhoenixFlameScene {
    pub fn new(settings: &Settings) -> Self {
        let mut emitter = ParticleEmitter::new(
            settings.flame_capacity(),
            settings.flame_spawn_rate(),
            settings.flame.seed,
        );
        emitter.set_wobble(settings.effective_wobble());
        Self {
            emitter,
            size: Vec2::ZERO,
        }
    }

    pub fn emitter(&self) -> &ParticleEmitter {
        &self.emitter
    }

    /// Live particles in draw order
    pub fn particles(&self) -> impl Iterator<Item = &FlameParticle> {
        self.emitter.active_particles()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

impl Scene for PhoenixFlameScene {
    fn name(&self) -> &'static str {
        "phoenix-flame"
    }

    fn on_exit(&mut self) {
        self.emitter.clear();
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.emitter.resize(width, height);
    }

    fn update(&mut self, delta_frames: f32) {
        self.emitter.update(frames_to_seconds(delta_frames));
    }
}

/// Card stacks shuffled one card per interval
pub struct AceOfShadowsScene {
    mover: StackedItemMover,
    origin: Vec2,
}

impl AceOfShadowsScene {
    pub fn new(settings: &Settings) -> Self {
        Self {
            mover: StackedItemMover::new(settings.mover_config()),
            origin: Vec2::ZERO,
        }
    }

    /// Start button
    pub fn start(&mut self) {
        self.mover.start();
    }

    /// Reset button
    pub fn reset(&mut self) {
        self.mover.reset();
    }

    pub fn state(&self) -> MoverState {
        self.mover.state()
    }

    pub fn mover(&self) -> &StackedItemMover {
        &self.mover
    }

    pub fn counter_label(&self) -> String {
        self.mover.counter_label()
    }

    /// Board centre in scene coordinates
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Cards in draw order, in scene coordinates
    pub fn draw_list(&self) -> Vec<(ItemId, Vec2)> {
        self.mover
            .draw_list()
            .into_iter()
            .map(|(id, pos)| (id, self.origin + pos))
            .collect()
    }
}

impl Scene for AceOfShadowsScene {
    fn name(&self) -> &'static str {
        "ace-of-shadows"
    }

    fn on_exit(&mut self) {
        self.mover.reset();
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.origin = Vec2::new(width, height) * 0.5;
    }

    fn update(&mut self, delta_frames: f32) {
        self.mover.update(frames_to_seconds(delta_frames));
    }
}

/// Scrollable rich-text dialogue
pub struct MagicWordsScene {
    board: Rc<DialogueBoard>,
    origin: Vec2,
    render_requested: bool,
}

impl MagicWordsScene {
    pub fn new(board: Rc<DialogueBoard>) -> Self {
        Self {
            board,
            origin: Vec2::ZERO,
            render_requested: false,
        }
    }

    pub fn board(&self) -> &Rc<DialogueBoard> {
        &self.board
    }

    /// Board centre in scene coordinates
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Whether a resize asked for a fresh render; clears the request.
    /// The host runs `board().render_dialogue()` on its executor when true.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }
}

impl Scene for MagicWordsScene {
    fn name(&self) -> &'static str {
        "magic-words"
    }

    fn on_exit(&mut self) {
        self.board.pointer_cancel();
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.origin = Vec2::new(width, height) * 0.5;
        if self.board.resize(width, height, None, None) {
            self.render_requested = true;
        }
    }
}
