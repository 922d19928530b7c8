//! Presentation settings and quality presets
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::anim::{Easing, MoverConfig};
use crate::anim::stacks::grid_positions;
use crate::anim::ticker::MIN_INTERVAL;
use crate::consts::{CARD_COUNT, CARD_STACK_STEP, CARD_VISIBLE_DEPTH, FLAME_SPAWN_PER_SECOND};
use crate::error::Result;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Flame pool capacity for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 10,
            QualityPreset::High => 24,
        }
    }

    /// Spawn rate multiplier (1.0 = configured rate)
    pub fn spawn_multiplier(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }
}

/// Flame scene tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameSettings {
    pub spawn_per_second: f32,
    /// Particle rendering on/off
    pub particles: bool,
    /// RNG seed (same seed, same flame)
    pub seed: u64,
}

impl Default for FlameSettings {
    fn default() -> Self {
        Self {
            spawn_per_second: FLAME_SPAWN_PER_SECOND,
            particles: true,
            seed: 0x5eed,
        }
    }
}

/// Card scene tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    pub item_count: usize,
    pub columns: usize,
    pub rows: usize,
    /// Distance between slot centres
    pub spacing: Vec2,
    pub interval_secs: f32,
    pub move_secs: f32,
    pub visible_depth: usize,
    pub easing: Easing,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            item_count: CARD_COUNT,
            columns: 3,
            rows: 2,
            spacing: Vec2::new(220.0, 260.0),
            interval_secs: 1.0,
            move_secs: 2.0,
            visible_depth: CARD_VISIBLE_DEPTH,
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Dialogue scene tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueSettings {
    /// Emoji shown for references the document does not define
    pub default_emoji: Option<String>,
}

/// Presentation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    pub flame: FlameSettings,
    pub cards: CardSettings,
    pub dialogue: DialogueSettings,

    // === Accessibility ===
    /// Reduced motion (no flame wobble, card moves snap)
    pub reduced_motion: bool,
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective flame pool capacity
    pub fn flame_capacity(&self) -> usize {
        if !self.flame.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective spawns per second
    pub fn flame_spawn_rate(&self) -> f32 {
        self.flame.spawn_per_second.max(0.0) * self.quality.spawn_multiplier()
    }

    /// Effective flame wobble (respects reduced_motion)
    pub fn effective_wobble(&self) -> bool {
        !self.reduced_motion
    }

    /// Card mover configuration derived from these settings
    pub fn mover_config(&self) -> MoverConfig {
        let cards = &self.cards;
        let columns = cards.columns.max(1);
        let rows = cards.rows.max(1);
        let slots = columns * rows;
        // A lone slot has nowhere to send cards; fall back to a pair
        let (columns, rows) = if slots < 2 { (2, 1) } else { (columns, rows) };

        MoverConfig {
            item_count: cards.item_count,
            slot_positions: grid_positions(columns, rows, cards.spacing),
            source_slot: 0,
            interval: if cards.interval_secs >= MIN_INTERVAL { cards.interval_secs } else { MIN_INTERVAL },
            move_duration: if self.reduced_motion { 0.0 } else { cards.move_secs },
            easing: cards.easing,
            visible_depth: cards.visible_depth,
            stack_step: Vec2::new(0.0, -CARD_STACK_STEP),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path` if given, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Could not load settings from {}: {}; using defaults", path.display(), err);
                Self::default()
            }
        }
    }
}
