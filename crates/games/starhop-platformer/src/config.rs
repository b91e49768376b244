use serde::{Deserialize, Serialize};

use crate::level::ENEMY_SPEED;
use crate::physics::{
    AIR_DRAG, COYOTE_TIME, DASH_FALL_CAP, GRAVITY, GROUND_FRICTION, INVULN_TIME, JUMP_BUFFER_TIME,
    KNOCKBACK_X, KNOCKBACK_Y, MAX_FALL_SPEED, PLAYER_HEIGHT, PLAYER_WIDTH, RUN_BLEND, RUN_SPEED,
    STOMP_BOUNCE, STOMP_WINDOW,
};

/// Player movement tuning shared by every character preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub run_speed: f32,
    /// Fraction of the gap to the target run speed closed each tick.
    pub run_blend: f32,
    pub ground_friction: f32,
    pub air_drag: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    /// Largest downward speed kept when a dash starts.
    pub dash_fall_cap: f32,
    pub invuln_time: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub stomp_bounce: f32,
    /// How far the player's feet may sink below an enemy's top and still stomp.
    pub stomp_window: f32,
    pub player_width: f32,
    pub player_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            run_speed: RUN_SPEED,
            run_blend: RUN_BLEND,
            ground_friction: GROUND_FRICTION,
            air_drag: AIR_DRAG,
            coyote_time: COYOTE_TIME,
            jump_buffer_time: JUMP_BUFFER_TIME,
            dash_fall_cap: DASH_FALL_CAP,
            invuln_time: INVULN_TIME,
            knockback_x: KNOCKBACK_X,
            knockback_y: KNOCKBACK_Y,
            stomp_bounce: STOMP_BOUNCE,
            stomp_window: STOMP_WINDOW,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
        }
    }
}

/// Per-character jump and dash tuning, cycled with the switch button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterPreset {
    pub jump_velocity: f32,
    pub dash_speed: f32,
    pub dash_time: f32,
}

impl CharacterPreset {
    pub const NIMBLE: CharacterPreset = CharacterPreset {
        jump_velocity: 780.0,
        dash_speed: 520.0,
        dash_time: 0.14,
    };
    pub const SWIFT: CharacterPreset = CharacterPreset {
        jump_velocity: 740.0,
        dash_speed: 640.0,
        dash_time: 0.12,
    };
}

impl Default for CharacterPreset {
    fn default() -> Self {
        Self::NIMBLE
    }
}

/// Patrol enemy tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    /// Look-ahead distance past the leading edge for walls and ledges.
    pub probe_distance: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: ENEMY_SPEED,
            probe_distance: 2.0,
        }
    }
}

/// Top-level session configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub physics: PhysicsConfig,
    pub presets: Vec<CharacterPreset>,
    pub enemy: EnemyConfig,
    /// Longest frame the simulation will integrate in one update (seconds).
    pub max_frame_dt: f32,
    /// Player integration substeps per frame.
    pub substeps: u32,
    pub view_width: f32,
    pub view_height: f32,
    pub hearts_to_win: u32,
    /// Seed for enemy directions. `None` picks one at session start.
    pub seed: Option<u64>,
    /// TOML level file. `None` uses the built-in level.
    pub level_path: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            presets: vec![CharacterPreset::NIMBLE, CharacterPreset::SWIFT],
            enemy: EnemyConfig::default(),
            max_frame_dt: 1.0 / 30.0,
            substeps: 1,
            view_width: 960.0,
            view_height: 540.0,
            hearts_to_win: 5,
            seed: None,
            level_path: None,
        }
    }
}

impl SessionConfig {
    /// Load config from `STARHOP_CONFIG` or `config/starhop.toml`. Falls back
    /// to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path =
            std::env::var("STARHOP_CONFIG").unwrap_or_else(|_| "config/starhop.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                SessionConfig::default()
            }),
            Err(_) => SessionConfig::default(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Preset for a character index. An empty preset list falls back to
    /// the default character.
    pub fn preset(&self, index: usize) -> CharacterPreset {
        self.presets.get(index).copied().unwrap_or_default()
    }

    pub fn character_count(&self) -> usize {
        self.presets.len().max(1)
    }
}
