use serde::{Deserialize, Serialize};

use starhop_core::events::SessionEvent;
use starhop_core::input::InputSnapshot;

use crate::collision::{Axis, Rect, SKIN, Side, resolve_axis};
use crate::config::{CharacterPreset, PhysicsConfig, SessionConfig};
use crate::level::{CellKind, TileGrid};

/// Gravity acceleration (units/s^2, +y is down).
pub const GRAVITY: f32 = 2200.0;
/// Terminal fall speed.
pub const MAX_FALL_SPEED: f32 = 1400.0;
/// Target horizontal speed under full input.
pub const RUN_SPEED: f32 = 300.0;
/// Per-tick interpolation factor toward the target run speed.
pub const RUN_BLEND: f32 = 0.14;
/// Per-tick horizontal damping while grounded.
pub const GROUND_FRICTION: f32 = 0.86;
/// Per-tick horizontal damping while airborne.
pub const AIR_DRAG: f32 = 0.98;
/// Grace window after leaving the ground in which a jump still registers.
pub const COYOTE_TIME: f32 = 0.12;
/// Grace window before landing in which an early jump press is kept.
pub const JUMP_BUFFER_TIME: f32 = 0.14;
/// Downward speed cap applied when a dash starts.
pub const DASH_FALL_CAP: f32 = 60.0;
/// Invulnerability after taking a hit.
pub const INVULN_TIME: f32 = 0.9;
/// Horizontal knockback speed on hurt.
pub const KNOCKBACK_X: f32 = 220.0;
/// Upward knockback speed on hurt.
pub const KNOCKBACK_Y: f32 = 520.0;
/// Upward speed after stomping an enemy.
pub const STOMP_BOUNCE: f32 = 520.0;
/// Vertical tolerance for a stomp.
pub const STOMP_WINDOW: f32 = 16.0;
/// Player width for AABB collision.
pub const PLAYER_WIDTH: f32 = 24.0;
/// Player height for AABB collision.
pub const PLAYER_HEIGHT: f32 = 30.0;

/// Kinematic and ability state of the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    /// Set when the last vertical resolution landed on a tile.
    pub on_ground: bool,
    pub coyote: f32,
    pub jump_buffer: f32,
    /// Remaining dash time; dashing while positive.
    pub dash: f32,
    pub invuln: f32,
    /// Last horizontal facing, -1.0 or 1.0. Also the dash direction.
    pub dash_dir: f32,
    pub hearts: u32,
    pub stars: u32,
    /// Index of the active character preset.
    pub active: usize,
    pub win: bool,
    pub spawn_x: f32,
    pub spawn_y: f32,
}

impl PlayerState {
    /// New player standing in the spawn cell whose top-left is
    /// `(cell_x, cell_y)`, feet resting on the cell bottom.
    pub fn new(cell_x: f32, cell_y: f32, tile_size: f32, physics: &PhysicsConfig) -> Self {
        let w = physics.player_width;
        let h = physics.player_height;
        let spawn_x = cell_x + (tile_size - w) / 2.0;
        let spawn_y = cell_y + tile_size - h - SKIN;
        Self {
            x: spawn_x,
            y: spawn_y,
            w,
            h,
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
            coyote: 0.0,
            jump_buffer: 0.0,
            dash: 0.0,
            invuln: 0.0,
            dash_dir: 1.0,
            hearts: 0,
            stars: 0,
            active: 0,
            win: false,
            spawn_x,
            spawn_y,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn is_dashing(&self) -> bool {
        self.dash > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln > 0.0
    }

    /// Put the player back at the spawn point at rest. Counters are kept.
    pub fn respawn(&mut self) {
        self.x = self.spawn_x;
        self.y = self.spawn_y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.dash = 0.0;
        self.on_ground = false;
    }
}

/// What the player asked for during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub move_dir: f32, // -1 (left), 0, +1 (right)
    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub switch_pressed: bool,
}

impl PlayerIntent {
    pub fn from_snapshot(input: &InputSnapshot) -> Self {
        Self {
            move_dir: input.move_dir(),
            jump_pressed: input.jump_pressed(),
            dash_pressed: input.dash_pressed(),
            switch_pressed: input.switch_pressed(),
        }
    }

    /// The same intent with the one-shot presses removed, for later substeps.
    pub fn held_only(self) -> Self {
        Self {
            move_dir: self.move_dir,
            ..Default::default()
        }
    }
}

/// Advance the player by one tick of `dt` seconds.
pub fn tick_player(
    player: &mut PlayerState,
    intent: &PlayerIntent,
    grid: &TileGrid,
    config: &SessionConfig,
    dt: f32,
    events: &mut Vec<SessionEvent>,
) {
    let physics = &config.physics;

    if intent.switch_pressed {
        player.active = (player.active + 1) % config.character_count();
        player.stars = player.stars.saturating_add(1);
        events.push(SessionEvent::Collect);
    }
    let preset = config.preset(player.active);

    // Horizontal intent (sanitize NaN/Inf, snap to -1/0/1)
    let move_dir = if intent.move_dir.is_finite() && intent.move_dir != 0.0 {
        intent.move_dir.signum()
    } else {
        0.0
    };
    if move_dir != 0.0 {
        player.dash_dir = move_dir;
    }

    if intent.jump_pressed {
        player.jump_buffer = physics.jump_buffer_time;
    } else {
        player.jump_buffer = (player.jump_buffer - dt).max(0.0);
    }
    player.coyote = (player.coyote - dt).max(0.0);

    if intent.dash_pressed && player.dash <= 0.0 && !player.win {
        player.dash = preset.dash_time;
        player.vy = player.vy.min(physics.dash_fall_cap);
        events.push(SessionEvent::Dash);
    }

    if !player.win {
        integrate(player, move_dir, grid, physics, &preset, dt, events);
    }

    player.invuln = (player.invuln - dt).max(0.0);
}

fn integrate(
    player: &mut PlayerState,
    move_dir: f32,
    grid: &TileGrid,
    physics: &PhysicsConfig,
    preset: &CharacterPreset,
    dt: f32,
    events: &mut Vec<SessionEvent>,
) {
    if player.is_dashing() {
        player.dash = (player.dash - dt).max(0.0);
        player.vx = preset.dash_speed * player.dash_dir;
    } else {
        player.vx += (move_dir * physics.run_speed - player.vx) * physics.run_blend;
        player.vx *= if player.on_ground {
            physics.ground_friction
        } else {
            physics.air_drag
        };
    }

    player.vy = (player.vy + physics.gravity * dt).min(physics.max_fall_speed);

    // X first so horizontal motion settles before vertical.
    player.x += player.vx * dt;
    clamp_to_world(player, grid);
    resolve_player_axis(player, grid, physics, Axis::X);
    clamp_to_world(player, grid);

    player.on_ground = false;
    player.y += player.vy * dt;
    clamp_to_world(player, grid);
    resolve_player_axis(player, grid, physics, Axis::Y);
    clamp_to_world(player, grid);

    let foot_blocked = grid
        .tile_at(player.x + player.w / 2.0, player.y + player.h + 1.0)
        .is_blocking();
    let grounded = player.on_ground || player.coyote > 0.0 || foot_blocked;

    if player.jump_buffer > 0.0 && grounded {
        player.jump_buffer = 0.0;
        player.vy = -preset.jump_velocity;
        player.dash = 0.0;
        player.coyote = 0.0;
        player.on_ground = false;
        events.push(SessionEvent::Jump);
    }
}

fn resolve_player_axis(
    player: &mut PlayerState,
    grid: &TileGrid,
    physics: &PhysicsConfig,
    axis: Axis,
) {
    let mut body = player.rect();
    let velocity = match axis {
        Axis::X => &mut player.vx,
        Axis::Y => &mut player.vy,
    };
    let contact = resolve_axis(grid, &mut body, velocity, axis);
    player.x = body.x;
    player.y = body.y;

    if contact == Some(Side::Bottom) {
        player.on_ground = true;
        player.coyote = physics.coyote_time;
    }
}

/// Keep the player rectangle inside `[0, world_w - w] x [0, world_h - h]`.
pub fn clamp_to_world(player: &mut PlayerState, grid: &TileGrid) {
    let max_x = (grid.world_width() - player.w).max(0.0);
    let max_y = (grid.world_height() - player.h).max(0.0);
    player.x = if player.x.is_finite() {
        player.x.clamp(0.0, max_x)
    } else {
        player.spawn_x
    };
    player.y = if player.y.is_finite() {
        player.y.clamp(0.0, max_y)
    } else {
        player.spawn_y
    };
}

/// Apply a hit: knockback, brief invulnerability, and the loss of one star
/// (or one heart once stars run out). With nothing left to lose the player
/// is sent back to spawn.
pub fn hurt(player: &mut PlayerState, physics: &PhysicsConfig, events: &mut Vec<SessionEvent>) {
    events.push(SessionEvent::Hurt);
    player.invuln = physics.invuln_time;
    player.vy = -physics.knockback_y;
    player.vx = -player.dash_dir * physics.knockback_x;

    if player.stars > 0 {
        player.stars -= 1;
    } else if player.hearts > 0 {
        player.hearts -= 1;
    }

    if player.stars == 0 && player.hearts == 0 {
        player.respawn();
    }
}

/// Hurt the player if either foot stands in a hazard cell. Returns whether a
/// hit was applied.
pub fn check_hazards(
    player: &mut PlayerState,
    grid: &TileGrid,
    physics: &PhysicsConfig,
    events: &mut Vec<SessionEvent>,
) -> bool {
    if player.win || player.is_invulnerable() {
        return false;
    }
    let foot_y = player.y + player.h - 1.0;
    let feet = [player.x + player.w * 0.25, player.x + player.w * 0.75];
    if feet
        .iter()
        .any(|&foot_x| grid.tile_at(foot_x, foot_y) == CellKind::Hazard)
    {
        hurt(player, physics, events);
        return true;
    }
    false
}
