use rand::Rng;
use serde::{Deserialize, Serialize};

use starhop_core::events::SessionEvent;

use crate::collision::Rect;
use crate::config::PhysicsConfig;
use crate::level::TileGrid;
use crate::physics::{PlayerState, hurt};

/// A heart lying in the level. Taken pickups stay in the list so a reset
/// can restore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub taken: bool,
}

impl Pickup {
    /// Pickup centered in `cell`, covering 80% of it.
    pub fn in_cell(cell: Rect) -> Self {
        Self {
            x: cell.x + cell.w * 0.1,
            y: cell.y + cell.h * 0.1,
            w: cell.w * 0.8,
            h: cell.h * 0.8,
            taken: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// A walker that paces back and forth along a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub alive: bool,
}

impl Enemy {
    /// Enemy standing on the bottom edge of `cell`, 80% wide and 70% tall.
    pub fn in_cell(cell: Rect, vx: f32) -> Self {
        let h = cell.h * 0.7;
        Self {
            x: cell.x + cell.w * 0.1,
            y: cell.y + cell.h - h,
            w: cell.w * 0.8,
            h,
            vx,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Pick a fresh patrol direction, keeping the speed.
    pub fn randomize_direction(&mut self, rng: &mut impl Rng) {
        let speed = self.vx.abs();
        self.vx = if rng.random_bool(0.5) { speed } else { -speed };
    }
}

/// Walk every live enemy and turn it around at walls and ledges.
pub fn patrol(enemies: &mut [Enemy], grid: &TileGrid, probe: f32, dt: f32) {
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        enemy.x += enemy.vx * dt;

        let ahead_x = if enemy.vx >= 0.0 {
            enemy.x + enemy.w + probe
        } else {
            enemy.x - probe
        };
        let wall = grid.tile_at(ahead_x, enemy.y + enemy.h / 2.0).is_blocking();
        let floor = grid.tile_at(ahead_x, enemy.y + enemy.h + probe).is_blocking();
        if wall || !floor {
            enemy.vx = -enemy.vx;
        }
    }
}

/// Take every untaken pickup the player touches. Each one is worth a heart.
/// Returns how many were taken.
pub fn collect_pickups(
    player: &mut PlayerState,
    pickups: &mut [Pickup],
    events: &mut Vec<SessionEvent>,
) -> usize {
    let body = player.rect();
    let mut taken = 0;
    for pickup in pickups.iter_mut().filter(|p| !p.taken) {
        if body.overlaps(&pickup.rect()) {
            pickup.taken = true;
            player.hearts = player.hearts.saturating_add(1);
            events.push(SessionEvent::Collect);
            taken += 1;
        }
    }
    taken
}

/// Resolve player contact with live enemies: a falling player landing near an
/// enemy's top stomps it, any other touch hurts the player.
pub fn resolve_enemy_contacts(
    player: &mut PlayerState,
    enemies: &mut [Enemy],
    physics: &PhysicsConfig,
    events: &mut Vec<SessionEvent>,
) {
    if player.win {
        return;
    }
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        // A hit grants invulnerability, which ends combat for this tick.
        if player.is_invulnerable() {
            return;
        }
        if !player.rect().overlaps(&enemy.rect()) {
            continue;
        }
        let sink = player.y + player.h - enemy.y;
        if player.vy > 0.0 && sink < physics.stomp_window {
            enemy.alive = false;
            player.vy = -physics.stomp_bounce;
            player.stars = player.stars.saturating_add(2);
            events.push(SessionEvent::Collect);
            tracing::trace!(x = enemy.x, y = enemy.y, "Enemy stomped");
        } else {
            hurt(player, physics, events);
        }
    }
}
