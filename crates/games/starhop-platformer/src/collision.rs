use serde::{Deserialize, Serialize};

use crate::level::TileGrid;

/// Gap left between a resolved body and the tile it was pushed out of.
pub const SKIN: f32 = 0.01;

/// Axis-aligned rectangle in world units, origin at the top-left, +y down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Which side of the moving body struck a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Push `body` out of every blocking tile it overlaps, along `axis` only.
///
/// The push direction comes from the sign of `velocity` (the body's speed on
/// that axis); a body with zero velocity is left where it is. Every cell of
/// the body's footprint plus a one-cell halo is checked, so a body that
/// moved most of a tile in one step still gets caught. On contact the body
/// is placed [`SKIN`] away from the tile edge and `velocity` is zeroed.
///
/// Returns the side of the body that made the last contact, if any.
pub fn resolve_axis(
    grid: &TileGrid,
    body: &mut Rect,
    velocity: &mut f32,
    axis: Axis,
) -> Option<Side> {
    let dir = *velocity;
    if dir == 0.0 || !dir.is_finite() {
        return None;
    }

    let ts = grid.tile_size;
    let min_cx = (body.x / ts).floor() as i32 - 1;
    let max_cx = (body.right() / ts).floor() as i32 + 1;
    let min_cy = (body.y / ts).floor() as i32 - 1;
    let max_cy = (body.bottom() / ts).floor() as i32 + 1;

    let mut contact = None;
    for cy in min_cy..=max_cy {
        for cx in min_cx..=max_cx {
            if !grid.get(cx, cy).is_blocking() {
                continue;
            }
            let tile = grid.cell_rect(cx, cy);
            if !body.overlaps(&tile) {
                continue;
            }

            contact = Some(match (axis, dir > 0.0) {
                (Axis::X, true) => {
                    body.x = tile.x - body.w - SKIN;
                    Side::Right
                },
                (Axis::X, false) => {
                    body.x = tile.right() + SKIN;
                    Side::Left
                },
                (Axis::Y, true) => {
                    body.y = tile.y - body.h - SKIN;
                    Side::Bottom
                },
                (Axis::Y, false) => {
                    body.y = tile.bottom() + SKIN;
                    Side::Top
                },
            });
            *velocity = 0.0;
        }
    }
    contact
}
