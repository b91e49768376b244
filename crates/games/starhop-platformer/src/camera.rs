use serde::{Deserialize, Serialize};

use crate::collision::Rect;

/// Top-left of the visible window in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub view_width: f32,
    pub view_height: f32,
}

impl Camera {
    pub fn new(view_width: f32, view_height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            view_width,
            view_height,
        }
    }

    /// Center the view on `target`, then clamp so nothing outside
    /// `world_w x world_h` is shown. An axis where the world is smaller than
    /// the view pins to 0.
    pub fn follow(&mut self, target: Rect, world_w: f32, world_h: f32) {
        self.x = clamp_axis(target.center_x() - self.view_width / 2.0, world_w - self.view_width);
        self.y = clamp_axis(
            target.center_y() - self.view_height / 2.0,
            world_h - self.view_height,
        );
    }

    pub fn view_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.view_width, self.view_height)
    }
}

fn clamp_axis(pos: f32, max: f32) -> f32 {
    if !pos.is_finite() || max <= 0.0 {
        return 0.0;
    }
    pos.clamp(0.0, max)
}
