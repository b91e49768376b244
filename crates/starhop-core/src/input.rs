use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Logical buttons the simulation understands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const LEFT    = 1 << 0;
        const RIGHT   = 1 << 1;
        const JUMP    = 1 << 2;
        const DASH    = 1 << 3;
        const SWITCH  = 1 << 4;
        const RESTART = 1 << 5;
    }
}

impl Buttons {
    /// Normalize a raw key name to a logical button.
    ///
    /// Accepts DOM `code` values (`"ArrowLeft"`, `"KeyA"`, `"Space"`), DOM
    /// `key` values (`"a"`, `" "`, `"Shift"`), and single characters in
    /// either case.
    pub fn from_key(key: &str) -> Option<Buttons> {
        let lowered;
        let key = if key.chars().count() == 1 {
            lowered = key.to_ascii_lowercase();
            lowered.as_str()
        } else {
            key
        };
        match key {
            "ArrowLeft" | "KeyA" | "a" => Some(Buttons::LEFT),
            "ArrowRight" | "KeyD" | "d" => Some(Buttons::RIGHT),
            "ArrowUp" | "KeyW" | "w" | "Space" | " " | "KeyZ" | "z" => Some(Buttons::JUMP),
            "ShiftLeft" | "ShiftRight" | "Shift" | "KeyX" | "x" => Some(Buttons::DASH),
            "KeyC" | "c" | "Tab" => Some(Buttons::SWITCH),
            "KeyR" | "r" => Some(Buttons::RESTART),
            _ => None,
        }
    }
}

/// Immutable per-frame view of the input device, handed to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Buttons currently held down.
    pub held: Buttons,
    /// Buttons that went down since the previous snapshot was consumed.
    pub just_pressed: Buttons,
}

impl InputSnapshot {
    /// Horizontal intent: -1 (left), 0, or +1 (right). Opposing keys cancel.
    pub fn move_dir(&self) -> f32 {
        let mut dir = 0.0;
        if self.held.contains(Buttons::LEFT) {
            dir -= 1.0;
        }
        if self.held.contains(Buttons::RIGHT) {
            dir += 1.0;
        }
        dir
    }

    pub fn is_held(&self, button: Buttons) -> bool {
        self.held.contains(button)
    }

    pub fn jump_pressed(&self) -> bool {
        self.just_pressed.contains(Buttons::JUMP)
    }

    pub fn dash_pressed(&self) -> bool {
        self.just_pressed.contains(Buttons::DASH)
    }

    pub fn switch_pressed(&self) -> bool {
        self.just_pressed.contains(Buttons::SWITCH)
    }

    pub fn restart_pressed(&self) -> bool {
        self.just_pressed.contains(Buttons::RESTART)
    }
}

/// Live keyboard state, fed by the platform's key events.
///
/// The frame driver calls [`InputState::snapshot`] before the simulation
/// tick and [`InputState::end_frame`] after it, so every press is seen by
/// exactly one tick no matter how long the frame took.
#[derive(Debug, Default)]
pub struct InputState {
    held: Buttons,
    just_pressed: Buttons,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw key-down event. Unmapped keys are ignored; OS key
    /// repeat does not re-trigger a press while the key stays held.
    pub fn on_key_down(&mut self, key: &str) {
        match Buttons::from_key(key) {
            Some(button) => self.press(button),
            None => tracing::trace!(key, "Ignoring unmapped key"),
        }
    }

    /// Register a raw key-up event.
    pub fn on_key_up(&mut self, key: &str) {
        if let Some(button) = Buttons::from_key(key) {
            self.release(button);
        }
    }

    pub fn press(&mut self, button: Buttons) {
        if !self.held.contains(button) {
            self.just_pressed.insert(button);
        }
        self.held.insert(button);
    }

    pub fn release(&mut self, button: Buttons) {
        self.held.remove(button);
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            held: self.held,
            just_pressed: self.just_pressed,
        }
    }

    /// Clear edge-triggered state. Call only after the tick consumed the snapshot.
    pub fn end_frame(&mut self) {
        self.just_pressed = Buttons::empty();
    }
}
