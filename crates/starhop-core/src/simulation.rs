use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;
use crate::input::InputSnapshot;

/// Core trait a Starhop simulation implements.
///
/// The frame driver owns input sampling, rendering, and audio; the
/// simulation only advances its own state and reports what happened.
pub trait Simulation {
    /// Display metadata for menus and logs.
    fn metadata(&self) -> SimulationMetadata;

    /// Re-initialize the session in place. Callable at any time, including
    /// mid-session and after a win.
    fn reset(&mut self);

    /// Advance one display frame. Returns the effects fired during the frame.
    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Vec<SessionEvent>;

    /// Serialize the current state for out-of-process readers.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the current state with a previously serialized one. Malformed
    /// data is ignored.
    fn apply_state(&mut self, state: &[u8]);

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the goal has been reached this session.
    fn is_won(&self) -> bool;

    /// Seconds of play since the last reset, frozen once won.
    fn elapsed(&self) -> f32;
}

/// Simulation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub name: String,
    pub description: String,
    /// Number of switchable character presets.
    pub character_count: u8,
}
