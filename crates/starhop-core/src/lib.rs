pub mod codec;
pub mod error;
pub mod events;
pub mod input;
pub mod simulation;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::SessionEvent;
    use crate::input::{Buttons, InputSnapshot};
    use crate::simulation::Simulation;

    /// Build level rows for a `cols` x `rows` room with a solid floor row and
    /// a portal anchor in the floor near the right edge. `extras` overwrite
    /// individual cells as `(col, row, marker)`.
    pub fn floor_rows(cols: usize, rows: usize, extras: &[(usize, usize, char)]) -> Vec<String> {
        let mut grid = vec![vec!['.'; cols]; rows];
        if let Some(floor) = grid.last_mut() {
            floor.iter_mut().for_each(|c| *c = '1');
            if cols >= 2 {
                floor[cols - 2] = '4';
            }
        }
        for &(col, row, marker) in extras {
            if row < rows && col < cols {
                grid[row][col] = marker;
            }
        }
        grid.into_iter().map(|row| row.into_iter().collect()).collect()
    }

    /// Snapshot with `held` buttons down and nothing newly pressed.
    pub fn held(buttons: Buttons) -> InputSnapshot {
        InputSnapshot {
            held: buttons,
            just_pressed: Buttons::empty(),
        }
    }

    /// Snapshot where `buttons` went down this frame.
    pub fn pressed(buttons: Buttons) -> InputSnapshot {
        InputSnapshot {
            held: buttons,
            just_pressed: buttons,
        }
    }

    /// Run N frames with the same input snapshot, returning all accumulated events.
    pub fn run_frames(
        sim: &mut dyn Simulation,
        n: usize,
        dt: f32,
        input: &InputSnapshot,
    ) -> Vec<SessionEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(dt, input));
        }
        all_events
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================
    // Generic checks every Simulation implementation must pass. Game crates
    // call them from their own #[cfg(test)] modules.

    /// update() with dt>0 must advance the elapsed timer.
    pub fn contract_update_advances_time(sim: &mut dyn Simulation) {
        let before = sim.elapsed();
        sim.update(1.0 / 60.0, &InputSnapshot::default());
        assert!(
            sim.elapsed() > before,
            "update(dt>0) must advance the elapsed timer"
        );
    }

    /// Calling reset() twice must leave the same state as calling it once.
    pub fn contract_reset_is_idempotent(sim: &mut dyn Simulation) {
        sim.update(0.2, &held(Buttons::RIGHT));
        sim.reset();
        let once = sim.serialize_state();
        sim.reset();
        let twice = sim.serialize_state();
        assert_eq!(once, twice, "reset() must be idempotent");
    }

    /// serialize_state → apply_state must be stable after one roundtrip.
    pub fn contract_state_roundtrip_preserves(sim: &mut dyn Simulation) {
        let state_a = sim.serialize_state();
        assert!(!state_a.is_empty(), "serialized state must not be empty");
        sim.apply_state(&state_a);
        let state_b = sim.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(sim: &mut dyn Simulation) {
        sim.pause();
        let before = sim.serialize_state();
        sim.update(1.0 / 60.0, &held(Buttons::RIGHT));
        assert_eq!(
            before,
            sim.serialize_state(),
            "State must not change while paused"
        );

        sim.resume();
        sim.update(1.0 / 60.0, &held(Buttons::RIGHT));
        assert_ne!(before, sim.serialize_state(), "State must change after resume");
    }
}
