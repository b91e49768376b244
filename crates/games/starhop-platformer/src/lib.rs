pub mod camera;
pub mod collision;
pub mod config;
pub mod entities;
pub mod level;
pub mod physics;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use starhop_core::codec::{decode_state, encode_state};
use starhop_core::error::LevelError;
use starhop_core::events::SessionEvent;
use starhop_core::input::{InputSnapshot, InputState};
use starhop_core::simulation::{Simulation, SimulationMetadata};

use camera::Camera;
use collision::Rect;
use config::SessionConfig;
use entities::{Enemy, Pickup, collect_pickups, patrol, resolve_enemy_contacts};
use level::{CellKind, Level, LevelFile, TileGrid};
use physics::{PlayerIntent, PlayerState, check_hazards, tick_player};

/// Everything that changes during play. This is the snapshot renderers read
/// each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub player: PlayerState,
    pub pickups: Vec<Pickup>,
    pub enemies: Vec<Enemy>,
    pub camera: Camera,
    /// Seconds of play since the last reset, frozen once won.
    pub elapsed: f32,
}

/// One play session on a single level.
pub struct Session {
    level: Level,
    config: SessionConfig,
    state: SessionState,
    /// Seed for enemy directions, reused on every reset.
    seed: u64,
    paused: bool,
}

impl Session {
    /// Start a session on an already loaded level. Uses `config.seed` when
    /// set, otherwise a random seed.
    pub fn new(level: Level, config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(level, config, seed)
    }

    /// Load the level named by `config.level_path` (or the built-in level)
    /// and start a session on it.
    pub fn from_config(config: SessionConfig) -> Result<Self, LevelError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let file = match &config.level_path {
            Some(path) => LevelFile::from_path(path)?,
            None => LevelFile::builtin(),
        };
        let level = file.load(config.enemy.speed, &mut StdRng::seed_from_u64(seed))?;
        Ok(Self::with_seed(level, config, seed))
    }

    fn with_seed(level: Level, config: SessionConfig, seed: u64) -> Self {
        let state = initial_state(&level, &config, seed);
        Self {
            level,
            config,
            state,
            seed,
            paused: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn grid(&self) -> &TileGrid {
        &self.level.grid
    }

    pub fn portal(&self) -> Rect {
        self.level.portal
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Non-empty cells inside the current camera window.
    pub fn visible_cells(&self) -> impl Iterator<Item = (u32, u32, CellKind)> + '_ {
        self.level.grid.visible_cells(self.state.camera.view_rect())
    }

    /// Run one frame from live input: snapshot, update, then clear the
    /// one-shot presses the frame consumed.
    pub fn run_frame(&mut self, dt: f32, input: &mut InputState) -> Vec<SessionEvent> {
        let snapshot = input.snapshot();
        let events = self.update(dt, &snapshot);
        input.end_frame();
        events
    }

    fn clamp_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() {
            return 0.0;
        }
        dt.min(self.config.max_frame_dt).max(0.0)
    }

    fn check_win(&mut self, events: &mut Vec<SessionEvent>) {
        let player = &mut self.state.player;
        if player.win
            || player.hearts < self.config.hearts_to_win
            || !player.rect().overlaps(&self.level.portal)
        {
            return;
        }
        player.win = true;
        player.vx = 0.0;
        player.vy = 0.0;
        player.dash = 0.0;
        events.push(SessionEvent::Win);
        tracing::debug!(
            elapsed = self.state.elapsed,
            hearts = player.hearts,
            stars = player.stars,
            "Portal reached"
        );
    }
}

fn initial_state(level: &Level, config: &SessionConfig, seed: u64) -> SessionState {
    let mut rng = StdRng::seed_from_u64(seed);
    let player = PlayerState::new(
        level.spawn_x,
        level.spawn_y,
        level.grid.tile_size,
        &config.physics,
    );
    let mut enemies = level.enemies.clone();
    for enemy in &mut enemies {
        enemy.randomize_direction(&mut rng);
    }
    let mut camera = Camera::new(config.view_width, config.view_height);
    camera.follow(
        player.rect(),
        level.grid.world_width(),
        level.grid.world_height(),
    );
    SessionState {
        player,
        pickups: level.pickups.clone(),
        enemies,
        camera,
        elapsed: 0.0,
    }
}

impl Simulation for Session {
    fn metadata(&self) -> SimulationMetadata {
        SimulationMetadata {
            name: "Starhop".to_string(),
            description: "Collect hearts, dodge spikes and walkers, reach the portal.".to_string(),
            character_count: self.config.character_count().min(u8::MAX as usize) as u8,
        }
    }

    fn reset(&mut self) {
        self.state = initial_state(&self.level, &self.config, self.seed);
        tracing::debug!(seed = self.seed, "Session reset");
    }

    fn update(&mut self, dt: f32, input: &InputSnapshot) -> Vec<SessionEvent> {
        if self.paused {
            return Vec::new();
        }
        if input.restart_pressed() {
            self.reset();
            return Vec::new();
        }

        let dt = self.clamp_dt(dt);
        let mut events = Vec::new();
        if !self.state.player.win {
            self.state.elapsed += dt;
        }

        let grid = &self.level.grid;
        let substeps = self.config.substeps.max(1);
        let sub_dt = dt / substeps as f32;
        let intent = PlayerIntent::from_snapshot(input);
        for step in 0..substeps {
            // One-shot presses act once per frame, not once per substep.
            let step_intent = if step == 0 {
                intent
            } else {
                intent.held_only()
            };
            tick_player(
                &mut self.state.player,
                &step_intent,
                grid,
                &self.config,
                sub_dt,
                &mut events,
            );
        }

        let state = &mut self.state;
        collect_pickups(&mut state.player, &mut state.pickups, &mut events);
        patrol(
            &mut state.enemies,
            grid,
            self.config.enemy.probe_distance,
            dt,
        );
        resolve_enemy_contacts(
            &mut state.player,
            &mut state.enemies,
            &self.config.physics,
            &mut events,
        );
        check_hazards(&mut state.player, grid, &self.config.physics, &mut events);
        self.check_win(&mut events);

        let grid = &self.level.grid;
        let state = &mut self.state;
        state
            .camera
            .follow(state.player.rect(), grid.world_width(), grid.world_height());

        for event in &events {
            tracing::trace!(event = event.name(), "Session event");
        }
        events
    }

    fn serialize_state(&self) -> Vec<u8> {
        encode_state(&self.state).unwrap_or_else(|e| {
            tracing::warn!("Failed to encode session state: {e}");
            Vec::new()
        })
    }

    fn apply_state(&mut self, state: &[u8]) {
        match decode_state::<SessionState>(state) {
            Ok(s) => self.state = s,
            Err(e) => tracing::debug!("Ignoring session state: {e}"),
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_won(&self) -> bool {
        self.state.player.win
    }

    fn elapsed(&self) -> f32 {
        self.state.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starhop_core::input::Buttons;
    use starhop_core::test_helpers::{floor_rows, held, pressed, run_frames};

    use crate::level::{ENEMY_SPEED, load_level};

    const DT: f32 = 1.0 / 60.0;

    fn seeded_config() -> SessionConfig {
        SessionConfig {
            seed: Some(7),
            ..SessionConfig::default()
        }
    }

    fn builtin_session() -> Session {
        Session::from_config(seeded_config()).unwrap()
    }

    /// 12x8 room with 32-unit tiles; the portal stands on column 10.
    fn room(extras: &[(usize, usize, char)], config: SessionConfig) -> Session {
        let rows = floor_rows(12, 8, extras);
        let level = load_level(&rows, 32.0, ENEMY_SPEED, &mut StdRng::seed_from_u64(1)).unwrap();
        Session::new(level, config)
    }

    /// Player spawned inside the portal.
    fn at_portal(hearts: u32) -> Session {
        let mut session = room(&[(10, 6, 'p')], seeded_config());
        session.state.player.hearts = hearts;
        session
    }

    // ================================================================
    // Simulation Contract Tests
    // ================================================================

    #[test]
    fn contract_update_advances_time() {
        starhop_core::test_helpers::contract_update_advances_time(&mut builtin_session());
    }

    #[test]
    fn contract_reset_is_idempotent() {
        starhop_core::test_helpers::contract_reset_is_idempotent(&mut builtin_session());
    }

    #[test]
    fn contract_state_roundtrip_preserves() {
        starhop_core::test_helpers::contract_state_roundtrip_preserves(&mut builtin_session());
    }

    #[test]
    fn contract_pause_stops_updates() {
        starhop_core::test_helpers::contract_pause_stops_updates(&mut builtin_session());
    }

    // ================================================================
    // Session behaviour
    // ================================================================

    #[test]
    fn metadata_reports_presets() {
        let meta = builtin_session().metadata();
        assert_eq!(meta.name, "Starhop");
        assert_eq!(meta.character_count, 2);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut session = builtin_session();
        let fresh = session.state().clone();

        run_frames(&mut session, 90, DT, &held(Buttons::RIGHT | Buttons::JUMP));
        session.state.player.stars = 4;
        session.state.pickups[0].taken = true;
        session.state.enemies[0].alive = false;
        assert_ne!(session.state(), &fresh);

        session.reset();
        assert_eq!(session.state(), &fresh);
    }

    #[test]
    fn restart_button_resets() {
        let mut session = builtin_session();
        let fresh = session.state().clone();
        run_frames(&mut session, 30, DT, &held(Buttons::RIGHT));

        let events = session.update(DT, &pressed(Buttons::RESTART));
        assert!(events.is_empty());
        assert_eq!(session.state(), &fresh);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = builtin_session();
        let mut b = builtin_session();
        assert_eq!(a.seed(), 7);
        for frame in 0..240 {
            let input = if frame % 40 == 0 {
                pressed(Buttons::RIGHT | Buttons::JUMP)
            } else {
                held(Buttons::RIGHT)
            };
            assert_eq!(a.update(DT, &input), b.update(DT, &input));
        }
        assert_eq!(a.serialize_state(), b.serialize_state());
    }

    #[test]
    fn portal_needs_enough_hearts() {
        let mut session = at_portal(4);
        let events = run_frames(&mut session, 10, DT, &InputSnapshot::default());
        assert!(!events.contains(&SessionEvent::Win));
        assert!(!session.is_won());
    }

    #[test]
    fn portal_with_hearts_wins_once() {
        let mut session = at_portal(5);
        let events = run_frames(&mut session, 10, DT, &InputSnapshot::default());
        assert_eq!(
            events.iter().filter(|e| **e == SessionEvent::Win).count(),
            1
        );
        assert!(session.is_won());
    }

    #[test]
    fn win_freezes_timer_and_player() {
        let mut session = at_portal(5);
        session.update(DT, &InputSnapshot::default());
        assert!(session.is_won());
        let elapsed = session.elapsed();
        let player = session.state().player.clone();

        let events = run_frames(&mut session, 30, DT, &pressed(Buttons::RIGHT | Buttons::JUMP));
        assert_eq!(session.elapsed(), elapsed);
        assert_eq!((session.state().player.x, session.state().player.y), (player.x, player.y));
        assert!(!events.contains(&SessionEvent::Jump));
    }

    #[test]
    fn reset_after_win_clears_it() {
        let mut session = at_portal(5);
        session.update(DT, &InputSnapshot::default());
        session.reset();
        assert!(!session.is_won());
        assert_eq!(session.elapsed(), 0.0);
        assert_eq!(session.state().player.hearts, 0);
    }

    #[test]
    fn dt_is_clamped() {
        let mut session = builtin_session();
        session.update(10.0, &InputSnapshot::default());
        assert!((session.elapsed() - 1.0 / 30.0).abs() < 1e-6);

        session.update(f32::NAN, &InputSnapshot::default());
        session.update(f32::INFINITY, &InputSnapshot::default());
        session.update(-1.0, &InputSnapshot::default());
        assert!((session.elapsed() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn one_shot_presses_apply_once_across_substeps() {
        let config = SessionConfig {
            substeps: 4,
            ..seeded_config()
        };
        let mut session = room(&[(3, 6, 'p')], config);
        let events = session.update(DT, &pressed(Buttons::SWITCH));
        assert_eq!(events, vec![SessionEvent::Collect]);
        assert_eq!(session.state().player.stars, 1);
        assert_eq!(session.state().player.active, 1);
    }

    #[test]
    fn pickup_in_spawn_cell_collected() {
        let mut session = room(&[(3, 6, 'p'), (3, 5, 'h')], seeded_config());
        session.state.player.y -= 20.0;
        let events = run_frames(&mut session, 5, DT, &InputSnapshot::default());
        assert_eq!(session.state().player.hearts, 1);
        assert!(session.state().pickups[0].taken);
        assert_eq!(
            events.iter().filter(|e| **e == SessionEvent::Collect).count(),
            1
        );
    }

    #[test]
    fn walking_onto_spikes_hurts() {
        let mut session = room(&[(3, 6, 'p'), (5, 7, 's'), (6, 7, 's')], seeded_config());
        session.state.player.stars = 2;
        let events = run_frames(&mut session, 60, DT, &held(Buttons::RIGHT));
        assert!(events.contains(&SessionEvent::Hurt));
        assert!(session.state().player.stars < 2);
    }

    #[test]
    fn run_frame_clears_edges() {
        let mut session = builtin_session();
        let mut input = InputState::new();
        input.on_key_down("KeyC");
        let first = session.run_frame(DT, &mut input);
        let second = session.run_frame(DT, &mut input);
        assert!(first.contains(&SessionEvent::Collect));
        assert!(!second.contains(&SessionEvent::Collect));
        assert_eq!(session.state().player.active, 1);
    }

    #[test]
    fn camera_follows_player() {
        let mut session = builtin_session();
        assert_eq!(session.state().camera.x, 0.0, "spawn is near the left edge");

        session.state.player.x = 1000.0;
        session.update(DT, &InputSnapshot::default());
        let cam = session.state().camera;
        let world_w = session.grid().world_width();
        assert_eq!(cam.x, world_w - cam.view_width, "clamped to the right edge");
        assert!(session.visible_cells().count() > 0);
    }

    #[test]
    fn garbage_state_ignored() {
        let mut session = builtin_session();
        let before = session.serialize_state();
        session.apply_state(&[0xc1, 0x00, 0xff]);
        session.apply_state(&[]);
        assert_eq!(session.serialize_state(), before);
    }

    #[test]
    fn missing_level_file_is_error() {
        let config = SessionConfig {
            level_path: Some("/nonexistent/level.toml".to_string()),
            ..seeded_config()
        };
        assert!(matches!(
            Session::from_config(config),
            Err(LevelError::Io(_))
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn buttons_strategy() -> impl Strategy<Value = InputSnapshot> {
            (0u8..32, 0u8..32).prop_map(|(held, pressed)| InputSnapshot {
                held: Buttons::from_bits_truncate(held),
                just_pressed: Buttons::from_bits_truncate(held & pressed),
            })
        }

        proptest! {
            #[test]
            fn session_invariants_hold(
                seed in 0u64..50,
                inputs in proptest::collection::vec(buttons_strategy(), 1..300),
            ) {
                let config = SessionConfig { seed: Some(seed), ..SessionConfig::default() };
                let mut session = Session::from_config(config).unwrap();
                let world_w = session.grid().world_width();
                let world_h = session.grid().world_height();
                let mut was_won = false;

                for input in &inputs {
                    let events = session.update(DT, input);
                    let player = &session.state().player;
                    prop_assert!(player.x >= 0.0 && player.x <= world_w - player.w);
                    prop_assert!(player.y >= 0.0 && player.y <= world_h - player.h);
                    prop_assert!(session.elapsed() >= 0.0);
                    if was_won {
                        prop_assert!(!events.contains(&SessionEvent::Win));
                    }
                    was_won = session.is_won();
                }
            }
        }
    }
}
