mod script;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use starhop_core::events::EventQueue;
use starhop_core::input::InputState;
use starhop_core::simulation::Simulation;
use starhop_platformer::Session;
use starhop_platformer::config::SessionConfig;

use script::InputScript;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Outcome of a headless run, printed as JSON on stdout.
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u32,
    elapsed: f32,
    hearts: u32,
    stars: u32,
    won: bool,
    events: BTreeMap<&'static str, usize>,
}

fn arg_value(prefix: &str) -> Option<String> {
    std::env::args()
        .skip(1)
        .find_map(|a| a.strip_prefix(prefix).map(String::from))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let frames = arg_value("--frames=")
        .and_then(|f| f.parse::<u32>().ok())
        .unwrap_or(600);

    let script = match arg_value("--script=") {
        Some(path) => match InputScript::from_path(&path) {
            Ok(script) => script,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(2);
            },
        },
        None => InputScript::demo(),
    };

    let mut session = match Session::from_config(SessionConfig::load()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to load level: {e}");
            std::process::exit(1);
        },
    };
    tracing::info!(
        seed = session.seed(),
        frames,
        "Starting {}",
        session.metadata().name
    );

    let mut input = InputState::new();
    let mut queue = EventQueue::default();
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut played = 0;

    for frame in 0..frames {
        for event in script.at(frame) {
            if event.down {
                input.on_key_down(&event.key);
            } else {
                input.on_key_up(&event.key);
            }
        }
        queue.extend(session.run_frame(FRAME_DT, &mut input));
        for event in queue.drain() {
            tracing::debug!(frame, event = event.name(), "Effect");
            *counts.entry(event.name()).or_default() += 1;
        }
        played = frame + 1;
        if session.is_won() {
            tracing::info!(frame, elapsed = session.elapsed(), "Portal reached");
            break;
        }
    }

    let player = &session.state().player;
    let summary = RunSummary {
        seed: session.seed(),
        frames: played,
        elapsed: session.elapsed(),
        hearts: player.hearts,
        stars: player.stars,
        won: player.win,
        events: counts,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode summary: {e}"),
    }
}
