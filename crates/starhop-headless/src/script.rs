use serde::{Deserialize, Serialize};

/// One raw key transition at a given frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub frame: u32,
    pub key: String,
    /// `true` for key-down, `false` for key-up.
    pub down: bool,
}

/// A timed sequence of key transitions fed to the session, sorted by frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    pub events: Vec<KeyEvent>,
}

#[derive(Debug)]
pub enum ScriptError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read script: {e}"),
            Self::Parse(e) => write!(f, "invalid script: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {}

impl InputScript {
    pub fn new(mut events: Vec<KeyEvent>) -> Self {
        events.sort_by_key(|e| e.frame);
        Self { events }
    }

    /// A run to the right with periodic jumps, one dash, and one character
    /// switch.
    pub fn demo() -> Self {
        let mut events = vec![
            key(0, "ArrowRight", true),
            key(30, "KeyC", true),
            key(31, "KeyC", false),
            key(90, "ShiftLeft", true),
            key(91, "ShiftLeft", false),
        ];
        for frame in (20..600).step_by(45) {
            events.push(key(frame, "Space", true));
            events.push(key(frame + 12, "Space", false));
        }
        Self::new(events)
    }

    /// Parse a JSON array of `{ "frame", "key", "down" }` objects.
    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        let events: Vec<KeyEvent> =
            serde_json::from_str(content).map_err(|e| ScriptError::Parse(e.to_string()))?;
        Ok(Self::new(events))
    }

    pub fn from_path(path: &str) -> Result<Self, ScriptError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ScriptError::Io(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Transitions scheduled for `frame`, in script order.
    pub fn at(&self, frame: u32) -> impl Iterator<Item = &KeyEvent> {
        let start = self.events.partition_point(|e| e.frame < frame);
        self.events[start..].iter().take_while(move |e| e.frame == frame)
    }
}

fn key(frame: u32, key: &str, down: bool) -> KeyEvent {
    KeyEvent {
        frame,
        key: key.to_string(),
        down,
    }
}
