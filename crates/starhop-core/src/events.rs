use serde::{Deserialize, Serialize};

/// Discrete effects the simulation fires for the audio and particle layers.
///
/// These are fire-and-forget: the simulation never waits on a consumer and
/// never inspects what happened to an event after returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A pickup was taken, an enemy stomped, or the character switched.
    Collect,
    Hurt,
    Win,
    Jump,
    Dash,
}

impl SessionEvent {
    pub const ALL: [SessionEvent; 5] = [
        SessionEvent::Collect,
        SessionEvent::Hurt,
        SessionEvent::Win,
        SessionEvent::Jump,
        SessionEvent::Dash,
    ];

    /// Stable lowercase name, used as a structured log field.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Collect => "collect",
            SessionEvent::Hurt => "hurt",
            SessionEvent::Win => "win",
            SessionEvent::Jump => "jump",
            SessionEvent::Dash => "dash",
        }
    }
}

/// Queue of session events waiting for the effect collaborators.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SessionEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = SessionEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Hand every pending event to a consumer, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.events.drain(..)
    }
}
