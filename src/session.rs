use std::fmt::Display;
use std::sync::Mutex;

/// Why a call could not be serviced by the handler registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// The slot had no handlers registered at all.
    Unmocked,
    /// The slot was stubbed, but no registered handler matched the inputs.
    Unmatched,
}

/// A call that reached dispatch without a servicing handler. Reported to the
/// [Session] before the failure is raised.
#[derive(Clone, Debug)]
pub struct UnexpectedCallEvent {
    pub kind: CallKind,
    /// The globally monotonic ordinal assigned to the failing call.
    pub ordinal: usize,
    /// Method description: slot name, or the metadata set on its context.
    pub method: String,
    pub inputs_debug: String,
}

impl Display for UnexpectedCallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CallKind::Unmocked => write!(
                f,
                "{}{}: unexpected call #{}: no handlers registered for this method.",
                self.method, self.inputs_debug, self.ordinal
            ),
            CallKind::Unmatched => write!(
                f,
                "{}{}: unexpected call #{}: no registered handler matched the inputs.",
                self.method, self.inputs_debug, self.ordinal
            ),
        }
    }
}

/// The coordinating object for failure reporting across all mocks sharing it.
/// `handle` observes every unexpected-call event; `format` produces the text
/// carried by the raised failure.
pub trait Session: Send + Sync {
    fn handle(&self, event: &UnexpectedCallEvent);

    fn format(&self, event: &UnexpectedCallEvent) -> String {
        event.to_string()
    }
}

/// Reference [Session]: stores every event for later assertion and formats
/// with the event's own [Display] impl.
#[derive(Debug, Default)]
pub struct RecordingSession {
    events: Mutex<Vec<UnexpectedCallEvent>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event handled so far, in reporting order.
    pub fn events(&self) -> Vec<UnexpectedCallEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Session for RecordingSession {
    fn handle(&self, event: &UnexpectedCallEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
