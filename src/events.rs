//! Progress events for multi-step flows.
//!
//! Flows emit via [`EventBus::emit`]; anything interested (the CLI's
//! progress printer, a test) subscribes via [`EventBus::subscribe`].
//! Built on [`tokio::sync::broadcast`] so several listeners can follow the
//! same flow independently.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// What a submission has done so far.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The CV record exists on the backend.
    CvCreated { cv_id: i64 },
    /// An education entry was attached. `index` is its position in the draft.
    EducationAttached { index: usize, institution: String },
    /// An experience entry was attached. `index` is its position in the draft.
    ExperienceAttached { index: usize, company: String },
    /// A blank entry was left out.
    EntrySkipped { section: &'static str, index: usize },
    /// The profile was added to the public directory.
    DirectoryJoined,
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events. Returns a receiver that yields all
    /// future events (does not replay past ones).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Hand every event on `rx` to `on_event` until the bus is dropped.
///
/// A reader that falls behind loses the oldest events but keeps going.
/// Returns how many events were lost that way.
pub async fn drain(mut rx: broadcast::Receiver<Event>, mut on_event: impl FnMut(Event)) -> u64 {
    let mut skipped = 0;
    loop {
        match rx.recv().await {
            Ok(event) => on_event(event),
            Err(RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "progress reader fell behind");
                skipped += n;
            }
            Err(RecvError::Closed) => return skipped,
        }
    }
}
