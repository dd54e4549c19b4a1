//! Event channel implementation using crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Event, StageEvent, StageProgress};

/// Sends events from the core library.
///
/// Cloneable and `Send`, so pool workers can report progress directly.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Returns an iterator over received events; ends when every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A no-op event sender for runs without progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

/// Counts finished tasks of one pooled stage and emits progress events.
///
/// Shared by reference between pool workers; the counter is the only
/// state touched concurrently.
pub struct StageTracker<'a> {
    events: &'a EventSender,
    wrap: fn(StageEvent) -> Event,
    completed: AtomicUsize,
    total: usize,
}

impl<'a> StageTracker<'a> {
    /// Start tracking a stage of `total` tasks
    pub fn new(events: &'a EventSender, wrap: fn(StageEvent) -> Event, total: usize) -> Self {
        Self {
            events,
            wrap,
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished task
    pub fn task_done(&self, path: &Path) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.send((self.wrap)(StageEvent::Progress(StageProgress {
            completed,
            total: self.total,
            current_path: path.to_path_buf(),
        })));
    }

    /// Number of tasks finished so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}
