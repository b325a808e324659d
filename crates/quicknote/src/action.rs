//! The hotkey action: ask the event loop to show or hide the note window.

use hotkey::Action;
use parking_lot::Mutex;
use tracing::{debug, warn};
use winit::event_loop::EventLoopProxy;

/// Requests posted from the hotkey listener to the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Bring the note window up and focus it.
    Show,
    /// Put the note window away.
    Hide,
}

/// Somewhere to post [`AppEvent`]s. Returns false once the receiver is gone.
pub trait EventSink: Send + Sync {
    /// Post one event.
    fn post(&self, event: AppEvent) -> bool;
}

/// The proxy is only guaranteed `Send`; the lock makes it shareable.
impl EventSink for Mutex<EventLoopProxy<AppEvent>> {
    fn post(&self, event: AppEvent) -> bool {
        self.lock().send_event(event).is_ok()
    }
}

/// [`Action`] that forwards show and hide requests to an [`EventSink`].
pub struct QuickNote<S> {
    sink: S,
}

impl<S: EventSink> QuickNote<S> {
    /// Wrap `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    fn send(&self, event: AppEvent) {
        if self.sink.post(event) {
            debug!(?event, "quicknote_event_posted");
        } else {
            warn!(?event, "quicknote_event_loop_closed");
        }
    }
}

impl<S: EventSink> Action for QuickNote<S> {
    fn show(&self) {
        self.send(AppEvent::Show);
    }

    fn hide(&self) {
        self.send(AppEvent::Hide);
    }
}
