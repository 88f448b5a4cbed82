//! Session lifecycle events.
//!
//! The browser original navigated straight to the login page when a
//! refresh failed. The client instead broadcasts an event and leaves
//! navigation to whoever embeds it.

use tokio::sync::broadcast;

/// Events emitted by the client about the shared session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session could not be refreshed and has been cleared.
    /// A UI would typically return the user to its login entry point.
    Expired,
}

/// Broadcast channel for [`SessionEvent`]s.
#[derive(Debug)]
pub(crate) struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        // Small buffer; expiry is rare and observers only care about the
        // latest state.
        let (sender, _) = broadcast::channel(8);
        Self { sender }
    }

    /// Subscribe to session events.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Emit an event. Having no subscribers is not an error.
    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}
