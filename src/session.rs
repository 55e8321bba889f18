//! View notification surface
//!
//! This module defines the trait used to push messages from the quiz and SOS
//! state machines out to whatever renders them. The tunnel abstraction keeps
//! the state machines free of any presentation concern: a browser binding
//! may turn messages into toasts, a test records them.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages to the view that owns a session
///
/// Implementations should never block; delivery is best-effort and the
/// state machines do not observe whether a message was shown.
pub trait Tunnel {
    /// Sends an update message to the view
    ///
    /// Update messages notify the view about a transition that just
    /// happened, such as a quiz being completed or an alert being sent.
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the view
    ///
    /// Sync messages carry a full snapshot, typically used when a view is
    /// (re)rendered and needs to catch up with the current state.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);
}

impl<T: Tunnel + ?Sized> Tunnel for &T {
    fn send_message(&self, message: &UpdateMessage) {
        (**self).send_message(message);
    }

    fn send_state(&self, state: &SyncMessage) {
        (**self).send_state(state);
    }
}
