//! Host capabilities used by the SOS controller
//!
//! Location, speech, vibration, telephony, clipboard and the outgoing relay
//! are all provided by the host platform and may be missing or denied. Each
//! is a small trait with an [`Unsupported`] fallback so the controller can
//! run, and be tested, without any device behind it.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{alert::Broadcast, contacts::Contact};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Display for Location {
    /// Formats the location with four decimals, as shown on screen
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Errors reported by a capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The platform does not offer the capability
    #[error("capability not supported")]
    Unsupported,
    /// The platform refused the request (permission denied, busy, ...)
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// One-shot position lookup
///
/// The answer is asynchronous: a successful request only means a fix was
/// asked for. The host hands the outcome back through
/// [`Controller::resolve_location`](super::Controller::resolve_location).
pub trait Geolocation {
    /// Asks for the current position
    ///
    /// # Errors
    ///
    /// Returns an error if no request could be issued.
    fn request_position(&self) -> Result<(), Error>;
}

/// Text-to-speech announcements
pub trait Speech {
    /// Speaks `text` aloud
    ///
    /// # Errors
    ///
    /// Returns an error if speech is unavailable.
    fn speak(&self, text: &str) -> Result<(), Error>;

    /// Silences any announcement in progress
    fn cancel(&self);
}

/// Device vibration
pub trait Haptics {
    /// Vibrates following `pattern` (alternating on/off milliseconds)
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot vibrate.
    fn vibrate(&self, pattern: &[u32]) -> Result<(), Error>;
}

/// Phone dialer hand-off
pub trait Telephony {
    /// Opens the dialer for `number` (digits only)
    ///
    /// # Errors
    ///
    /// Returns an error if no dialer could be opened.
    fn dial(&self, number: &str) -> Result<(), Error>;
}

/// Clipboard-like surface for manual dialing
pub trait Clipboard {
    /// Places `text` on the clipboard
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is not writable.
    fn copy(&self, text: &str) -> Result<(), Error>;
}

/// Outgoing channel carrying alerts to an emergency contact
///
/// Delivery is fire-and-forget: the controller logs failures and moves on.
pub trait Relay {
    /// Sends `broadcast` to `contact`
    ///
    /// # Errors
    ///
    /// Returns an error if the contact could not be reached.
    fn relay(&self, contact: &Contact, broadcast: &Broadcast) -> Result<(), Error>;
}

/// Fallback for a platform that offers none of the capabilities
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl Geolocation for Unsupported {
    fn request_position(&self) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}

impl Speech for Unsupported {
    fn speak(&self, _text: &str) -> Result<(), Error> {
        Err(Error::Unsupported)
    }

    fn cancel(&self) {}
}

impl Haptics for Unsupported {
    fn vibrate(&self, _pattern: &[u32]) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}

impl Telephony for Unsupported {
    fn dial(&self, _number: &str) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}

impl Clipboard for Unsupported {
    fn copy(&self, _text: &str) -> Result<(), Error> {
        Err(Error::Unsupported)
    }
}

/// Relay that only writes each broadcast to the log
///
/// Stands in for SMS and call gateways, none of which are integrated.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRelay;

impl Relay for LogRelay {
    fn relay(&self, contact: &Contact, broadcast: &Broadcast) -> Result<(), Error> {
        tracing::info!(
            contact = %contact.name,
            number = %contact.number,
            reference = %broadcast.reference(),
            "broadcast logged in place of delivery"
        );
        Ok(())
    }
}

/// The set of capabilities injected into a controller
///
/// Starts out with [`Unsupported`] everywhere and a [`LogRelay`]; the
/// `with_*` methods swap in real implementations.
pub struct Capabilities {
    pub(super) geolocation: Box<dyn Geolocation>,
    pub(super) speech: Box<dyn Speech>,
    pub(super) haptics: Box<dyn Haptics>,
    pub(super) telephony: Box<dyn Telephony>,
    pub(super) clipboard: Box<dyn Clipboard>,
    pub(super) relay: Box<dyn Relay>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            geolocation: Box::new(Unsupported),
            speech: Box::new(Unsupported),
            haptics: Box::new(Unsupported),
            telephony: Box::new(Unsupported),
            clipboard: Box::new(Unsupported),
            relay: Box::new(LogRelay),
        }
    }
}

impl Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

impl Capabilities {
    /// Capabilities of a platform that supports nothing
    pub fn unsupported() -> Self {
        Self::default()
    }

    /// Replaces the geolocation capability
    #[must_use]
    pub fn with_geolocation(mut self, geolocation: impl Geolocation + 'static) -> Self {
        self.geolocation = Box::new(geolocation);
        self
    }

    /// Replaces the speech capability
    #[must_use]
    pub fn with_speech(mut self, speech: impl Speech + 'static) -> Self {
        self.speech = Box::new(speech);
        self
    }

    /// Replaces the haptics capability
    #[must_use]
    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    /// Replaces the telephony capability
    #[must_use]
    pub fn with_telephony(mut self, telephony: impl Telephony + 'static) -> Self {
        self.telephony = Box::new(telephony);
        self
    }

    /// Replaces the clipboard capability
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    /// Replaces the outgoing relay
    #[must_use]
    pub fn with_relay(mut self, relay: impl Relay + 'static) -> Self {
        self.relay = Box::new(relay);
        self
    }
}
