//! Emergency SOS
//!
//! A countdown that, unless cancelled, alerts a fixed list of emergency
//! contacts with the device's location, plus one-tap quick messages and a
//! call helper. Everything touching the device goes through the
//! [`capabilities`] traits.

pub mod alert;
pub mod capabilities;
pub mod contacts;
pub mod controller;

pub use alert::{Alert, Broadcast, QuickMessage, QuickMessageCategory};
pub use capabilities::{Capabilities, Location};
pub use contacts::{Contact, ContactKind};
pub use controller::{AlarmMessage, CallOutcome, Controller, SyncMessage, UpdateMessage};
