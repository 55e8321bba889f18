//! # Preparedness Core Library
//!
//! This library provides the core logic of a school emergency preparedness
//! app. It handles the timed safety quiz, the SOS alert countdown with its
//! quick messages and emergency calls, the signed-in user, mock account
//! forms, and the training video catalog.
//!
//! The state machines never own a timer. They ask their host to deliver an
//! [`AlarmMessage`] after a delay and react when the host hands it back, and
//! they report to the view through a [`session::Tunnel`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod auth;
pub mod device;
pub mod incident;
pub mod quiz;
pub mod session;
pub mod sos;
pub mod training;
pub mod user;

/// Snapshots sent to a view that is (re)rendered
///
/// A sync message carries the whole visible state of one state machine.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Quiz session snapshot
    Quiz(quiz::SyncMessage),
    /// SOS controller snapshot
    Sos(sos::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Incremental updates sent to a view
///
/// Update messages announce a single transition, such as a quiz being
/// submitted or an alert going out.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Quiz updates
    Quiz(quiz::UpdateMessage),
    /// SOS updates
    Sos(sos::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarms scheduled with the host and delivered back after a delay
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Quiz countdown alarms
    Quiz(quiz::AlarmMessage),
    /// SOS countdown alarms
    Sos(sos::AlarmMessage),
}
