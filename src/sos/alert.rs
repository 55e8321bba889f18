//! Alert payloads and quick message categories
//!
//! Two kinds of broadcast leave the controller: the countdown [`Alert`] and
//! the immediate [`QuickMessage`]. Both carry a reference number, a UTC
//! timestamp and the best-effort location.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use enum_map::Enum;
use heck::ToShoutySnakeCase;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::sos::{ALERT_KIND, QUICK_MESSAGE_SENDER},
    device::DeviceId,
    incident::IncidentId,
};

use super::capabilities::Location;

/// Category of a quick message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickMessageCategory {
    /// Someone needs medical attention
    Medical,
    /// Fire detected, evacuation required
    Fire,
    /// Security incident, lockdown
    Security,
    /// Severe weather, shelter in place
    Weather,
}

impl QuickMessageCategory {
    /// Every category, in display order
    pub const ALL: [Self; 4] = [Self::Medical, Self::Fire, Self::Security, Self::Weather];

    /// Lowercase name of the category
    pub fn name(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Fire => "fire",
            Self::Security => "security",
            Self::Weather => "weather",
        }
    }

    /// Canned message sent for the category
    pub fn message(self) -> &'static str {
        match self {
            Self::Medical => {
                "MEDICAL EMERGENCY: Student/staff needs immediate medical attention."
            }
            Self::Fire => "FIRE EMERGENCY: Fire detected, immediate evacuation required.",
            Self::Security => {
                "SECURITY THREAT: Potential security incident, lockdown procedures initiated."
            }
            Self::Weather => {
                "SEVERE WEATHER: Dangerous weather conditions, shelter procedures activated."
            }
        }
    }

    /// Heading shown once the message is out, e.g. `FIRE ALERT SENT`
    pub fn heading(self) -> String {
        format!("{} ALERT SENT", self.name().to_shouty_snake_case())
    }

    /// Spoken confirmation after sending
    pub fn announcement(self) -> String {
        format!("{} emergency alert sent to school administration.", self.name())
    }
}

impl Display for QuickMessageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unknown category name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown quick message category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for QuickMessageCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// Payload of a countdown alert
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Reference number
    pub reference: IncidentId,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// Best-effort device location
    pub location: Option<Location>,
    /// Emergency type tag
    pub kind: String,
    /// Device that raised the alert
    pub device: DeviceId,
    /// Free-form description of the device
    pub device_info: String,
}

impl Alert {
    /// Builds an alert stamped with the current time
    pub fn new(location: Option<Location>, device: DeviceId, device_info: &str) -> Self {
        Self {
            reference: IncidentId::new(),
            timestamp: Utc::now(),
            location,
            kind: ALERT_KIND.to_owned(),
            device,
            device_info: device_info.to_owned(),
        }
    }
}

/// Payload of a quick message
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickMessage {
    /// Reference number
    pub reference: IncidentId,
    /// Category of the message
    pub category: QuickMessageCategory,
    /// Canned message text
    pub message: String,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Best-effort device location
    pub location: Option<Location>,
    /// Sender label
    pub sender: String,
}

impl QuickMessage {
    /// Builds the canned message for `category`, stamped with the current time
    pub fn new(category: QuickMessageCategory, location: Option<Location>) -> Self {
        Self {
            reference: IncidentId::new(),
            category,
            message: category.message().to_owned(),
            timestamp: Utc::now(),
            location,
            sender: QUICK_MESSAGE_SENDER.to_owned(),
        }
    }
}

/// Anything relayed to the emergency contacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
pub enum Broadcast {
    /// Countdown alert
    Alert(Alert),
    /// Immediate quick message
    Quick(QuickMessage),
}

impl Broadcast {
    /// Reference number of the broadcast
    pub fn reference(&self) -> IncidentId {
        match self {
            Self::Alert(alert) => alert.reference,
            Self::Quick(quick) => quick.reference,
        }
    }

    /// Location attached to the broadcast, if any
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Alert(alert) => alert.location,
            Self::Quick(quick) => quick.location,
        }
    }

    /// Whether this is a countdown alert
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert(_))
    }
}
