//! Incident reference numbers
//!
//! Each dispatched alert or quick message gets a short reference number that
//! can be read out over the phone. References are shown as `SOS-` followed by
//! six uppercase hexadecimal digits.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Minimum value for generated references (six hex digits: 100000)
const MIN_VALUE: u32 = 0x10_0000;
/// Exclusive upper bound for generated references (0x1000000)
const MAX_VALUE: u32 = 0x100_0000;
/// Prefix shown in front of the hex digits
const PREFIX: &str = "SOS-";

/// A short reference number attached to an outgoing alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IncidentId(u32);

impl IncidentId {
    /// Creates a new random reference
    ///
    /// The value is drawn from a range that always renders as exactly six
    /// hexadecimal digits.
    pub fn new() -> Self {
        Self(fastrand::u32(MIN_VALUE..MAX_VALUE))
    }
}

impl Default for IncidentId {
    /// Creates a new random reference (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}{:06X}", self.0)
    }
}

/// Errors returned when parsing a reference string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The string does not start with `SOS-`
    #[error("reference must start with {PREFIX}")]
    MissingPrefix,
    /// The digits after the prefix are not hexadecimal
    #[error("invalid reference digits: {0}")]
    Digits(#[from] ParseIntError),
}

impl FromStr for IncidentId {
    type Err = ParseError;

    /// Parses a reference from its `SOS-XXXXXX` form
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingPrefix` if the prefix is absent, or
    /// `ParseError::Digits` if the remainder is not hexadecimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(PREFIX).ok_or(ParseError::MissingPrefix)?;
        Ok(Self(u32::from_str_radix(digits, 16)?))
    }
}

impl Serialize for IncidentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IncidentId {
    fn deserialize<D>(deserializer: D) -> Result<IncidentId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IncidentId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
