//! Emergency preparedness quiz
//!
//! A fixed catalog of multiple choice questions answered under a countdown,
//! graded into a score and a tier.

use serde::Serialize;
use thiserror::Error;

pub mod catalog;
pub mod engine;
pub mod grading;

pub use engine::{AlarmMessage, Phase, Session, SyncMessage, UpdateMessage};

/// Errors that can occur while answering or building a quiz
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The session is not accepting answers
    #[error("quiz is not in progress")]
    NotInProgress,
    /// The chosen option does not exist on the current question
    #[error("option {option} is out of range (question has {available} options)")]
    OptionOutOfRange {
        /// The rejected option index
        option: usize,
        /// Number of options on the current question
        available: usize,
    },
    /// The catalog failed validation
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}
