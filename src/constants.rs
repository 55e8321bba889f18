//! Configuration constants for the preparedness core
//!
//! This module contains the fixed policy values used throughout the crate:
//! quiz timing and grading thresholds, SOS countdown and alert patterns,
//! account form limits, and catalog bounds.

/// Quiz policy constants
pub mod quiz {
    /// Number of questions in the fixed catalog
    pub const QUESTION_COUNT: usize = 10;
    /// Number of answer options every question offers
    pub const OPTION_COUNT: usize = 4;
    /// Seconds a learner has to finish one attempt
    pub const TIME_LIMIT_SECONDS: u32 = 300;
    /// Seconds between two countdown ticks
    pub const TICK_SECONDS: u64 = 1;
    /// Minimum score for a certificate
    pub const CERTIFICATE_THRESHOLD: usize = 8;
    /// Minimum score to pass
    pub const PASS_THRESHOLD: usize = 6;
    /// Maximum length of a question prompt
    pub const MAX_TEXT_LENGTH: usize = 200;
    /// Maximum length of a single answer option
    pub const MAX_OPTION_LENGTH: usize = 200;
    /// Maximum length of an explanation shown after grading
    pub const MAX_EXPLANATION_LENGTH: usize = 400;
}

/// SOS controller constants
pub mod sos {
    /// Seconds between arming and the automatic dispatch
    pub const COUNTDOWN_SECONDS: u32 = 10;
    /// Seconds between two countdown ticks
    pub const TICK_SECONDS: u64 = 1;
    /// Vibration pulse pattern in milliseconds (on, off, on, ...)
    pub const VIBRATION_PATTERN: [u32; 5] = [200, 100, 200, 100, 200];
    /// Emergency type tag attached to a countdown alert
    pub const ALERT_KIND: &str = "General Emergency";
    /// Sender label attached to quick messages
    pub const QUICK_MESSAGE_SENDER: &str = "Emergency Response System";
}

/// Account form constants
pub mod account {
    /// Storage key holding the current user blob
    pub const STORAGE_KEY: &str = "user";
    /// Minimum password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 6;
    /// Maximum length of a display name
    pub const MAX_NAME_LENGTH: usize = 60;
    /// Password filled in for the demo accounts
    pub const DEMO_PASSWORD: &str = "demo123";
}

/// Training catalog constants
pub mod training {
    /// Maximum length of a video title
    pub const MAX_TITLE_LENGTH: usize = 100;
    /// Maximum length of a video description
    pub const MAX_DESCRIPTION_LENGTH: usize = 300;
    /// Upper bound of the five-star rating scale
    pub const MAX_RATING: f32 = 5.0;
}
