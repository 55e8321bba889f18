//! Timed quiz session
//!
//! A session walks a learner through the catalog under a five minute clock.
//! It moves through three phases: not started, in progress and completed.
//! The clock is driven by one-second alarms scheduled through the host; when
//! it runs out the session submits itself.

use std::collections::HashMap;

use once_cell_serde::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    constants::quiz::{TICK_SECONDS, TIME_LIMIT_SECONDS},
    session::Tunnel,
};

use super::{
    Error,
    catalog::Catalog,
    grading::{self, Report, Tier},
};

/// Lifecycle stage of a quiz session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Intro screen, clock not running
    #[default]
    NotStarted,
    /// Questions are being answered and the clock is running
    InProgress,
    /// Answers are locked in and graded
    Completed,
}

/// Update messages sent to the view during a quiz
#[serde_with::serde_as]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A new attempt began
    Started {
        /// Number of questions in the attempt
        question_count: usize,
        /// Time available for the attempt
        #[serde_as(as = "serde_with::DurationSeconds<u64>")]
        time_limit: Duration,
    },
    /// The attempt was submitted, by the learner or by the clock
    Completed {
        /// Number of correct answers
        score: usize,
        /// Number of questions
        count: usize,
        /// Outcome bucket
        tier: Tier,
    },
}

/// Alarm messages driving the quiz clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second has passed for the given attempt
    Tick {
        /// Attempt number that scheduled the tick
        attempt: u64,
    },
}

/// Snapshot of a quiz for a view that is (re)rendered
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Intro screen
    NotStarted {
        /// Number of questions in the catalog
        question_count: usize,
        /// Seconds available once started
        time_limit_seconds: u32,
    },
    /// A question is on screen
    Question {
        /// Index of the current question (0-based)
        index: usize,
        /// Total number of questions
        count: usize,
        /// The prompt
        text: String,
        /// The answer options
        options: Vec<String>,
        /// Option already chosen for this question
        selected: Option<usize>,
        /// Seconds left on the clock
        remaining_seconds: u32,
    },
    /// Graded results
    Results(Report),
}

/// A single quiz attempt over a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    catalog: Catalog,

    // Runtime State
    /// Index of the question on screen
    current_index: usize,
    /// Chosen option per question index; unanswered questions are absent
    answers: HashMap<usize, usize>,
    /// Seconds left on the clock
    remaining_seconds: u32,
    /// Current lifecycle stage
    phase: Phase,
    /// Incremented on every start and retake so older ticks are ignored
    attempt: u64,
    /// Graded report, computed once after completion
    #[serde(skip)]
    report: OnceCell<Report>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl Session {
    /// Creates a session over `catalog` in the not started phase
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            current_index: 0,
            answers: HashMap::new(),
            remaining_seconds: TIME_LIMIT_SECONDS,
            phase: Phase::NotStarted,
            attempt: 0,
            report: OnceCell::new(),
        }
    }

    /// Starts a fresh attempt
    ///
    /// Whatever the previous state, the session is reset to the first
    /// question with no answers and a full clock, and the first tick is
    /// scheduled. Ticks belonging to earlier attempts become stale.
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for view notifications
    /// * `S` - Function type for scheduling alarm messages
    pub fn start<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        mut schedule_message: S,
    ) {
        self.reset();
        self.phase = Phase::InProgress;

        tracing::info!(attempt = self.attempt, "quiz started");
        tunnel.send_message(
            &UpdateMessage::Started {
                question_count: self.catalog.len(),
                time_limit: Duration::from_secs(u64::from(TIME_LIMIT_SECONDS)),
            }
            .into(),
        );

        self.schedule_tick(&mut schedule_message);
    }

    /// Returns to the intro screen, discarding the current attempt
    pub fn retake(&mut self) {
        self.reset();
        tracing::debug!(attempt = self.attempt, "quiz reset for retake");
    }

    fn reset(&mut self) {
        self.attempt += 1;
        self.phase = Phase::NotStarted;
        self.current_index = 0;
        self.answers.clear();
        self.remaining_seconds = TIME_LIMIT_SECONDS;
        self.report = OnceCell::new();
    }

    fn schedule_tick<S: FnMut(crate::AlarmMessage, Duration)>(&self, schedule_message: &mut S) {
        schedule_message(
            AlarmMessage::Tick {
                attempt: self.attempt,
            }
            .into(),
            Duration::from_secs(TICK_SECONDS),
        );
    }

    fn change_state(&mut self, before: Phase, after: Phase) -> bool {
        if self.phase == before {
            self.phase = after;

            true
        } else {
            false
        }
    }

    /// Records `option` as the answer to the current question
    ///
    /// # Errors
    ///
    /// * `Error::NotInProgress` - The session is not accepting answers
    /// * `Error::OptionOutOfRange` - `option` is not an option of the current question
    pub fn select_answer(&mut self, option: usize) -> Result<(), Error> {
        if self.phase != Phase::InProgress {
            return Err(Error::NotInProgress);
        }
        let available = self
            .catalog
            .get(self.current_index)
            .map_or(0, |question| question.options().len());
        if option >= available {
            return Err(Error::OptionOutOfRange { option, available });
        }
        self.answers.insert(self.current_index, option);
        Ok(())
    }

    /// Moves to the next question; returns whether the index changed
    pub fn go_to_next(&mut self) -> bool {
        if self.current_index + 1 < self.catalog.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous question; returns whether the index changed
    pub fn go_to_previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Locks in the answers and grades the attempt
    ///
    /// Unanswered questions count as wrong. Returns `false` if the session
    /// was not in progress, in which case nothing happens.
    pub fn submit<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        if !self.change_state(Phase::InProgress, Phase::Completed) {
            return false;
        }

        let score = self.score();
        let tier = Tier::from_score(score);
        tracing::info!(
            attempt = self.attempt,
            score,
            count = self.catalog.len(),
            answered = self.answers.len(),
            remaining_seconds = self.remaining_seconds,
            ?tier,
            "quiz submitted"
        );
        tunnel.send_message(
            &UpdateMessage::Completed {
                score,
                count: self.catalog.len(),
                tier,
            }
            .into(),
        );

        true
    }

    /// Advances the clock by one second
    ///
    /// Has no effect unless the session is in progress. When the clock hits
    /// zero the attempt is submitted.
    pub fn tick<T: Tunnel>(&mut self, tunnel: &T) {
        if self.phase != Phase::InProgress {
            return;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            tracing::info!(attempt = self.attempt, "quiz time expired");
            self.submit(tunnel);
        }
    }

    /// Handles a scheduled clock alarm
    ///
    /// Ticks from an earlier attempt, or arriving after completion, are
    /// ignored. Otherwise the clock advances and the next tick is scheduled
    /// while the attempt is still running.
    ///
    /// # Type Parameters
    ///
    /// * `T` - Type implementing the Tunnel trait for view notifications
    /// * `S` - Function type for scheduling alarm messages
    pub fn receive_alarm<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        schedule_message: &mut S,
        message: &crate::AlarmMessage,
    ) {
        let crate::AlarmMessage::Quiz(AlarmMessage::Tick { attempt }) = message else {
            return;
        };

        if *attempt != self.attempt || self.phase != Phase::InProgress {
            tracing::debug!(
                alarm_attempt = attempt,
                attempt = self.attempt,
                "ignoring stale quiz tick"
            );
            return;
        }

        self.tick(tunnel);

        if self.phase == Phase::InProgress {
            self.schedule_tick(schedule_message);
        }
    }

    /// Number of correctly answered questions
    pub fn score(&self) -> usize {
        grading::score(&self.catalog, &self.answers)
    }

    /// Tier of the current score
    pub fn tier(&self) -> Tier {
        Tier::from_score(self.score())
    }

    /// Graded report, available once the attempt is completed
    pub fn report(&self) -> Option<&Report> {
        (self.phase == Phase::Completed)
            .then(|| {
                self.report
                    .get_or_init(|| Report::grade(&self.catalog, &self.answers))
            })
    }

    /// Current lifecycle stage
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the question on screen
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Option chosen for question `index`, if any
    pub fn answer(&self, index: usize) -> Option<usize> {
        self.answers.get(&index).copied()
    }

    /// Number of answered questions
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Whether the question on screen has an answer
    pub fn is_current_answered(&self) -> bool {
        self.answers.contains_key(&self.current_index)
    }

    /// Whether the question on screen is the last one
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.catalog.len()
    }

    /// Seconds left on the clock
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Clock formatted as `m:ss`
    pub fn remaining_display(&self) -> String {
        format!(
            "{}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    /// Position of the current question as a percentage of the catalog
    pub fn progress_percent(&self) -> f64 {
        if self.catalog.is_empty() {
            return 0.;
        }
        (self.current_index + 1) as f64 / self.catalog.len() as f64 * 100.
    }

    /// The catalog this session runs over
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Builds a snapshot message for the current phase
    pub fn state_message(&self) -> SyncMessage {
        match self.phase {
            Phase::NotStarted => SyncMessage::NotStarted {
                question_count: self.catalog.len(),
                time_limit_seconds: TIME_LIMIT_SECONDS,
            },
            Phase::InProgress => {
                let question = self.catalog.get(self.current_index);
                SyncMessage::Question {
                    index: self.current_index,
                    count: self.catalog.len(),
                    text: question.map(|q| q.text().to_owned()).unwrap_or_default(),
                    options: question.map(|q| q.options().to_vec()).unwrap_or_default(),
                    selected: self.answer(self.current_index),
                    remaining_seconds: self.remaining_seconds,
                }
            }
            Phase::Completed => SyncMessage::Results(
                self.report
                    .get_or_init(|| Report::grade(&self.catalog, &self.answers))
                    .clone(),
            ),
        }
    }

    /// Sends the current snapshot through `tunnel`
    pub fn sync<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message().into());
    }
}
