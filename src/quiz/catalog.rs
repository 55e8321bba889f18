//! Question catalog
//!
//! The quiz runs over a fixed, immutable list of multiple choice questions.
//! Every question offers exactly four options and names one of them as the
//! correct answer.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::quiz::{
    MAX_EXPLANATION_LENGTH, MAX_OPTION_LENGTH, MAX_TEXT_LENGTH, OPTION_COUNT, QUESTION_COUNT,
};

use super::Error;

/// Largest valid option index
const LAST_OPTION: usize = OPTION_COUNT - 1;

/// A single multiple choice question
///
/// The `correct_index` is bounded by the option count, and the option list
/// must hold exactly [`OPTION_COUNT`] entries, so a validated question always
/// points at an existing option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The prompt shown to the learner
    #[garde(length(min = 1, max = MAX_TEXT_LENGTH))]
    text: String,
    /// The answer options, in display order
    #[garde(
        length(equal = OPTION_COUNT),
        inner(length(min = 1, max = MAX_OPTION_LENGTH))
    )]
    options: Vec<String>,
    /// Index of the correct option
    #[garde(range(max = LAST_OPTION))]
    correct_index: usize,
    /// Explanation shown once the quiz is graded
    #[garde(length(max = MAX_EXPLANATION_LENGTH))]
    explanation: String,
}

impl Question {
    /// Creates a question from its prompt, options, answer and explanation
    pub fn new(
        text: &str,
        options: [&str; OPTION_COUNT],
        correct_index: usize,
        explanation: &str,
    ) -> Self {
        Self {
            text: text.to_owned(),
            options: options.into_iter().map(str::to_owned).collect_vec(),
            correct_index,
            explanation: explanation.to_owned(),
        }
    }

    /// The prompt shown to the learner
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The answer options in display order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the correct option
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the correct option
    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map_or("", String::as_str)
    }

    /// Text of an option, if the index exists
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Explanation shown after grading
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Whether `selected` is the correct option for this question
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct_index)
    }
}

/// The ordered, immutable list of questions of one quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Catalog {
    #[garde(length(equal = QUESTION_COUNT), dive)]
    questions: Vec<Question>,
}

impl Catalog {
    /// Builds a catalog after validating every question
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCatalog` if the list does not hold exactly
    /// [`QUESTION_COUNT`] well-formed questions.
    pub fn new(questions: Vec<Question>) -> Result<Self, Error> {
        let catalog = Self { questions };
        catalog
            .validate()
            .map_err(|report| Error::InvalidCatalog(report.to_string()))?;
        Ok(catalog)
    }

    /// Number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the catalog holds no question
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, if any
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Iterates over the questions in order
    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    /// The emergency preparedness question set shipped with the quiz
    pub fn standard() -> Self {
        Self {
            questions: vec![
                Question::new(
                    "What should you do first when you hear the fire alarm in school?",
                    [
                        "Pack your belongings quickly",
                        "Stop what you're doing and listen for instructions",
                        "Continue with your work",
                        "Look out the window to see if there's a fire",
                    ],
                    1,
                    "The first step is to stop immediately and listen for teacher instructions. This ensures everyone follows the proper evacuation procedure.",
                ),
                Question::new(
                    "During an earthquake drill, what is the correct 'Drop, Cover, and Hold On' procedure?",
                    [
                        "Drop to the floor, cover your head, hold onto a desk",
                        "Drop your books, cover your eyes, hold your breath",
                        "Drop to your knees, cover under a table, hold on until shaking stops",
                        "Drop everything, cover your ears, hold onto a friend",
                    ],
                    2,
                    "Drop to your hands and knees, take cover under a sturdy desk or table, and hold on to your shelter while protecting your head and neck.",
                ),
                Question::new(
                    "What information should you provide when calling emergency services?",
                    [
                        "Only your name",
                        "Location, type of emergency, number of people involved",
                        "Just the address",
                        "Your age and grade level",
                    ],
                    1,
                    "Always provide: your location, what type of emergency it is, how many people are involved, and any immediate dangers.",
                ),
                Question::new(
                    "In a lockdown situation, what should students do?",
                    [
                        "Hide under desks and stay quiet",
                        "Lock doors, turn off lights, move away from windows, stay quiet",
                        "Exit the building immediately",
                        "Call their parents",
                    ],
                    1,
                    "During lockdown: secure the room (lock doors), turn off lights, move away from windows and doors, remain quiet until given all-clear by authorities.",
                ),
                Question::new(
                    "How often should schools conduct fire drills?",
                    [
                        "Once a year",
                        "Once a semester",
                        "Monthly or as required by local regulations",
                        "Only when there's an actual fire",
                    ],
                    2,
                    "Most regulations require monthly fire drills to ensure students and staff are familiar with evacuation procedures.",
                ),
                Question::new(
                    "What should you do if someone is having a medical emergency at school?",
                    [
                        "Try to help them yourself",
                        "Get a teacher or nurse immediately and call for help",
                        "Give them water",
                        "Move them to a more comfortable location",
                    ],
                    1,
                    "Never attempt medical treatment yourself. Get trained medical personnel (nurse) and trained staff immediately.",
                ),
                Question::new(
                    "During severe weather warnings, students should:",
                    [
                        "Go outside to see the weather",
                        "Move to designated safe areas away from windows",
                        "Continue normal activities",
                        "Go to the gymnasium",
                    ],
                    1,
                    "Move to predetermined safe areas (usually interior rooms/hallways) away from windows and potential flying debris.",
                ),
                Question::new(
                    "What is the universal sign for choking?",
                    [
                        "Pointing to your throat",
                        "Hands clutching the throat",
                        "Raising both hands",
                        "Lying down on the floor",
                    ],
                    1,
                    "The universal choking sign is hands clutching the throat. If you see this, get help immediately and alert trained personnel.",
                ),
                Question::new(
                    "In case of a chemical spill in the science lab, you should:",
                    [
                        "Clean it up yourself",
                        "Alert the teacher immediately and evacuate the area",
                        "Pour water on it",
                        "Ignore it if it's small",
                    ],
                    1,
                    "Never handle chemical spills yourself. Alert the teacher immediately and follow their evacuation instructions.",
                ),
                Question::new(
                    "What is the most important thing to remember during any emergency?",
                    [
                        "Stay calm and follow instructions",
                        "Run as fast as possible",
                        "Help everyone else first",
                        "Take photos for social media",
                    ],
                    0,
                    "Staying calm and following instructions from trained personnel is crucial for everyone's safety during emergencies.",
                ),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
