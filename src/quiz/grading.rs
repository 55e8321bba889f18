//! Grading policy and answer review
//!
//! Scores are plain counts of correctly answered questions. Unanswered
//! questions count as wrong. A score maps onto a [`Tier`] through two fixed
//! thresholds.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::constants::quiz::{CERTIFICATE_THRESHOLD, PASS_THRESHOLD};

use super::catalog::Catalog;

/// Qualitative outcome bucket derived from a score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Score high enough to earn the safety certificate
    CertificateEligible,
    /// Passing score without certificate
    Passed,
    /// Below the pass mark
    NeedsReview,
}

impl Tier {
    /// Maps a score onto its tier
    pub fn from_score(score: usize) -> Self {
        if score >= CERTIFICATE_THRESHOLD {
            Self::CertificateEligible
        } else if score >= PASS_THRESHOLD {
            Self::Passed
        } else {
            Self::NeedsReview
        }
    }

    /// Badge label of the tier
    pub fn label(self) -> &'static str {
        match self {
            Self::CertificateEligible => "Certificate Eligible",
            Self::Passed => "Passed",
            Self::NeedsReview => "Needs Review",
        }
    }

    /// One-line feedback shown under the score
    pub fn headline(self) -> &'static str {
        match self {
            Self::CertificateEligible => "Excellent! You're well-prepared for emergencies!",
            Self::Passed => "Good job! You have solid emergency knowledge.",
            Self::NeedsReview => {
                "Consider reviewing training materials for better preparedness."
            }
        }
    }

    /// Whether the tier counts as a pass
    pub fn is_passing(self) -> bool {
        !matches!(self, Self::NeedsReview)
    }
}

/// Counts questions whose recorded answer equals the correct option
///
/// `answers` is sparse; a missing entry never matches.
pub fn score(catalog: &Catalog, answers: &HashMap<usize, usize>) -> usize {
    catalog
        .iter()
        .enumerate()
        .filter(|(index, question)| question.is_correct(answers.get(index).copied()))
        .count()
}

/// Review of one question after grading
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// The question prompt
    pub question: String,
    /// Text of the correct option
    pub correct_answer: String,
    /// Text of the option the learner picked, if any
    pub selected_answer: Option<String>,
    /// Whether the pick was correct
    pub correct: bool,
    /// Explanation of the correct answer
    pub explanation: String,
}

/// Graded result of a completed attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Number of correct answers
    pub score: usize,
    /// Number of questions in the attempt
    pub count: usize,
    /// Outcome bucket
    pub tier: Tier,
    /// Feedback line for the tier
    pub headline: String,
    /// Per-question review in catalog order
    pub review: Vec<ReviewItem>,
}

impl Report {
    /// Grades a set of answers against a catalog
    pub fn grade(catalog: &Catalog, answers: &HashMap<usize, usize>) -> Self {
        let review = catalog
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let selected = answers.get(&index).copied();
                ReviewItem {
                    question: question.text().to_owned(),
                    correct_answer: question.correct_option().to_owned(),
                    selected_answer: selected
                        .and_then(|s| question.option(s))
                        .map(str::to_owned),
                    correct: question.is_correct(selected),
                    explanation: question.explanation().to_owned(),
                }
            })
            .collect_vec();
        let score = review.iter().filter(|item| item.correct).count();

        let tier = Tier::from_score(score);

        Self {
            score,
            count: catalog.len(),
            tier,
            headline: tier.headline().to_owned(),
            review,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn all_correct(catalog: &Catalog) -> HashMap<usize, usize> {
        catalog
            .iter()
            .enumerate()
            .map(|(i, q)| (i, q.correct_index()))
            .collect()
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(Tier::from_score(10), Tier::CertificateEligible);
        assert_eq!(Tier::from_score(8), Tier::CertificateEligible);
        assert_eq!(Tier::from_score(7), Tier::Passed);
        assert_eq!(Tier::from_score(6), Tier::Passed);
        assert_eq!(Tier::from_score(5), Tier::NeedsReview);
        assert_eq!(Tier::from_score(0), Tier::NeedsReview);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(Tier::CertificateEligible.label(), "Certificate Eligible");
        assert_eq!(Tier::Passed.label(), "Passed");
        assert_eq!(Tier::NeedsReview.label(), "Needs Review");
        assert!(Tier::Passed.is_passing());
        assert!(!Tier::NeedsReview.is_passing());
    }

    #[test]
    fn test_score_all_correct() {
        let catalog = Catalog::standard();
        assert_eq!(score(&catalog, &all_correct(&catalog)), 10);
    }

    #[test]
    fn test_score_empty_answers() {
        let catalog = Catalog::standard();
        assert_eq!(score(&catalog, &HashMap::new()), 0);
    }

    #[test]
    fn test_score_half_answered() {
        let catalog = Catalog::standard();
        let answers: HashMap<_, _> = all_correct(&catalog)
            .into_iter()
            .filter(|(i, _)| i % 2 == 0)
            .collect();
        assert_eq!(score(&catalog, &answers), 5);
    }

    #[test]
    fn test_score_wrong_answers() {
        let catalog = Catalog::standard();
        let answers: HashMap<_, _> = catalog
            .iter()
            .enumerate()
            .map(|(i, q)| (i, (q.correct_index() + 1) % 4))
            .collect();
        assert_eq!(score(&catalog, &answers), 0);
    }

    #[test]
    fn test_report_all_correct() {
        let catalog = Catalog::standard();
        let report = Report::grade(&catalog, &all_correct(&catalog));
        assert_eq!(report.score, 10);
        assert_eq!(report.count, 10);
        assert_eq!(report.tier, Tier::CertificateEligible);
        assert!(report.review.iter().all(|item| item.correct));
        assert_eq!(report.headline, Tier::CertificateEligible.headline());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["headline"],
            "Excellent! You're well-prepared for emergencies!"
        );
    }

    #[test]
    fn test_report_review_unanswered() {
        let catalog = Catalog::standard();
        let report = Report::grade(&catalog, &HashMap::from([(0, 0)]));
        assert_eq!(report.score, 0);
        assert_eq!(report.tier, Tier::NeedsReview);

        let first = &report.review[0];
        assert!(!first.correct);
        assert_eq!(first.selected_answer.as_deref(), Some("Pack your belongings quickly"));
        assert_eq!(
            first.correct_answer,
            "Stop what you're doing and listen for instructions"
        );

        let second = &report.review[1];
        assert_eq!(second.selected_answer, None);
    }

    #[test]
    fn test_review_item_skips_missing_selection() {
        let catalog = Catalog::standard();
        let report = Report::grade(&catalog, &HashMap::new());
        let json = serde_json::to_string(&report.review[0]).unwrap();
        assert!(!json.contains("selected_answer"));
    }
}
