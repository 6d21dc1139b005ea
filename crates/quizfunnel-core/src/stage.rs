//! # Stage Classification
//!
//! Buckets a respondent into one of four stages by majority vote over their
//! multiple-choice answers.
//!
//! ## Rules
//!
//! | Step | Rule |
//! |------|------|
//! | 1 | Every answer except the name question counts once toward its letter |
//! | 2 | Answers other than `A`..`D` are ignored |
//! | 3 | No recognized answers at all yields `A` |
//! | 4 | Ties resolve toward the earliest letter (`A` before `B` before ...) |

use crate::AnswerSet;
use crate::content::{StageContent, content_for};
use crate::primitives::NAME_QUESTION;
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE ENUM
// =============================================================================

/// The four result stages, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    A,
    B,
    C,
    D,
}

impl Stage {
    /// All stages in tie-break order.
    pub const ALL: [Stage; 4] = [Stage::A, Stage::B, Stage::C, Stage::D];

    /// The single-letter answer code for this stage.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Stage::A => "A",
            Stage::B => "B",
            Stage::C => "C",
            Stage::D => "D",
        }
    }

    /// Parse an answer code. Anything but `A`..`D` is not a stage.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Stage> {
        match code {
            "A" => Some(Stage::A),
            "B" => Some(Stage::B),
            "C" => Some(Stage::C),
            "D" => Some(Stage::D),
            _ => None,
        }
    }

    /// Position in tie-break order.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Stage::A => 0,
            Stage::B => 1,
            Stage::C => 2,
            Stage::D => 3,
        }
    }

    /// The static content block for this stage.
    #[must_use]
    pub fn content(&self) -> &'static StageContent {
        content_for(*self)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// STAGE TALLY
// =============================================================================

/// Per-stage answer counts for one answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageTally {
    counts: [u32; 4],
}

impl StageTally {
    /// Count the recognized answers of an answer set, skipping the name.
    #[must_use]
    pub fn from_answers(answers: &AnswerSet) -> Self {
        let mut tally = Self::default();
        for (question, answer) in answers.iter() {
            if question == NAME_QUESTION {
                continue;
            }
            if let Some(stage) = Stage::from_code(answer) {
                tally.record(stage);
            }
        }
        tally
    }

    /// Count one answer for a stage.
    pub fn record(&mut self, stage: Stage) {
        let slot = &mut self.counts[stage.index()];
        *slot = slot.saturating_add(1);
    }

    /// Number of answers counted for a stage.
    #[must_use]
    pub fn count(&self, stage: Stage) -> u32 {
        self.counts[stage.index()]
    }

    /// Total number of recognized answers.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0u32, |acc, c| acc.saturating_add(*c))
    }

    /// The winning stage: highest count, earliest letter on ties, `A` when empty.
    #[must_use]
    pub fn leader(&self) -> Stage {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Stage::A;
        }
        Stage::ALL
            .into_iter()
            .find(|stage| self.count(*stage) == max)
            .unwrap_or(Stage::A)
    }
}

/// Classify an answer set into its stage.
///
/// Total over any input: an empty set, or one with only the name or only
/// unrecognized codes, yields `Stage::A`.
#[must_use]
pub fn determine_stage(answers: &AnswerSet) -> Stage {
    StageTally::from_answers(answers).leader()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_answers_default_to_a() {
        assert_eq!(determine_stage(&AnswerSet::new()), Stage::A);
    }

    #[test]
    fn only_name_defaults_to_a() {
        assert_eq!(determine_stage(&answers(&[("q0", "D")])), Stage::A);
    }

    #[test]
    fn unrecognized_codes_are_ignored() {
        let set = answers(&[("q1", "E"), ("q2", "a"), ("q3", ""), ("q4", "AB")]);
        assert_eq!(StageTally::from_answers(&set).total(), 0);
        assert_eq!(determine_stage(&set), Stage::A);
    }

    #[test]
    fn strict_majority_wins() {
        let set = answers(&[("q1", "C"), ("q2", "C"), ("q3", "A"), ("q4", "D")]);
        assert_eq!(determine_stage(&set), Stage::C);
    }

    #[test]
    fn tie_resolves_to_earliest_letter() {
        let set = answers(&[("q1", "B"), ("q2", "A")]);
        assert_eq!(determine_stage(&set), Stage::A);

        let set = answers(&[("q1", "C"), ("q2", "B"), ("q3", "C"), ("q4", "B")]);
        assert_eq!(determine_stage(&set), Stage::B);
    }

    #[test]
    fn name_question_never_counts() {
        let set = answers(&[("q0", "D"), ("q1", "C")]);
        let tally = StageTally::from_answers(&set);
        assert_eq!(tally.count(Stage::D), 0);
        assert_eq!(determine_stage(&set), Stage::C);
    }

    #[test]
    fn stage_codes_roundtrip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_code(stage.code()), Some(stage));
        }
        assert_eq!(Stage::from_code("E"), None);
    }

    #[test]
    fn stage_display_is_letter() {
        assert_eq!(format!("{}", Stage::B), "B");
    }
}
