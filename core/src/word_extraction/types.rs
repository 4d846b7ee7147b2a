//! Candidate types threaded through the four word-extraction stages
//! (§3: WordCandidate, VerifiedCandidate, RankedCandidate).

use serde::{Deserialize, Serialize};

/// A raw n-gram promoted from the PMI table to a candidate unknown word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCandidate {
    pub text: String,
    pub score: f64,
    pub frequency: u32,
    pub verified: bool,
}

impl WordCandidate {
    pub fn new(text: impl Into<String>, score: f64, frequency: u32) -> Self {
        WordCandidate { text: text.into(), score, frequency, verified: false }
    }

    pub fn code_point_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A [`WordCandidate`] extended with an extracted context window and the
/// two verification-stage scores, both in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedCandidate {
    pub text: String,
    pub score: f64,
    pub frequency: u32,
    pub context: String,
    pub context_score: f64,
    pub statistical_score: f64,
}

impl VerifiedCandidate {
    pub fn code_point_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A verified candidate carrying its single final ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub text: String,
    pub score: f64,
    pub frequency: u32,
    pub context: String,
}
