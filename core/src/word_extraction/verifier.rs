//! Candidate verifier (§4.L): drops candidates absent from the corpus or
//! present in an optional dictionary, then attaches a context window and
//! the two verification-stage scores.
//!
//! Grounded on
//! `original_source/src/core/word_extraction/verifier.cpp`'s
//! `CandidateVerifier` (`verifyCandidate`'s text-index membership check,
//! `loadDictionary`'s flat word-list, `calculateContextScore`'s
//! occurrences-over-ten cap, and `calculateStatisticalScore`'s
//! frequency-based base multiplied by length and multi-context bonuses).

use std::collections::HashSet;

use crate::error::Result;
use crate::io;
use crate::text_index::TextIndex;

use super::types::{VerifiedCandidate, WordCandidate};

/// Loads a flat newline-separated word list into a lookup set. Grounded on
/// the pack's lexicon-loading idiom (a plain `HashSet<String>` rather than
/// the teacher's FST-backed dictionary, since this spec has no serialized
/// dictionary format of its own).
pub fn load_dictionary(path: &str) -> Result<HashSet<String>> {
    let lines = io::read_all_lines(path, |_| {})?;
    Ok(lines.into_iter().filter(|l| !l.trim().is_empty()).collect())
}

/// Which of the §4.L verification stages are active. All default to on,
/// matching `WordExtractionOptions`'s defaults.
#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions {
    pub verify_in_original_text: bool,
    pub use_contextual_analysis: bool,
    pub use_statistical_validation: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions { verify_in_original_text: true, use_contextual_analysis: true, use_statistical_validation: true }
    }
}

/// Verifies one candidate against the corpus and, optionally, a known-word
/// dictionary. Returns `None` if `verifyInOriginalText` is on and the
/// candidate doesn't occur in the corpus at all, or if it's already a
/// known dictionary word.
pub fn verify_candidate(
    candidate: &WordCandidate,
    index: &TextIndex,
    dictionary: Option<&HashSet<String>>,
    options: &VerifyOptions,
) -> Option<VerifiedCandidate> {
    if options.verify_in_original_text && !index.contains(&candidate.text) {
        return None;
    }
    if let Some(dict) = dictionary {
        if dict.contains(&candidate.text) {
            return None;
        }
    }

    let positions = index.find_all(&candidate.text);
    let occurrences = positions.len();

    let context = if options.use_contextual_analysis {
        positions.first().map(|&p| index.context_default(p)).unwrap_or_default()
    } else {
        String::new()
    };
    let context_score = if options.use_contextual_analysis { calculate_context_score(occurrences) } else { 0.0 };
    let statistical_score = if options.use_statistical_validation {
        calculate_statistical_score(candidate, occurrences)
    } else {
        0.0
    };

    Some(VerifiedCandidate {
        text: candidate.text.clone(),
        score: candidate.score,
        frequency: candidate.frequency,
        context,
        context_score,
        statistical_score,
    })
}

/// Verifies every candidate, in order, against a shared corpus index.
pub fn verify_all(
    candidates: &[WordCandidate],
    index: &TextIndex,
    dictionary: Option<&HashSet<String>>,
    options: &VerifyOptions,
) -> Vec<VerifiedCandidate> {
    candidates.iter().filter_map(|c| verify_candidate(c, index, dictionary, options)).collect()
}

/// Occurrence count capped at 10 and normalized to `[0, 1]`: a word seen
/// ten or more times anywhere in the corpus gets full context credit.
fn calculate_context_score(occurrences: usize) -> f64 {
    (occurrences as f64 / 10.0).min(1.0)
}

/// `base = min(1, frequency/20)`, multiplied by `1 + min(0.3,
/// (codePoints-1)*0.1)` for length and, when the candidate occurs more
/// than once, by `1 + min(0.2, (occurrences-1)*0.05)`; the product is
/// capped at 1 (§4.L item 4).
fn calculate_statistical_score(candidate: &WordCandidate, occurrences: usize) -> f64 {
    let base = (candidate.frequency as f64 / 20.0).min(1.0);
    let code_points = candidate.code_point_len() as f64;
    let length_factor = 1.0 + (((code_points - 1.0).max(0.0)) * 0.1).min(0.3);
    let multi_context_factor = if occurrences > 1 {
        1.0 + (((occurrences - 1) as f64) * 0.05).min(0.2)
    } else {
        1.0
    };
    (base * length_factor * multi_context_factor).min(1.0)
}
