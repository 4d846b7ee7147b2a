//! Candidate ranker (§4.N): combines the per-candidate scores into one
//! final ranking score and produces the final sorted, tie-broken order.
//!
//! Grounded on `original_source/src/core/word_extraction/ranker.cpp`'s
//! `CandidateRanker` (the weighted-sum "combined" model, the Gaussian
//! length score peaking at four code points, and the plain-PMI
//! fallback model).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::types::{RankedCandidate, VerifiedCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankingModel {
    Combined,
    Pmi,
}

impl Default for RankingModel {
    fn default() -> Self {
        RankingModel::Combined
    }
}

/// `exp(-(codePoints-4)^2 / 8)`, peaking at 1.0 for a four-code-point
/// candidate and falling off symmetrically on either side.
fn length_score(code_points: usize) -> f64 {
    let x = code_points as f64 - 4.0;
    (-(x * x) / 8.0).exp()
}

/// Raw PMI clamped into `[0, 1]` by dividing by 10, matching the
/// original's normalization constant.
fn normalized_pmi(raw_pmi: f64) -> f64 {
    (raw_pmi / 10.0).min(1.0).max(0.0)
}

/// Weights for the `combined` ranking model. Defaults mirror
/// `suzume_feedmill.h`'s `WordExtractionOptions`.
#[derive(Debug, Clone, Copy)]
pub struct RankWeights {
    pub pmi_weight: f64,
    pub length_weight: f64,
    pub context_weight: f64,
    pub statistical_weight: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        RankWeights { pmi_weight: 0.4, length_weight: 0.2, context_weight: 0.2, statistical_weight: 0.2 }
    }
}

fn final_score(candidate: &VerifiedCandidate, model: RankingModel, weights: &RankWeights) -> f64 {
    match model {
        RankingModel::Pmi => candidate.score,
        RankingModel::Combined => {
            weights.pmi_weight * normalized_pmi(candidate.score)
                + weights.length_weight * length_score(candidate.code_point_len())
                + weights.context_weight * candidate.context_score
                + weights.statistical_weight * candidate.statistical_score
        }
    }
}

/// Scores every candidate, sorts by final score descending (ties broken
/// by frequency descending, then candidate text ascending), and returns
/// the full ranked list. Truncation to `topK` is the caller's
/// responsibility, not this function's (§4.N).
pub fn rank(candidates: Vec<VerifiedCandidate>, model: RankingModel, weights: &RankWeights) -> Vec<RankedCandidate> {
    let mut scored: Vec<(f64, VerifiedCandidate)> =
        candidates.into_iter().map(|c| (final_score(&c, model, weights), c)).collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.text.cmp(&b.text))
    });

    scored
        .into_iter()
        .map(|(score, c)| RankedCandidate { text: c.text, score, frequency: c.frequency, context: c.context })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vc(text: &str, score: f64, frequency: u32, context_score: f64, statistical_score: f64) -> VerifiedCandidate {
        VerifiedCandidate {
            text: text.to_string(),
            score,
            frequency,
            context: String::new(),
            context_score,
            statistical_score,
        }
    }

    #[test]
    fn length_score_peaks_at_four_code_points() {
        assert!((length_score(4) - 1.0).abs() < 1e-9);
        assert!(length_score(1) < length_score(4));
        assert!(length_score(8) < length_score(4));
    }

    #[test]
    fn normalized_pmi_clamps_to_unit_interval() {
        assert_eq!(normalized_pmi(20.0), 1.0);
        assert_eq!(normalized_pmi(-5.0), 0.0);
        assert_eq!(normalized_pmi(5.0), 0.5);
    }

    #[test]
    fn pmi_model_uses_raw_score_only() {
        let candidates = vec![vc("a", 3.0, 1, 0.0, 0.0), vc("b", 5.0, 1, 0.0, 0.0)];
        let ranked = rank(candidates, RankingModel::Pmi, &RankWeights::default());
        assert_eq!(ranked[0].text, "b");
    }

    #[test]
    fn combined_model_rewards_four_code_point_candidates() {
        let candidates = vec![vc("一二三四", 5.0, 10, 1.0, 1.0), vc("一", 5.0, 10, 1.0, 1.0)];
        let ranked = rank(candidates, RankingModel::Combined, &RankWeights::default());
        assert_eq!(ranked[0].text, "一二三四");
    }

    #[test]
    fn tie_break_by_frequency_then_text() {
        let candidates = vec![vc("zz", 1.0, 1, 0.5, 0.5), vc("aa", 1.0, 1, 0.5, 0.5)];
        let ranked = rank(candidates, RankingModel::Pmi, &RankWeights::default());
        assert_eq!(ranked[0].text, "aa");
        assert_eq!(ranked[1].text, "zz");
    }

    #[test]
    fn tie_break_prefers_higher_frequency_before_text() {
        let candidates = vec![vc("zz", 1.0, 1, 0.5, 0.5), vc("aa", 1.0, 9, 0.5, 0.5)];
        let ranked = rank(candidates, RankingModel::Pmi, &RankWeights::default());
        assert_eq!(ranked[0].text, "aa");
    }

    #[test]
    fn ranker_does_not_truncate() {
        let candidates: Vec<VerifiedCandidate> = (0..20).map(|i| vc(&format!("c{i}"), 1.0, 1, 0.5, 0.5)).collect();
        let ranked = rank(candidates, RankingModel::Pmi, &RankWeights::default());
        assert_eq!(ranked.len(), 20);
    }
}
