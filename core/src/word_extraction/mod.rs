//! Word extraction pipeline: generate candidates from a PMI table, verify
//! them against the source corpus, filter out noise, and rank what's
//! left (§4.K-§4.N).
//!
//! Grounded on `original_source/src/core/word_extraction.cpp`'s
//! `extractWords` orchestration (argument validation before any I/O, and
//! `convertToResult`'s stats assembly).

pub mod filter;
pub mod generator;
pub mod ranker;
pub mod types;
pub mod verifier;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io;
use crate::progress::{phase_overall, Phase, ProgressEvent, Reporter};
use crate::text_index::TextIndex;

pub use ranker::{RankWeights, RankingModel};
pub use types::{RankedCandidate, VerifiedCandidate, WordCandidate};
pub use verifier::VerifyOptions;

/// Options controlling a full word-extraction run. Defaults mirror
/// `suzume_feedmill.h`'s `WordExtractionOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordExtractionOptions {
    pub min_pmi_score: f64,
    pub max_candidate_length: u32,
    pub max_candidates: u32,
    pub verify_in_original_text: bool,
    pub use_contextual_analysis: bool,
    pub use_statistical_validation: bool,
    pub use_dictionary_lookup: bool,
    pub dictionary_path: Option<String>,
    pub min_length: u32,
    pub max_length: u32,
    pub min_score: f64,
    pub remove_substrings: bool,
    pub remove_overlapping: bool,
    pub language_code: String,
    pub use_language_specific_rules: bool,
    pub top_k: u32,
    pub ranking_model: RankingModel,
    pub pmi_weight: f64,
    pub length_weight: f64,
    pub context_weight: f64,
    pub statistical_weight: f64,
    pub use_parallel_processing: bool,
    pub threads: u32,
    pub progress_step: f64,
}

impl Default for WordExtractionOptions {
    fn default() -> Self {
        WordExtractionOptions {
            min_pmi_score: 1.0,
            max_candidate_length: 20,
            max_candidates: 100_000,
            verify_in_original_text: true,
            use_contextual_analysis: true,
            use_statistical_validation: true,
            use_dictionary_lookup: false,
            dictionary_path: None,
            min_length: 2,
            max_length: 20,
            min_score: 0.5,
            remove_substrings: true,
            remove_overlapping: true,
            language_code: "ja".to_string(),
            use_language_specific_rules: true,
            top_k: 1000,
            ranking_model: RankingModel::Combined,
            pmi_weight: 0.4,
            length_weight: 0.2,
            context_weight: 0.2,
            statistical_weight: 0.2,
            use_parallel_processing: true,
            threads: 0,
            progress_step: 0.05,
        }
    }
}

impl WordExtractionOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_pmi_score < 0.0 {
            return Err(Error::invalid_argument("minPmiScore must be non-negative"));
        }
        if self.max_candidate_length < 1 {
            return Err(Error::invalid_argument("maxCandidateLength must be at least 1"));
        }
        if self.max_candidates < 1 {
            return Err(Error::invalid_argument("maxCandidates must be at least 1"));
        }
        if self.min_length < 1 || self.max_length < self.min_length {
            return Err(Error::invalid_argument("minLength/maxLength must satisfy 1 <= minLength <= maxLength"));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(Error::invalid_argument("minScore must be in [0, 1]"));
        }
        if self.top_k < 1 {
            return Err(Error::invalid_argument("topK must be at least 1"));
        }
        if self.use_dictionary_lookup && self.dictionary_path.is_none() {
            return Err(Error::invalid_argument("useDictionaryLookup requires a dictionaryPath"));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(Error::invalid_argument("progressStep must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Statistics returned alongside the ranked candidate list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordExtractionStats {
    pub candidates_generated: u64,
    pub candidates_verified: u64,
    pub candidates_filtered: u64,
    pub candidates_ranked: u64,
    pub elapsed_ms: u64,
}

/// Runs the full pipeline: generate -> verify -> filter -> rank,
/// truncated to `topK` by the orchestration (not the ranker). `corpus_path`
/// is the original (post-normalization) text the candidates are verified
/// against; `pmi_results_path` is the PMI-engine TSV output.
pub fn extract_words(
    pmi_results_path: &str,
    corpus_path: &str,
    options: &WordExtractionOptions,
    mut on_progress: impl FnMut(ProgressEvent),
) -> Result<(Vec<RankedCandidate>, WordExtractionStats)> {
    options.validate()?;
    let start = Instant::now();

    let mut reporter = Reporter::new(options.progress_step, |e| on_progress(e));
    reporter.start();

    reporter.report(Phase::Reading, 0.0, 0.0);
    let corpus_text = io::read_file_content(corpus_path, |ratio| {
        reporter.report(Phase::Reading, ratio, phase_overall(ratio, (0.0, 0.2)));
    })?;
    let index = TextIndex::new(corpus_text);

    let dictionary = if options.use_dictionary_lookup {
        let path = options
            .dictionary_path
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("useDictionaryLookup requires a dictionaryPath"))?;
        Some(verifier::load_dictionary(path)?)
    } else {
        None
    };

    reporter.report(Phase::Processing, 0.0, 0.2);
    let (candidates, _forward_trie, _backward_trie) = generator::generate(
        pmi_results_path,
        options.min_pmi_score,
        options.max_candidate_length,
        options.max_candidates,
        options.threads,
        options.use_parallel_processing,
    )?;
    let candidates_generated = candidates.len() as u64;
    reporter.report(Phase::Processing, 0.4, 0.4);

    let verify_options = VerifyOptions {
        verify_in_original_text: options.verify_in_original_text,
        use_contextual_analysis: options.use_contextual_analysis,
        use_statistical_validation: options.use_statistical_validation,
    };
    let verified = verifier::verify_all(&candidates, &index, dictionary.as_ref(), &verify_options);
    let candidates_verified = verified.len() as u64;
    reporter.report(Phase::Processing, 0.7, 0.6);

    let filtered = filter::apply_all(
        verified,
        options.min_length,
        options.max_length,
        options.min_score,
        options.remove_substrings,
        options.remove_overlapping,
        options.use_language_specific_rules,
        &options.language_code,
    );
    let candidates_filtered = filtered.len() as u64;
    reporter.report(Phase::Processing, 1.0, 0.8);

    reporter.report(Phase::Calculating, 0.0, 0.8);
    let weights = RankWeights {
        pmi_weight: options.pmi_weight,
        length_weight: options.length_weight,
        context_weight: options.context_weight,
        statistical_weight: options.statistical_weight,
    };
    let mut ranked = ranker::rank(filtered, options.ranking_model, &weights);
    ranked.truncate(options.top_k as usize);
    let candidates_ranked = ranked.len() as u64;
    reporter.report(Phase::Calculating, 1.0, 0.95);

    reporter.report(Phase::Writing, 1.0, 1.0);
    reporter.finish();

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let stats =
        WordExtractionStats { candidates_generated, candidates_verified, candidates_filtered, candidates_ranked, elapsed_ms };

    Ok((ranked, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_options_validate() {
        assert!(WordExtractionOptions::default().validate().is_ok());
    }

    #[test]
    fn dictionary_lookup_without_path_is_invalid() {
        let options = WordExtractionOptions { use_dictionary_lookup: true, dictionary_path: None, ..Default::default() };
        assert!(options.validate().is_err());
    }

    #[test]
    fn min_length_greater_than_max_is_invalid() {
        let options = WordExtractionOptions { min_length: 10, max_length: 2, ..Default::default() };
        assert!(options.validate().is_err());
    }

    #[test]
    fn full_pipeline_extracts_candidates_from_small_corpus() {
        let dir = tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.txt");
        std::fs::write(&corpus_path, "人工知能の研究が進んでいる。人工知能は面白い研究分野だ。").unwrap();

        let pmi_path = dir.path().join("pmi.tsv");
        std::fs::write(&pmi_path, "ngram\tpmi\tfrequency\n人工知能\t5.2\t2\n研究\t3.0\t2\n").unwrap();

        let options = WordExtractionOptions {
            min_length: 2,
            max_length: 10,
            min_score: 0.0,
            min_pmi_score: 0.0,
            ..Default::default()
        };

        let (ranked, stats) =
            extract_words(pmi_path.to_str().unwrap(), corpus_path.to_str().unwrap(), &options, |_| {}).unwrap();

        assert!(stats.candidates_generated >= 2);
        assert!(!ranked.is_empty());
    }

    #[test]
    fn missing_corpus_file_is_not_found() {
        let dir = tempdir().unwrap();
        let pmi_path = dir.path().join("pmi.tsv");
        std::fs::write(&pmi_path, "a\t1.0\t1\n").unwrap();

        let err = extract_words(pmi_path.to_str().unwrap(), "/no/such/corpus.txt", &WordExtractionOptions::default(), |_| {})
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn emits_complete_progress_event_at_end() {
        let dir = tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.txt");
        std::fs::write(&corpus_path, "犬と猫の話").unwrap();
        let pmi_path = dir.path().join("pmi.tsv");
        std::fs::write(&pmi_path, "犬\t1.0\t1\n").unwrap();

        let mut events = Vec::new();
        let options = WordExtractionOptions { min_score: 0.0, min_pmi_score: 0.0, min_length: 1, ..Default::default() };
        extract_words(pmi_path.to_str().unwrap(), corpus_path.to_str().unwrap(), &options, |e| events.push(e)).unwrap();

        assert_eq!(events.last().unwrap().phase, Phase::Complete);
        assert_eq!(events.last().unwrap().overall_ratio, 1.0);
    }
}
