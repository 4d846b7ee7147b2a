//! PMI scorer (§4.H): joint/marginal probability computation over an
//! n-gram count map, with deterministic top-K selection.
//!
//! Grounded on `original_source/src/core/pmi.cpp`'s `calculatePmiScores`
//! (the log2(joint/marginal-product) formula, the n=1 frequency
//! degeneration, the zero-total/zero-marginal numeric guards) and its
//! `calculatePmiWithStructuredProgress` phase-weight allocation (Reading
//! 0.0-0.3, Processing 0.3-0.8, Calculating 0.8-0.9, Writing 0.9-1.0).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io;
use crate::ngram_counter::{count_ngrams_parallel, resolve_workers};
use crate::progress::{phase_overall, Phase, ProgressEvent, Reporter};
use crate::unicode::generate_ngrams;

/// A single PMI result row: the n-gram, its score, and its raw frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmiItem {
    pub ngram: String,
    pub score: f64,
    pub frequency: u32,
}

/// Options controlling a PMI scoring run. Defaults mirror
/// `suzume_feedmill.h`'s `PmiOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmiOptions {
    pub n: u32,
    pub top_k: u32,
    pub min_freq: u32,
    pub threads: u32,
    pub progress_step: f64,
    pub verbose: bool,
}

impl Default for PmiOptions {
    fn default() -> Self {
        PmiOptions { n: 2, top_k: 2500, min_freq: 3, threads: 0, progress_step: 0.05, verbose: false }
    }
}

impl PmiOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3).contains(&self.n) {
            return Err(Error::invalid_argument(format!("n must be 1, 2, or 3, got {}", self.n)));
        }
        if self.top_k < 1 {
            return Err(Error::invalid_argument("topK must be at least 1"));
        }
        if self.min_freq < 1 {
            return Err(Error::invalid_argument("minFreq must be at least 1"));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(Error::invalid_argument("progressStep must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Statistics returned alongside the PMI item list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PmiStats {
    pub grams: u64,
    pub distinct_ngrams: u64,
    pub elapsed_ms: u64,
    pub mb_per_sec: f64,
}

/// Computes PMI scores for every n-gram in `counts` with a count at or
/// above `min_freq`. For `n == 1` this degenerates to raw frequency
/// (§4.H: "no PMI computable"); for `n >= 2` it's
/// `log2(P(joint) / prod(P(marginal)))` over code-point-level unigram
/// decomposition.
///
/// Never emits NaN or infinity: a zero total yields an empty result, and
/// any n-gram whose marginal product is zero is skipped rather than
/// dividing by zero.
pub fn score_ngrams(counts: &HashMap<String, u32>, n: u32, min_freq: u32) -> Vec<PmiItem> {
    if n <= 1 {
        return counts
            .iter()
            .filter(|(_, &count)| count >= min_freq)
            .map(|(ngram, &count)| PmiItem { ngram: ngram.clone(), score: count as f64, frequency: count })
            .collect();
    }

    let total: u64 = counts.values().map(|&c| c as u64).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut component_counts: HashMap<String, u64> = HashMap::new();
    for (ngram, &count) in counts {
        if count < min_freq {
            continue;
        }
        for component in generate_ngrams(ngram, 1) {
            *component_counts.entry(component).or_insert(0) += count as u64;
        }
    }

    let mut results = Vec::new();
    for (ngram, &count) in counts {
        if count < min_freq {
            continue;
        }
        let components = generate_ngrams(ngram, 1);
        if components.is_empty() {
            continue;
        }

        let mut marginal_product = 1.0f64;
        let mut skip = false;
        for component in &components {
            match component_counts.get(component) {
                Some(&component_count) if component_count > 0 => {
                    marginal_product *= component_count as f64 / total as f64;
                }
                _ => {
                    skip = true;
                    break;
                }
            }
        }
        if skip || marginal_product == 0.0 {
            continue;
        }

        let joint_prob = count as f64 / total as f64;
        let score = (joint_prob / marginal_product).log2();
        if score.is_finite() {
            results.push(PmiItem { ngram: ngram.clone(), score, frequency: count });
        }
    }
    results
}

/// Sorts `items` by score descending, tie-broken by frequency descending
/// then n-gram lexicographic order, and truncates to `top_k` (§4.H, §8).
pub fn select_top_k(mut items: Vec<PmiItem>, top_k: u32) -> Vec<PmiItem> {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.frequency.cmp(&a.frequency))
            .then_with(|| a.ngram.cmp(&b.ngram))
    });
    items.truncate(top_k as usize);
    items
}

/// Runs the full PMI pipeline over `input_path`, writing a
/// `ngram\tpmi\tfrequency` TSV to `output_path` (or skipping the write for
/// the `null` sentinel), and reports structured progress through
/// `on_progress`.
pub fn compute_pmi(
    input_path: &str,
    output_path: &str,
    options: &PmiOptions,
    mut on_progress: impl FnMut(ProgressEvent),
) -> Result<(Vec<PmiItem>, PmiStats)> {
    options.validate()?;
    let start = Instant::now();

    let mut reporter = Reporter::new(options.progress_step, |e| on_progress(e));
    reporter.start();

    let text = io::read_file_content(input_path, |ratio| {
        reporter.report(Phase::Reading, ratio, phase_overall(ratio, (0.0, 0.3)));
    })?;
    let file_size = text.len() as u64;

    reporter.report(Phase::Processing, 0.0, 0.3);

    let workers = resolve_workers(options.threads as usize);
    if options.verbose {
        tracing::debug!(n = options.n, top_k = options.top_k, min_freq = options.min_freq, threads = workers, "PMI calculation started");
    }
    let counts = count_ngrams_parallel(&text, options.n as usize, workers);
    reporter.report(Phase::Processing, 1.0, 0.8);

    reporter.report(Phase::Calculating, 0.0, 0.8);
    let scored = score_ngrams(&counts, options.n, options.min_freq);
    reporter.report(Phase::Calculating, 1.0, 0.9);

    let top = select_top_k(scored, options.top_k);

    reporter.report(Phase::Writing, 0.0, 0.9);
    if !io::is_discard(output_path) {
        let header = "ngram\tpmi\tfrequency".to_string();
        let rows: Vec<String> = top.iter().map(|item| format!("{}\t{}\t{}", item.ngram, item.score, item.frequency)).collect();
        let mut all = Vec::with_capacity(rows.len() + 1);
        all.push(header.as_str());
        all.extend(rows.iter().map(|s| s.as_str()));
        io::write_lines(output_path, all)?;
    }
    reporter.finish();

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let mb_per_sec = if elapsed_ms > 0 {
        (file_size as f64 / (1024.0 * 1024.0)) / (elapsed_ms as f64 / 1000.0)
    } else {
        0.0
    };

    if options.verbose {
        tracing::debug!(grams = counts.len(), elapsed_ms, mb_per_sec, "PMI calculation completed");
    }

    let stats = PmiStats { grams: counts.len() as u64, distinct_ngrams: top.len() as u64, elapsed_ms, mb_per_sec };
    Ok((top, stats))
}
