//! Candidate generator (§4.K): reads a PMI-results TSV, filters by
//! minimum score, builds forward/backward n-gram tries, and emits
//! [`WordCandidate`]s capped by length and count.
//!
//! Grounded on
//! `original_source/src/core/word_extraction/generator.cpp`'s
//! `readPmiResults` (header sniffing via a literal "ngram" check,
//! malformed-line skipping with a warning, non-negative `minPmiScore`
//! validation) and `generateCandidatesParallel`/`Sequential`
//! (auto-thread-detection, global top-K truncation regardless of
//! chunking).

use crate::error::{Error, Result};
use crate::scheduler;
use crate::trie::NgramTrie;

use super::types::WordCandidate;

/// One parsed row of a PMI-results file, before the `minPmiScore` filter
/// and candidate-length cap are applied.
struct PmiRow {
    ngram: String,
    score: f64,
    frequency: u32,
}

/// Reads `path` as a PMI-results TSV (`ngram\tscore\tfrequency`, optional
/// header line containing the literal "ngram"), keeping only rows whose
/// score is at least `min_pmi_score`. Malformed lines are skipped with a
/// warning, not raised; a file containing zero parseable rows raises
/// [`Error::MalformedInput`]. A missing file is [`Error::NotFound`].
fn read_pmi_results(path: &str, min_pmi_score: f64) -> Result<Vec<PmiRow>> {
    if min_pmi_score < 0.0 {
        return Err(Error::invalid_argument("minPmiScore must be non-negative"));
    }

    let lines = crate::io::read_all_lines(path, |_| {})?;
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    let mut valid_line_count = 0usize;

    let has_header = lines[0].contains("ngram");
    let data_lines = if has_header { &lines[1..] } else { &lines[..] };

    for line in data_lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (ngram, score, frequency) = match (fields.next(), fields.next(), fields.next()) {
            (Some(ngram), Some(score_str), Some(freq_str)) => {
                match (score_str.trim().parse::<f64>(), freq_str.trim().parse::<u32>()) {
                    (Ok(score), Ok(freq)) => (ngram, score, freq),
                    _ => {
                        tracing::warn!(line = %line, "malformed PMI-results line, skipping");
                        continue;
                    }
                }
            }
            _ => {
                tracing::warn!(line = %line, "malformed PMI-results line, skipping");
                continue;
            }
        };

        valid_line_count += 1;
        if score >= min_pmi_score {
            rows.push(PmiRow { ngram: ngram.to_string(), score, frequency });
        }
    }

    if valid_line_count == 0 {
        return Err(Error::MalformedInput {
            path: std::path::PathBuf::from(path),
            reason: "no valid rows found".to_string(),
        });
    }

    Ok(rows)
}

/// Generates [`WordCandidate`]s from a PMI-results file. An empty file or
/// zero accepted candidates is a valid empty result, not an error.
///
/// Builds a forward and a backward [`NgramTrie`] over the accepted rows
/// (the backward trie keyed on each n-gram reversed) so downstream
/// consumers can do prefix/suffix lookups over the candidate set; the
/// generator itself only returns the flat candidate list.
pub fn generate(
    pmi_results_path: &str,
    min_pmi_score: f64,
    max_candidate_length: u32,
    max_candidates: u32,
    threads: u32,
    use_parallel: bool,
) -> Result<(Vec<WordCandidate>, NgramTrie, NgramTrie)> {
    let rows = read_pmi_results(pmi_results_path, min_pmi_score)?;

    let mut forward = NgramTrie::new();
    let mut backward = NgramTrie::new();
    for row in &rows {
        forward.add(&row.ngram, row.score, row.frequency);
        let reversed: String = row.ngram.chars().rev().collect();
        backward.add(&reversed, row.score, row.frequency);
    }

    let workers = scheduler::resolve_workers(threads as usize);
    let candidates = if use_parallel && workers > 1 && rows.len() >= 1000 {
        generate_parallel(&rows, max_candidate_length, max_candidates, workers)
    } else {
        generate_sequential(&rows, max_candidate_length, max_candidates)
    };

    Ok((candidates, forward, backward))
}

fn to_candidate(row: &PmiRow, max_candidate_length: u32) -> Option<WordCandidate> {
    if row.ngram.chars().count() as u32 > max_candidate_length {
        return None;
    }
    Some(WordCandidate::new(row.ngram.clone(), row.score, row.frequency))
}

fn generate_sequential(rows: &[PmiRow], max_candidate_length: u32, max_candidates: u32) -> Vec<WordCandidate> {
    let mut candidates: Vec<WordCandidate> =
        rows.iter().filter_map(|row| to_candidate(row, max_candidate_length)).collect();
    truncate_top_by_score(&mut candidates, max_candidates);
    candidates
}

fn generate_parallel(
    rows: &[PmiRow],
    max_candidate_length: u32,
    max_candidates: u32,
    workers: usize,
) -> Vec<WordCandidate> {
    use rayon::prelude::*;

    let ranges = scheduler::chunk_ranges(rows.len(), workers);
    let mut candidates: Vec<WordCandidate> = ranges
        .par_iter()
        .flat_map(|&(start, end)| {
            rows[start..end].iter().filter_map(|row| to_candidate(row, max_candidate_length)).collect::<Vec<_>>()
        })
        .collect();

    // Chunking must not change which candidates ultimately survive: the
    // sort-and-truncate step below is global, so the split above is purely
    // a parallelism detail (§4.K).
    truncate_top_by_score(&mut candidates, max_candidates);
    candidates
}

fn truncate_top_by_score(candidates: &mut Vec<WordCandidate>, max_candidates: u32) {
    if candidates.len() > max_candidates as usize {
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(max_candidates as usize);
    }
}
