//! Normalizer orchestration (§4.F): the end-to-end "raw lines in, unique
//! normalized lines out" pipeline, single-threaded or chunked.
//!
//! Grounded on `original_source/src/core/normalize.cpp`'s
//! `normalize`/`normalizeParallel` (chunk-local dedup followed by a
//! cross-chunk merge that preserves first-seen order, and the
//! read/process/write phase-weight split used for progress reporting).
//! The mojibake-repair special case in the original's `processBatch` is
//! intentionally not carried forward.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::dedup::SeenSet;
use crate::error::{Error, Result};
use crate::io;
use crate::line_filter::should_exclude;
use crate::progress::{phase_overall, Phase, ProgressEvent, ProgressFormat, Reporter};
use crate::scheduler::{self, chunk_ranges, INLINE_ITEM_THRESHOLD};
use crate::unicode::{normalize_line, Form};

/// Options controlling a normalization run. Defaults mirror
/// `suzume_feedmill.h`'s `NormalizeOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub form: Form,
    pub bloom_false_positive_rate: f64,
    pub threads: u32,
    pub progress_format: ProgressFormat,
    pub progress_step: f64,
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            form: Form::Compatibility,
            bloom_false_positive_rate: 0.000_001,
            threads: 0,
            progress_format: ProgressFormat::Tty,
            progress_step: 0.05,
            min_length: 0,
            max_length: 0,
        }
    }
}

impl NormalizeOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.bloom_false_positive_rate > 0.0 && self.bloom_false_positive_rate <= 0.1) {
            return Err(Error::invalid_argument("bloomFalsePositiveRate must be in (0, 0.1]"));
        }
        if self.max_length > 0 && self.max_length < self.min_length {
            return Err(Error::invalid_argument("maxLength must be >= minLength when nonzero"));
        }
        if !(self.progress_step > 0.0 && self.progress_step <= 1.0) {
            return Err(Error::invalid_argument("progressStep must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Statistics returned alongside the normalized line list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub rows: u64,
    pub uniques: u64,
    pub duplicates: u64,
    pub elapsed_ms: u64,
    pub mb_per_sec: f64,
}

/// Runs the full normalization pipeline over `input_path`, writing
/// unique normalized lines to `output_path` (or skipping the write for
/// the `null`/discard sentinel), reporting structured progress through
/// `on_progress`.
pub fn normalize(
    input_path: &str,
    output_path: &str,
    options: &NormalizeOptions,
    mut on_progress: impl FnMut(ProgressEvent),
) -> Result<NormalizeStats> {
    options.validate()?;
    let start = Instant::now();

    let mut reporter = Reporter::new(options.progress_step, |e| on_progress(e));
    reporter.start();

    let lines = io::read_all_lines(input_path, |ratio| {
        reporter.report(Phase::Reading, ratio, phase_overall(ratio, (0.0, 0.5)));
    })?;
    let file_size: u64 = lines.iter().map(|l| l.len() as u64 + 1).sum();
    let rows = lines.len() as u64;

    reporter.report(Phase::Processing, 0.0, 0.5);

    let workers = scheduler::resolve_workers(options.threads as usize);
    let unique_lines = if lines.len() < INLINE_ITEM_THRESHOLD || workers <= 1 {
        normalize_sequential(&lines, options)
    } else {
        normalize_parallel(&lines, options, workers)
    };

    reporter.report(Phase::Processing, 1.0, 0.9);

    let duplicates = rows - unique_lines.len() as u64;

    reporter.report(Phase::Writing, 0.0, 0.9);
    if !io::is_discard(output_path) {
        io::write_lines(output_path, unique_lines.iter().map(|s| s.as_str()))?;
    }
    reporter.finish();

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let mb_per_sec = if elapsed_ms > 0 {
        (file_size as f64 / (1024.0 * 1024.0)) / (elapsed_ms as f64 / 1000.0)
    } else {
        0.0
    };

    Ok(NormalizeStats { rows, uniques: unique_lines.len() as u64, duplicates, elapsed_ms, mb_per_sec })
}

/// Normalizes and filters one line, dropping it (and logging a warning)
/// rather than aborting the pipeline on a bad line. A per-line
/// normalization panic can't happen here since `normalize_line` returns
/// `Option`, not a fallible result; this still honors §4.F's "one bad
/// line must not abort the run" contract.
fn normalize_one(line: &str, options: &NormalizeOptions) -> Option<String> {
    if should_exclude(line, options.min_length, options.max_length) {
        return None;
    }
    match normalize_line(line, options.form) {
        Some(normalized) => Some(normalized),
        None => {
            tracing::debug!(line = %line, "line rejected by normalization");
            None
        }
    }
}

fn normalize_sequential(lines: &[String], options: &NormalizeOptions) -> Vec<String> {
    let mut seen = SeenSet::with_bloom(lines.len(), options.bloom_false_positive_rate);
    let mut out = Vec::new();
    for line in lines {
        if let Some(normalized) = normalize_one(line, options) {
            if !seen.check_and_insert(&normalized) {
                out.push(normalized);
            }
        }
    }
    out
}

/// Chunks `lines`, dedups within each chunk independently (in parallel),
/// then merges chunk outputs left-to-right through a single shared
/// [`SeenSet`] so cross-chunk duplicates are dropped while first-seen
/// order (by chunk index, then within-chunk order) is preserved.
fn normalize_parallel(lines: &[String], options: &NormalizeOptions, workers: usize) -> Vec<String> {
    use rayon::prelude::*;

    let ranges = chunk_ranges(lines.len(), workers);
    let chunk_results: Vec<Vec<String>> = ranges
        .par_iter()
        .map(|&(start, end)| {
            let mut chunk_seen = SeenSet::with_bloom((end - start).max(1), options.bloom_false_positive_rate);
            let mut chunk_out = Vec::new();
            for line in &lines[start..end] {
                if let Some(normalized) = normalize_one(line, options) {
                    if !chunk_seen.check_and_insert(&normalized) {
                        chunk_out.push(normalized);
                    }
                }
            }
            chunk_out
        })
        .collect();

    let mut merged_seen = SeenSet::with_bloom(lines.len(), options.bloom_false_positive_rate);
    let mut merged = Vec::new();
    for chunk_out in chunk_results {
        merged.extend(merged_seen.merge_keep_self(chunk_out));
    }
    merged
}
