//! N-gram counter (§4.G): code-point n-gram frequency over a corpus, with
//! byte-range parallelism via [`crate::scheduler`].
//!
//! Grounded on `original_source/src/core/pmi.cpp`'s `countNgrams`: split on
//! line boundaries, generate n-grams per line (never across U+000A), count
//! into a map, merge per-worker maps by summation.

use std::collections::HashMap;

use crate::scheduler::{self, chunk_text_ranges};
use crate::unicode::generate_ngrams;

/// Counts every contiguous code-point n-gram of size `n` in `text`, never
/// crossing a line boundary. Single-threaded; see [`count_ngrams_parallel`]
/// for the chunked variant used on large corpora.
pub fn count_ngrams(text: &str, n: usize) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for gram in generate_ngrams(text, n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Partitions `text` into `workers` UTF-8-safe byte ranges, counts each in
/// parallel, and merges the partial maps by summation. Falls back to
/// [`count_ngrams`] below [`scheduler::INLINE_BYTE_THRESHOLD`] bytes or
/// when `workers <= 1`.
pub fn count_ngrams_parallel(text: &str, n: usize, workers: usize) -> HashMap<String, u32> {
    let ranges = chunk_text_ranges(text, workers);
    if ranges.len() <= 1 {
        return count_ngrams(text, n);
    }

    use rayon::prelude::*;
    let partials: Vec<HashMap<String, u32>> =
        ranges.par_iter().map(|&(start, end)| count_ngrams(&text[start..end], n)).collect();

    merge_counts(partials)
}

/// Sums a collection of per-worker count maps into one.
pub fn merge_counts(partials: impl IntoIterator<Item = HashMap<String, u32>>) -> HashMap<String, u32> {
    let mut merged = HashMap::new();
    for partial in partials {
        for (gram, count) in partial {
            *merged.entry(gram).or_insert(0) += count;
        }
    }
    merged
}

/// Resolves a requested thread count the same way the normalizer and PMI
/// scorer do (0 = auto), re-exported here for callers that only need the
/// counter.
pub fn resolve_workers(requested: usize) -> usize {
    scheduler::resolve_workers(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_window_total() {
        let text = "aaa\nbb";
        let counts = count_ngrams(text, 2);
        let total: u32 = counts.values().sum();
        // "aaa" -> "aa","aa" (2), "bb" -> "bb" (1)
        assert_eq!(total, 3);
    }

    #[test]
    fn never_crosses_newline() {
        let counts = count_ngrams("ab\ncd", 2);
        assert!(!counts.contains_key("bc"));
        assert_eq!(counts.get("ab"), Some(&1));
        assert_eq!(counts.get("cd"), Some(&1));
    }

    #[test]
    fn empty_text_yields_empty_map() {
        assert!(count_ngrams("", 2).is_empty());
    }

    #[test]
    fn parallel_matches_sequential_on_large_corpus() {
        let line = "the quick brown fox jumps over the lazy dog\n".repeat(2000);
        let sequential = count_ngrams(&line, 2);
        let parallel = count_ngrams_parallel(&line, 2, 8);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn merge_counts_sums_across_partials() {
        let mut a = HashMap::new();
        a.insert("ab".to_string(), 3);
        let mut b = HashMap::new();
        b.insert("ab".to_string(), 2);
        b.insert("cd".to_string(), 1);
        let merged = merge_counts([a, b]);
        assert_eq!(merged.get("ab"), Some(&5));
        assert_eq!(merged.get("cd"), Some(&1));
    }
}
