//! Dedup oracle (§4.C): exact membership over a seen-set, optionally
//! accelerated by a bloom-filter pre-check.
//!
//! The bloom filter is strictly an accelerator: a positive hit is
//! always confirmed against the exact set before a line is reported as
//! a duplicate, so false positives from the bloom filter can never
//! leak a duplicate into the unique output. A bloom miss is exact (no
//! false negatives), so it short-circuits straight to "not seen".

use std::collections::HashSet;

use bloomfilter::Bloom;

/// Decides whether a normalized line has already been observed during
/// the current run.
pub struct SeenSet {
    exact: HashSet<String>,
    bloom: Option<Bloom<str>>,
}

impl SeenSet {
    /// Builds an oracle with no probabilistic fast path.
    pub fn new() -> Self {
        SeenSet { exact: HashSet::new(), bloom: None }
    }

    /// Builds an oracle with a bloom-filter pre-check sized for
    /// `expected_items` entries at `false_positive_rate` (in
    /// `(0, 0.1]`, per §6's option range).
    pub fn with_bloom(expected_items: usize, false_positive_rate: f64) -> Self {
        let items = expected_items.max(1);
        SeenSet {
            exact: HashSet::new(),
            bloom: Some(Bloom::new_for_fp_rate(items, false_positive_rate)),
        }
    }

    /// Tests and records `line` in one step. Returns `true` if `line`
    /// is a duplicate (already seen, or empty). Empty strings are
    /// always reported as duplicates and are never inserted.
    pub fn check_and_insert(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }

        if let Some(bloom) = &mut self.bloom {
            if !bloom.check(line) {
                bloom.set(line);
                self.exact.insert(line.to_string());
                return false;
            }
            // Bloom hit: could be a true positive or a false positive,
            // confirm against the exact set.
        }

        if self.exact.contains(line) {
            true
        } else {
            self.exact.insert(line.to_string());
            if let Some(bloom) = &mut self.bloom {
                bloom.set(line);
            }
            false
        }
    }

    /// True if `line` has been recorded, without inserting it.
    pub fn contains(&self, line: &str) -> bool {
        self.exact.contains(line)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Merges `other` into `self`, keeping entries already present in
    /// `self` (earliest-chunk-wins semantics used by the parallel
    /// normalizer merge, §5). Returns the lines from `other` that were
    /// newly inserted, in their original relative order.
    pub fn merge_keep_self(&mut self, other_lines: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut newly_unique = Vec::new();
        for line in other_lines {
            if !self.check_and_insert(&line) {
                newly_unique.push(line);
            }
        }
        newly_unique
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_always_duplicate() {
        let mut s = SeenSet::new();
        assert!(s.check_and_insert(""));
        assert!(s.check_and_insert(""));
    }

    #[test]
    fn first_occurrence_is_unique_second_is_duplicate() {
        let mut s = SeenSet::new();
        assert!(!s.check_and_insert("a"));
        assert!(s.check_and_insert("a"));
    }

    #[test]
    fn bloom_accelerator_never_false_reports_duplicate() {
        let mut s = SeenSet::with_bloom(1000, 0.01);
        let mut seen = HashSet::new();
        for i in 0..2000 {
            let line = format!("line-{}", i % 500);
            let is_dup = s.check_and_insert(&line);
            let should_be_dup = !seen.insert(line.clone());
            assert_eq!(is_dup, should_be_dup, "mismatch on {line}");
        }
    }

    proptest::proptest! {
        #[test]
        fn no_duplicates_ever_reported_as_unique_twice(lines in proptest::collection::vec("[a-c]{1,3}", 0..200)) {
            let mut s = SeenSet::with_bloom(64, 0.05);
            let mut seen = HashSet::new();
            for line in lines {
                let is_dup = s.check_and_insert(&line);
                let should_be_dup = !seen.insert(line.clone());
                proptest::prop_assert_eq!(is_dup, should_be_dup);
            }
        }
    }
}
