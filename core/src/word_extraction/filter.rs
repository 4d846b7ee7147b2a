//! Candidate filter (§4.M): a fixed pipeline of length, score,
//! substring, overlap, and language-agnostic validity filters.
//!
//! Grounded on `original_source/src/core/word_extraction/filter.cpp`'s
//! `CandidateFilter` (`isLikelyValidWordCandidate`'s explicitly permissive
//! stance, the substring-removal 1.25x score threshold bucketed by
//! length, and the overlap pass's tie-break-by-earlier-insertion rule).

use super::types::VerifiedCandidate;

pub fn filter_by_length(candidates: Vec<VerifiedCandidate>, min_length: u32, max_length: u32) -> Vec<VerifiedCandidate> {
    candidates
        .into_iter()
        .filter(|c| {
            let len = c.code_point_len() as u32;
            len >= min_length && len <= max_length
        })
        .collect()
}

pub fn filter_by_score(candidates: Vec<VerifiedCandidate>, min_score: f64) -> Vec<VerifiedCandidate> {
    candidates.into_iter().filter(|c| c.score >= min_score).collect()
}

/// Drops any candidate whose text is a substring of a strictly longer
/// surviving candidate scoring at least 1.25x as much. Candidates are
/// bucketed by code-point length so each candidate is only compared
/// against strictly-longer buckets, matching the original's O(n*m)
/// "longer candidates only" scan.
pub fn remove_substrings(candidates: Vec<VerifiedCandidate>) -> Vec<VerifiedCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let mut by_length: Vec<(u32, usize)> =
        candidates.iter().enumerate().map(|(i, c)| (c.code_point_len() as u32, i)).collect();
    by_length.sort_by_key(|&(len, _)| len);

    let mut keep = vec![true; candidates.len()];
    for (i, candidate) in candidates.iter().enumerate() {
        let len = candidate.code_point_len() as u32;
        for &(other_len, j) in &by_length {
            if other_len <= len {
                continue;
            }
            let other = &candidates[j];
            if other.score >= candidate.score * 1.25 && other.text.contains(&candidate.text) {
                keep[i] = false;
                break;
            }
        }
    }

    candidates.into_iter().zip(keep).filter_map(|(c, k)| k.then_some(c)).collect()
}

/// For each pair where one text is a substring of the other, or the texts
/// are equal, keeps only the higher-scoring one; ties keep whichever
/// appeared earlier in the input order.
pub fn remove_overlapping(candidates: Vec<VerifiedCandidate>) -> Vec<VerifiedCandidate> {
    let n = candidates.len();
    let mut keep = vec![true; n];

    for i in 0..n {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !keep[j] {
                continue;
            }
            let overlaps = candidates[i].text == candidates[j].text
                || candidates[i].text.contains(&candidates[j].text)
                || candidates[j].text.contains(&candidates[i].text);
            if !overlaps {
                continue;
            }
            if candidates[j].score > candidates[i].score {
                keep[i] = false;
                break;
            } else {
                keep[j] = false;
            }
        }
    }

    candidates.into_iter().zip(keep).filter_map(|(c, k)| k.then_some(c)).collect()
}

/// Drops only the clearly-invalid: a single ASCII punctuation character,
/// or text that somehow isn't valid UTF-8 text content (empty). No
/// language-specific dictionary logic runs here; permissive by default.
pub fn apply_language_rules(candidates: Vec<VerifiedCandidate>, _language_code: &str) -> Vec<VerifiedCandidate> {
    candidates.into_iter().filter(|c| is_likely_valid_word_candidate(&c.text)).collect()
}

fn is_likely_valid_word_candidate(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let mut chars = text.chars();
    let first = chars.next().unwrap();
    if chars.next().is_none() && first.is_ascii_punctuation() {
        return false;
    }
    true
}

/// Runs the full filter pipeline in spec order: length, score,
/// substring removal, overlap removal, language rules.
pub fn apply_all(
    candidates: Vec<VerifiedCandidate>,
    min_length: u32,
    max_length: u32,
    min_score: f64,
    remove_subs: bool,
    remove_overlap: bool,
    use_language_rules: bool,
    language_code: &str,
) -> Vec<VerifiedCandidate> {
    let mut result = filter_by_length(candidates, min_length, max_length);
    result = filter_by_score(result, min_score);
    if remove_subs {
        result = remove_substrings(result);
    }
    if remove_overlap {
        result = remove_overlapping(result);
    }
    if use_language_rules {
        result = apply_language_rules(result, language_code);
    }
    result
}
