//! Reservoir sampler (§4.O): classical Knuth reservoir sampling over a
//! stream of lines.
//!
//! Grounded on `original_source/src/core/text_utils.cpp`'s `sampleLines`
//! (both overloads: file-backed and in-memory), ported from `std::mt19937`
//! to `rand`'s `StdRng` — deterministic for a given nonzero seed,
//! time-seeded when `seed == 0`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples `sample_size` lines uniformly at random from `lines` in a
/// single pass. Deterministic for a given nonzero `seed`; seeded from the
/// OS entropy source when `seed == 0`. Returns all lines if
/// `sample_size >= lines.len()`, and an empty vector if `sample_size == 0`.
pub fn reservoir_sample(lines: &[String], sample_size: usize, seed: u64) -> Vec<String> {
    if sample_size == 0 {
        return Vec::new();
    }
    if sample_size >= lines.len() {
        return lines.to_vec();
    }

    let mut rng: StdRng = if seed == 0 { StdRng::from_entropy() } else { StdRng::seed_from_u64(seed) };

    let mut reservoir: Vec<String> = lines[..sample_size].to_vec();
    for (i, line) in lines.iter().enumerate().skip(sample_size) {
        let j = rng.gen_range(0..=i);
        if j < sample_size {
            reservoir[j] = line.clone();
        }
    }
    reservoir
}

/// Streaming variant: samples from an iterator of lines without
/// materializing the whole input, for callers feeding from
/// [`crate::io::process_line_by_line`].
pub fn reservoir_sample_stream(
    lines: impl Iterator<Item = String>,
    sample_size: usize,
    seed: u64,
) -> Vec<String> {
    if sample_size == 0 {
        return Vec::new();
    }

    let mut rng: StdRng = if seed == 0 { StdRng::from_entropy() } else { StdRng::seed_from_u64(seed) };

    let mut reservoir: Vec<String> = Vec::with_capacity(sample_size);
    for (i, line) in lines.enumerate() {
        if reservoir.len() < sample_size {
            reservoir.push(line);
            continue;
        }
        let j = rng.gen_range(0..=i);
        if j < sample_size {
            reservoir[j] = line;
        }
    }
    reservoir
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_lines(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn k_zero_returns_empty() {
        assert!(reservoir_sample(&numbered_lines(10), 0, 42).is_empty());
    }

    #[test]
    fn k_ge_len_returns_all_lines() {
        let lines = numbered_lines(5);
        assert_eq!(reservoir_sample(&lines, 10, 42), lines);
    }

    #[test]
    fn deterministic_with_fixed_seed() {
        let lines = numbered_lines(100);
        let a = reservoir_sample(&lines, 10, 42);
        let b = reservoir_sample(&lines, 10, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn sample_size_is_respected() {
        let lines = numbered_lines(100);
        let sample = reservoir_sample(&lines, 10, 7);
        assert_eq!(sample.len(), 10);
    }

    #[test]
    fn stream_and_slice_variants_agree_with_same_seed() {
        let lines = numbered_lines(50);
        let from_slice = reservoir_sample(&lines, 5, 99);
        let from_stream = reservoir_sample_stream(lines.iter().cloned(), 5, 99);
        assert_eq!(from_slice, from_stream);
    }
}
