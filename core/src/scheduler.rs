//! Chunked parallel scheduler (§4.D): the work-partitioning building block
//! shared by the normalizer, the n-gram counter, and the candidate
//! generator.
//!
//! Grounded on `original_source/src/parallel/executor.h`'s
//! `ParallelExecutor` (the `<=100`-item inline-fallback threshold,
//! chunk-size-by-thread-count division with the remainder folded into the
//! last chunk) and on `pmi.cpp`/`normalize.cpp`'s UTF-8-safe byte-range
//! chunking. Reimplemented on top of `rayon` rather than hand-rolled
//! `std::thread` pools, since `rayon` is the pack's idiomatic parallelism
//! crate and already gives us panic propagation and scoped joins for free.

use rayon::prelude::*;

/// Below this many items, chunking overhead isn't worth it: run inline.
pub const INLINE_ITEM_THRESHOLD: usize = 100;

/// Below this many bytes of text, the n-gram counter runs inline rather
/// than splitting into per-thread byte ranges.
pub const INLINE_BYTE_THRESHOLD: usize = 10 * 1024;

/// Resolves a requested worker count: an explicit positive count is used
/// as-is; 0 means "auto", which maps to the available parallelism with a
/// floor of 1.
pub fn resolve_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).max(1)
}

/// Partitions `len` items into `workers` contiguous, non-empty ranges
/// (fewer if `len < workers`), covering `0..len` with no gaps or overlaps.
/// Matches the original's `chunkSize = len / workers` division with the
/// remainder absorbed into the last chunk.
pub fn chunk_ranges(len: usize, workers: usize) -> Vec<(usize, usize)> {
    if len == 0 || workers == 0 {
        return Vec::new();
    }
    let workers = workers.min(len.max(1));
    let chunk_size = (len / workers).max(1);

    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 0..workers {
        if start >= len {
            break;
        }
        let end = if i == workers - 1 { len } else { (start + chunk_size).min(len) };
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Adjusts a candidate byte offset so it does not fall inside a multi-byte
/// UTF-8 sequence, by walking backward to the previous character boundary.
/// A general-purpose building block for partitioning raw text; superseded
/// within this crate by [`align_to_line_boundary`] for the n-gram counter,
/// which additionally must not split a line across two chunks.
pub fn align_to_char_boundary(text: &str, mut byte_offset: usize) -> usize {
    byte_offset = byte_offset.min(text.len());
    while byte_offset > 0 && !text.is_char_boundary(byte_offset) {
        byte_offset -= 1;
    }
    byte_offset
}

/// Advances a candidate byte offset forward to just past the next U+000A
/// at or after it (or to the end of `text` if none remains), so a chunk
/// boundary never falls inside a line. Since n-grams never cross U+000A
/// (§4.G), splitting a line across two chunks would silently drop every
/// n-gram window that would have spanned the cut point; aligning to line
/// boundaries instead keeps the parallel and sequential counters in
/// agreement.
fn align_to_line_boundary(text: &str, byte_offset: usize) -> usize {
    let byte_offset = byte_offset.min(text.len());
    match text[byte_offset..].find('\n') {
        Some(rel) => byte_offset + rel + 1,
        None => text.len(),
    }
}

/// Splits `text` into `workers` contiguous byte ranges, each boundary
/// adjusted so it falls on a line boundary (never splitting a line across
/// two chunks, and incidentally never inside a multi-byte UTF-8 sequence
/// either, since U+000A is a single ASCII byte). Below
/// [`INLINE_BYTE_THRESHOLD`] bytes, returns a single range covering the
/// whole text.
pub fn chunk_text_ranges(text: &str, workers: usize) -> Vec<(usize, usize)> {
    if text.len() < INLINE_BYTE_THRESHOLD || workers <= 1 {
        return if text.is_empty() { Vec::new() } else { vec![(0, text.len())] };
    }

    let chunk_size = (text.len() / workers).max(1);
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 0..workers {
        if start >= text.len() {
            break;
        }
        let raw_end = if i == workers - 1 { text.len() } else { start + chunk_size };
        let end = align_to_line_boundary(text, raw_end.min(text.len()));
        if end <= start {
            continue;
        }
        ranges.push((start, end));
        start = end;
    }
    if let Some(last) = ranges.last_mut() {
        last.1 = text.len();
    }
    ranges
}

/// Runs `per_chunk` over `items`, one invocation per worker-sized slice,
/// merging partial results in original chunk order via `merge`. Below
/// [`INLINE_ITEM_THRESHOLD`] items this runs inline on the calling thread.
///
/// A panic inside `per_chunk` propagates to the caller: rayon's
/// `par_iter` re-raises worker panics on `collect`, so no partial result
/// is silently swallowed and no thread is left dangling.
pub fn run_chunked<T, R>(
    items: &[T],
    workers: usize,
    per_chunk: impl Fn(&[T]) -> R + Sync,
    merge: impl FnOnce(Vec<R>) -> R,
) -> R
where
    T: Sync,
    R: Send,
{
    if items.len() < INLINE_ITEM_THRESHOLD || workers <= 1 {
        return per_chunk(items);
    }

    let ranges = chunk_ranges(items.len(), workers);
    let partials: Vec<R> = ranges
        .par_iter()
        .map(|&(start, end)| per_chunk(&items[start..end]))
        .collect();
    merge(partials)
}
