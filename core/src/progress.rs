//! Progress reporter (§4.E): structured, phase-aware progress events with
//! rate limiting, plus a scalar-only adapter for simple subscribers.
//!
//! Grounded on `suzume_feedmill.h`'s `ProgressInfo`/`Phase`/`progressStep`
//! and on `original_source/src/core/progress_buffer.h`'s atomic
//! (phase, current, total) triple. The shared-memory publication mechanism
//! itself is out of scope (spec.md §1); this module reimplements the same
//! "one consistent snapshot, never torn" guarantee in-process behind a
//! `Mutex`, which spec.md §5 explicitly allows as an alternative to paired
//! atomics ("either publish through a lock, or use atomics...").

use std::sync::Mutex;

/// Processing phase, ordered as the pipeline moves through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Reading,
    Processing,
    Calculating,
    Writing,
    Complete,
}

/// A single progress snapshot, published atomically as a unit.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub phase_ratio: f64,
    pub overall_ratio: f64,
    pub processed_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
}

impl ProgressEvent {
    fn new(phase: Phase, phase_ratio: f64, overall_ratio: f64) -> Self {
        ProgressEvent { phase, phase_ratio, overall_ratio, processed_bytes: None, total_bytes: None }
    }
}

/// Output format an external CLI renders progress events in. The core
/// itself does not render anything; this only threads the caller's
/// preference through `*Options` so it can pick an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressFormat {
    Tty,
    Json,
    None,
}

impl Default for ProgressFormat {
    fn default() -> Self {
        ProgressFormat::Tty
    }
}

/// A callback-driven reporter that rate-limits intermediate events and
/// guarantees the first (overall=0) and last (Complete, overall=1) events
/// are always emitted, per §4.E's rules.
pub struct Reporter<'a> {
    callback: Box<dyn FnMut(ProgressEvent) + 'a>,
    progress_step: f64,
    last_reported: Mutex<f64>,
    last_phase: Mutex<Option<Phase>>,
    emitted_initial: Mutex<bool>,
    finished: Mutex<bool>,
}

impl<'a> Reporter<'a> {
    /// Builds a reporter with the given rate-limit step (clamped to
    /// `(0, 1]`) and emits the mandatory initial `overall_ratio = 0` event
    /// immediately.
    pub fn new(progress_step: f64, callback: impl FnMut(ProgressEvent) + 'a) -> Self {
        let step = if progress_step > 0.0 && progress_step <= 1.0 { progress_step } else { 0.05 };
        let reporter = Reporter {
            callback: Box::new(callback),
            progress_step: step,
            last_reported: Mutex::new(0.0),
            last_phase: Mutex::new(None),
            emitted_initial: Mutex::new(false),
            finished: Mutex::new(false),
        };
        reporter
    }

    /// Emits the initial event (phase=Reading, overall=0) exactly once.
    pub fn start(&mut self) {
        let mut emitted = self.emitted_initial.lock().unwrap();
        if *emitted {
            return;
        }
        *emitted = true;
        drop(emitted);
        self.emit_unconditionally(ProgressEvent::new(Phase::Reading, 0.0, 0.0));
    }

    /// Reports a phase/ratio pair, subject to rate limiting: suppressed
    /// unless `overall_ratio` has advanced by at least `progress_step`
    /// since the last emitted event, or the phase has changed.
    pub fn report(&mut self, phase: Phase, phase_ratio: f64, overall_ratio: f64) {
        self.report_event(ProgressEvent::new(phase, phase_ratio, overall_ratio));
    }

    pub fn report_event(&mut self, event: ProgressEvent) {
        let mut last_reported = self.last_reported.lock().unwrap();
        let mut last_phase = self.last_phase.lock().unwrap();

        let phase_changed = *last_phase != Some(event.phase);
        let advanced = event.overall_ratio >= *last_reported + self.progress_step;

        if !phase_changed && !advanced {
            return;
        }

        *last_reported = event.overall_ratio;
        *last_phase = Some(event.phase);
        drop(last_reported);
        drop(last_phase);

        (self.callback)(event);
    }

    /// Emits the mandatory terminal event (phase=Complete, overall=1),
    /// bypassing rate limiting. Idempotent: only the first call emits,
    /// so it's safe to call explicitly on the success path and again
    /// (via [`Drop`]) on every early-return/error exit path.
    pub fn finish(&mut self) {
        let mut finished = self.finished.lock().unwrap();
        if *finished {
            return;
        }
        *finished = true;
        drop(finished);
        self.emit_unconditionally(ProgressEvent::new(Phase::Complete, 1.0, 1.0));
    }

    fn emit_unconditionally(&mut self, event: ProgressEvent) {
        *self.last_reported.lock().unwrap() = event.overall_ratio;
        *self.last_phase.lock().unwrap() = Some(event.phase);
        (self.callback)(event);
    }
}

impl<'a> Drop for Reporter<'a> {
    /// Guarantees the terminal `Complete`/`overall=1` event fires even when
    /// the orchestration function returns early via `?` on an I/O or
    /// validation error, matching the original's try/catch-guaranteed
    /// completion event (`pmi.cpp`'s `calculatePmiWithStructuredProgress`).
    fn drop(&mut self) {
        self.finish();
    }
}

/// Allocates an `overall_ratio` from a `phase_ratio` within a phase's
/// `[start, end)` weight window, e.g. normalizer reading is `(0.0, 0.5)`.
pub fn phase_overall(phase_ratio: f64, window: (f64, f64)) -> f64 {
    let (start, end) = window;
    start + phase_ratio.clamp(0.0, 1.0) * (end - start)
}

/// A thin adapter that exposes only the scalar `overall_ratio` of each
/// structured event, for subscribers that don't care about phase detail
/// (§4.E: "a simple progress subscriber ... MUST be supported as a thin
/// adapter").
pub fn scalar_adapter<'a>(mut on_ratio: impl FnMut(f64) + 'a) -> impl FnMut(ProgressEvent) + 'a {
    move |event: ProgressEvent| on_ratio(event.overall_ratio)
}
