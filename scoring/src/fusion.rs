//! Two-pipeline data fusion over raw session telemetry.
//!
//! Pipeline 1 (provenance and authenticity) synthesizes keystroke activity,
//! edit magnitude, and focus violations to classify the authorship of the
//! latest edit window. Pipeline 2 (cognitive state continuity) synthesizes
//! idle duration, focus status, and the last run outcome to separate active
//! work, reflective pauses, and disengagement.
//!
//! Thresholds are calibrated for novice programmers on short algorithmic
//! exercises (20-80 LOC, 15-60 minute sessions) and do not generalize beyond
//! that domain.

use praxis_types::{CognitiveState, FusionInsights, ProvenanceState, RawSessionMetrics};

/// Edits above this size suggest bulk transfer rather than incremental
/// construction. Typical novice edits are 5-15 characters.
const LARGE_INSERTION_THRESHOLD: u64 = 30;

/// A large insertion must also exceed this size before the paste heuristics
/// fire at all.
const PASTE_EDIT_MINIMUM: u64 = 50;

/// Burst-typing window in characters. Rapid continuous input in this band is
/// atypical for reflective novice workflows.
const BURST_TYPING_MIN: u64 = 50;
const BURST_TYPING_MAX: u64 = 100;

/// Spam detection: keystroke volume floor and the efficiency ratio
/// (net code change per keystroke) below which input is treated as
/// key-mashing. Novices normally land around 0.20-0.40.
const SPAM_KEYSTROKE_MINIMUM: u64 = 200;
const SPAM_EFFICIENCY_THRESHOLD: f64 = 0.05;
const BURST_EFFICIENCY_THRESHOLD: f64 = 0.15;

/// Idle episodes shorter than this are normal flow; longer episodes are
/// classified by focus and error context.
const REFLECTIVE_PAUSE_MIN_SECS: f64 = 30.0;

fn per_minute(value: f64, duration_minutes: f64) -> f64 {
    if duration_minutes > 0.0 {
        value / duration_minutes
    } else {
        0.0
    }
}

/// Run both classification pipelines over one telemetry snapshot.
///
/// Stateless by design: every snapshot gets a fresh evaluation, so a small
/// legitimate edit after a flagged paste returns to `AuthenticRefactoring`.
#[must_use]
pub fn fuse(metrics: &RawSessionMetrics) -> FusionInsights {
    // --- Pipeline 1: provenance and authenticity ---

    let mut provenance = ProvenanceState::AuthenticRefactoring;
    let mut integrity_penalty = 0.0;

    let raw_kpm = per_minute(metrics.total_keystrokes as f64, metrics.duration_minutes);

    // Large-insertion check: how much of the inserted text is covered by
    // keystrokes observed in the recent burst window.
    if metrics.last_edit_size_chars > LARGE_INSERTION_THRESHOLD {
        let keystroke_to_insertion_ratio =
            metrics.recent_burst_size_chars as f64 / metrics.last_edit_size_chars as f64;

        if keystroke_to_insertion_ratio < 0.2
            && metrics.focus_violation_count > 0
            && metrics.last_edit_size_chars > PASTE_EDIT_MINIMUM
        {
            // Very large insertion, tab switch, almost no keystrokes.
            provenance = ProvenanceState::SuspectedExternalPaste;
            integrity_penalty = 0.5;
        } else if keystroke_to_insertion_ratio > 0.8 {
            // The student typed it.
            provenance = ProvenanceState::AuthenticRefactoring;
        } else {
            // Could be an internal block move or fast typing.
            provenance = ProvenanceState::AmbiguousLargeEdit;
        }
    }

    let efficiency_ratio = if metrics.total_keystrokes > 50 {
        metrics.net_code_change as f64 / metrics.total_keystrokes as f64
    } else {
        1.0
    };

    // Bulk-paste fallback: lots of code, very few keystrokes, multiple focus
    // violations. Deliberately strict to avoid false positives.
    if metrics.net_code_change > 200
        && (metrics.total_keystrokes as f64) < metrics.net_code_change as f64 * 0.3
        && metrics.focus_violation_count > 1
        && !matches!(
            provenance,
            ProvenanceState::SuspectedExternalPaste | ProvenanceState::Spamming
        )
    {
        provenance = ProvenanceState::SuspectedExternalPaste;
        integrity_penalty = 0.5;
    }

    let is_burst_typing = (BURST_TYPING_MIN..=BURST_TYPING_MAX)
        .contains(&metrics.recent_burst_size_chars);

    let effective_kpm = if metrics.total_keystrokes > SPAM_KEYSTROKE_MINIMUM
        && efficiency_ratio < SPAM_EFFICIENCY_THRESHOLD
    {
        // High keystroke volume with negligible retention: nullify KPM so the
        // score cannot be inflated by mashing.
        provenance = ProvenanceState::Spamming;
        0.0
    } else if is_burst_typing && efficiency_ratio < BURST_EFFICIENCY_THRESHOLD {
        provenance = ProvenanceState::Spamming;
        raw_kpm * 0.5
    } else {
        raw_kpm
    };

    // Attempt density passes through unadjusted; iterative testing is a valid
    // learning style.
    let effective_ad = per_minute(metrics.total_run_attempts as f64, metrics.duration_minutes);

    // --- Pipeline 2: cognitive state continuity ---

    let mut cognitive = CognitiveState::Active;
    let mut adjusted_idle_minutes = metrics.total_idle_minutes;

    if metrics.current_idle_duration > REFLECTIVE_PAUSE_MIN_SECS {
        if metrics.is_window_focused {
            if metrics.last_run_was_error {
                // Reading the error, planning a fix. Exclude the current
                // episode from the idle penalty.
                cognitive = CognitiveState::ReflectivePause;
                let current_pause_minutes = metrics.current_idle_duration / 60.0;
                adjusted_idle_minutes =
                    (metrics.total_idle_minutes - current_pause_minutes).max(0.0);
            } else {
                cognitive = CognitiveState::PassiveIdle;
            }
        } else {
            cognitive = CognitiveState::Disengagement;
        }
    }

    let effective_ir = per_minute(adjusted_idle_minutes, metrics.duration_minutes);

    FusionInsights {
        provenance_state: provenance,
        cognitive_state: cognitive,
        effective_kpm,
        effective_ad,
        effective_ir,
        integrity_penalty,
    }
}
