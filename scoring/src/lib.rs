//! Behavioral engagement scoring for Praxis.
//!
//! Raw session telemetry flows through two stateless stages:
//!
//! 1. [`fuse`] runs the two classification pipelines (provenance and
//!    authenticity, cognitive state continuity) and produces cleaned
//!    "effective" metrics plus an integrity penalty.
//! 2. [`compose`] normalizes the effective metrics, applies the component
//!    weights, and yields a bounded Cognitive Engagement Score with its
//!    qualitative band.
//!
//! Both stages are pure functions: no IO, no mutation of the input, and no
//! state carried between snapshots. A paste flag raised on one snapshot does
//! not follow the student into the next.

mod ces;
mod fusion;

pub use ces::compose;
pub use fusion::fuse;

use praxis_types::{CesResult, RawSessionMetrics};

/// Score one telemetry snapshot end to end.
#[must_use]
pub fn score(metrics: &RawSessionMetrics) -> CesResult {
    let insights = fuse(metrics);
    compose(metrics, &insights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_types::{Classification, CognitiveState, ProvenanceState};

    fn baseline() -> RawSessionMetrics {
        RawSessionMetrics {
            duration_minutes: 10.0,
            total_keystrokes: 600,
            total_run_attempts: 3,
            total_idle_minutes: 1.0,
            focus_violation_count: 0,
            net_code_change: 400,
            last_edit_size_chars: 12,
            last_run_interval_seconds: 40.0,
            is_semantic_change: true,
            current_idle_duration: 5.0,
            is_window_focused: true,
            last_run_was_error: false,
            recent_burst_size_chars: 8,
        }
    }

    // ========================================================================
    // Universal invariants
    // ========================================================================

    #[test]
    fn ces_is_always_bounded_and_band_consistent() {
        let durations = [0.0, 1.0, 10.0, 60.0];
        let keystrokes = [0_u64, 50, 300, 5000];
        let idles = [0.0, 5.0, 50.0];
        let violations = [0_u32, 2, 20];
        for d in durations {
            for k in keystrokes {
                for i in idles {
                    for v in violations {
                        let mut m = baseline();
                        m.duration_minutes = d;
                        m.total_keystrokes = k;
                        m.total_idle_minutes = i;
                        m.focus_violation_count = v;
                        let result = score(&m);
                        assert!(
                            (-1.0..=1.0).contains(&result.ces),
                            "ces out of bounds: {}",
                            result.ces
                        );
                        assert_eq!(result.classification, Classification::from_score(result.ces));
                    }
                }
            }
        }
    }

    #[test]
    fn identity_never_enters_the_score() {
        // The pipeline only sees RawSessionMetrics; scoring twice from equal
        // snapshots must be bit-identical.
        let m = baseline();
        let a = score(&m);
        let b = score(&m.clone());
        assert_eq!(a, b);
    }

    // ========================================================================
    // Boundary behaviors
    // ========================================================================

    #[test]
    fn zero_duration_zeroes_all_rates() {
        let mut m = baseline();
        m.duration_minutes = 0.0;
        let result = score(&m);
        assert_eq!(result.effective_kpm, 0.0);
        assert_eq!(result.effective_ad, 0.0);
        assert_eq!(result.effective_ir, 0.0);
        assert!(result.ces.is_finite());
    }

    #[test]
    fn zero_duration_with_penalty_scores_minus_penalty() {
        let mut m = baseline();
        m.duration_minutes = 0.0;
        m.net_code_change = 300;
        m.total_keystrokes = 20;
        m.last_edit_size_chars = 250;
        m.recent_burst_size_chars = 10;
        m.focus_violation_count = 2;
        let result = score(&m);
        // All rates are zero, FVC normalizes to 0.2, penalty 0.5.
        assert!(result.ces < 0.0);
        assert_eq!(result.integrity_penalty, 0.5);
    }

    #[test]
    fn fully_inactive_session_scores_zero_and_at_risk() {
        let m = RawSessionMetrics {
            duration_minutes: 10.0,
            total_keystrokes: 0,
            total_run_attempts: 0,
            total_idle_minutes: 0.0,
            focus_violation_count: 0,
            net_code_change: 0,
            last_edit_size_chars: 0,
            last_run_interval_seconds: 0.0,
            is_semantic_change: false,
            current_idle_duration: 0.0,
            is_window_focused: true,
            last_run_was_error: false,
            recent_burst_size_chars: 0,
        };
        let result = score(&m);
        assert_eq!(result.ces, 0.0);
        assert_eq!(result.classification, Classification::DisengagedAtRisk);
    }

    // ========================================================================
    // End-to-end scenarios
    // ========================================================================

    #[test]
    fn paste_like_edit_is_penalized() {
        let mut m = baseline();
        m.duration_minutes = 5.0;
        m.total_keystrokes = 20;
        m.net_code_change = 300;
        m.last_edit_size_chars = 250;
        m.recent_burst_size_chars = 10;
        m.focus_violation_count = 2;
        m.total_idle_minutes = 0.0;
        let flagged = score(&m);
        assert_eq!(
            flagged.provenance_state,
            ProvenanceState::SuspectedExternalPaste
        );
        assert_eq!(flagged.integrity_penalty, 0.5);

        let mut clean = m.clone();
        clean.focus_violation_count = 0;
        let unflagged = score(&clean);
        assert!(flagged.ces < unflagged.ces);
    }

    #[test]
    fn reflective_pause_discounts_idle() {
        let mut m = baseline();
        m.duration_minutes = 10.0;
        m.total_keystrokes = 600;
        m.total_run_attempts = 5;
        m.total_idle_minutes = 4.0;
        m.current_idle_duration = 90.0;
        m.is_window_focused = true;
        m.last_run_was_error = true;
        m.focus_violation_count = 0;
        let result = score(&m);
        assert_eq!(result.cognitive_state, CognitiveState::ReflectivePause);
        let raw_ir = m.total_idle_minutes / m.duration_minutes;
        assert!(result.effective_ir < raw_ir);
    }

    #[test]
    fn unfocused_idle_is_disengagement() {
        let mut m = baseline();
        m.duration_minutes = 20.0;
        m.total_keystrokes = 0;
        m.total_run_attempts = 0;
        m.total_idle_minutes = 15.0;
        m.current_idle_duration = 200.0;
        m.is_window_focused = false;
        let result = score(&m);
        assert_eq!(result.cognitive_state, CognitiveState::Disengagement);
        assert_eq!(result.classification, Classification::DisengagedAtRisk);
    }
}
