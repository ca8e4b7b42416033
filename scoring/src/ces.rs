//! Cognitive Engagement Score composition.
//!
//! Normalizes the four fused signals to [0, 1] with fixed domain bounds,
//! applies the component weights, subtracts the integrity penalty, and clamps
//! the result to [-1, 1].

use praxis_types::{CesResult, Classification, FusionInsights, RawSessionMetrics};

// Normalization bounds. KPM above 24 exceeds realistic sustained manual entry
// for novices; AD spans one run per 20 minutes up to one run per 2 minutes;
// IR penalizes sessions that are more than 60% idle; FVC caps at 10 so
// outliers stop adding signal.
const MIN_KPM: f64 = 5.0;
const MAX_KPM: f64 = 24.0;
const MIN_AD: f64 = 0.05;
const MAX_AD: f64 = 0.50;
const MIN_IR: f64 = 0.0;
const MAX_IR: f64 = 0.60;
const MIN_FVC: f64 = 0.0;
const MAX_FVC: f64 = 10.0;

// Component weights. Keystroke activity carries the most weight as the
// prerequisite for all code production; focus violations are weighted as a
// penalty of equal rank to attempt density; idle ratio stays moderate because
// thinking and idling share the same behavioral signature.
const W_KPM: f64 = 0.35;
const W_AD: f64 = 0.25;
const W_FVC: f64 = 0.25;
const W_IR: f64 = 0.15;

/// Min-max normalization clamped to [0, 1].
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max - min == 0.0 {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Compose the CES from one snapshot's fused insights.
///
/// The raw metrics are only consulted for the focus violation count, which
/// the fusion stage deliberately leaves unadjusted.
#[must_use]
pub fn compose(metrics: &RawSessionMetrics, insights: &FusionInsights) -> CesResult {
    let kpm_norm = normalize(insights.effective_kpm, MIN_KPM, MAX_KPM);
    let ad_norm = normalize(insights.effective_ad, MIN_AD, MAX_AD);
    let ir_norm = normalize(insights.effective_ir, MIN_IR, MAX_IR);
    let fvc_norm = normalize(f64::from(metrics.focus_violation_count), MIN_FVC, MAX_FVC);

    let productive = W_KPM * kpm_norm + W_AD * ad_norm;
    let penalty = W_FVC * fvc_norm + W_IR * ir_norm;

    let ces = round_to(
        (productive - penalty - insights.integrity_penalty).clamp(-1.0, 1.0),
        4,
    );

    CesResult {
        ces,
        classification: Classification::from_score(ces),
        provenance_state: insights.provenance_state,
        cognitive_state: insights.cognitive_state,
        effective_kpm: round_to(insights.effective_kpm, 2),
        effective_ad: round_to(insights.effective_ad, 4),
        effective_ir: round_to(insights.effective_ir, 2),
        integrity_penalty: insights.integrity_penalty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_types::{CognitiveState, ProvenanceState};

    fn insights() -> FusionInsights {
        FusionInsights {
            provenance_state: ProvenanceState::AuthenticRefactoring,
            cognitive_state: CognitiveState::Active,
            effective_kpm: 0.0,
            effective_ad: 0.0,
            effective_ir: 0.0,
            integrity_penalty: 0.0,
        }
    }

    fn metrics_with_fvc(fvc: u32) -> RawSessionMetrics {
        RawSessionMetrics {
            duration_minutes: 10.0,
            total_keystrokes: 0,
            total_run_attempts: 0,
            total_idle_minutes: 0.0,
            focus_violation_count: fvc,
            net_code_change: 0,
            last_edit_size_chars: 0,
            last_run_interval_seconds: 0.0,
            is_semantic_change: false,
            current_idle_duration: 0.0,
            is_window_focused: true,
            last_run_was_error: false,
            recent_burst_size_chars: 0,
        }
    }

    // ========================================================================
    // normalize tests
    // ========================================================================

    #[test]
    fn normalize_clamps_below_and_above() {
        assert_eq!(normalize(2.0, 5.0, 24.0), 0.0);
        assert_eq!(normalize(30.0, 5.0, 24.0), 1.0);
    }

    #[test]
    fn normalize_is_linear_inside_bounds() {
        assert!((normalize(14.5, 5.0, 24.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_degenerate_range_is_zero() {
        assert_eq!(normalize(1.0, 3.0, 3.0), 0.0);
    }

    // ========================================================================
    // compose tests
    // ========================================================================

    #[test]
    fn maximal_signals_hit_the_productive_ceiling() {
        let mut ins = insights();
        ins.effective_kpm = 24.0;
        ins.effective_ad = 0.5;
        let result = compose(&metrics_with_fvc(0), &ins);
        assert!((result.ces - 0.6).abs() < 1e-9);
        assert_eq!(result.classification, Classification::HighEngagement);
    }

    #[test]
    fn integrity_penalty_is_subtracted_after_weighting() {
        let mut ins = insights();
        ins.effective_kpm = 24.0;
        ins.effective_ad = 0.5;
        ins.integrity_penalty = 0.5;
        let result = compose(&metrics_with_fvc(0), &ins);
        assert!((result.ces - 0.1).abs() < 1e-9);
    }

    #[test]
    fn worst_case_clamps_at_minus_one() {
        let mut ins = insights();
        ins.effective_ir = 1.0;
        ins.integrity_penalty = 1.0;
        let result = compose(&metrics_with_fvc(10), &ins);
        assert_eq!(result.ces, -1.0);
        assert_eq!(result.classification, Classification::DisengagedAtRisk);
    }

    #[test]
    fn fvc_weighs_heavier_than_ir() {
        // Same normalized magnitude on each penalty channel.
        let mut ir_only = insights();
        ir_only.effective_ir = 0.6;
        let fvc_only = insights();
        let with_ir = compose(&metrics_with_fvc(0), &ir_only);
        let with_fvc = compose(&metrics_with_fvc(10), &fvc_only);
        assert!(with_fvc.ces < with_ir.ces);
    }

    #[test]
    fn effective_metrics_are_rounded_for_output() {
        let mut ins = insights();
        ins.effective_kpm = 12.3456;
        ins.effective_ad = 0.123_456;
        ins.effective_ir = 0.987_65;
        let result = compose(&metrics_with_fvc(0), &ins);
        assert_eq!(result.effective_kpm, 12.35);
        assert_eq!(result.effective_ad, 0.1235);
        assert_eq!(result.effective_ir, 0.99);
    }
}
