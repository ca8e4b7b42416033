//! Behavioral telemetry types: raw session metrics, fusion labels, and the
//! Cognitive Engagement Score result.

use serde::{Deserialize, Serialize};

/// Raw per-session telemetry collected client-side.
///
/// Scalars cover the whole session so far; counters are monotonic within a
/// session and never negative. The scoring pipeline treats this as an
/// immutable snapshot and keeps no state between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSessionMetrics {
    /// Wire clients historically send this as `session_duration_minutes`.
    #[serde(alias = "session_duration_minutes")]
    pub duration_minutes: f64,
    pub total_keystrokes: u64,
    pub total_run_attempts: u64,
    pub total_idle_minutes: f64,
    /// Window-focus losses over the session.
    pub focus_violation_count: u32,
    /// Current code length in characters.
    pub net_code_change: u64,
    /// Character delta of the most recent edit.
    pub last_edit_size_chars: u64,
    pub last_run_interval_seconds: f64,
    pub is_semantic_change: bool,
    /// Length of the current idle episode in seconds.
    pub current_idle_duration: f64,
    pub is_window_focused: bool,
    pub last_run_was_error: bool,
    /// Keystrokes landed in the recent 5-second sliding window.
    #[serde(default)]
    pub recent_burst_size_chars: u64,
}

/// Authorship authenticity of the latest edit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvenanceState {
    #[serde(rename = "Authentic Refactoring")]
    AuthenticRefactoring,
    #[serde(rename = "Ambiguous Large Edit")]
    AmbiguousLargeEdit,
    #[serde(rename = "Suspected External Paste")]
    SuspectedExternalPaste,
    #[serde(rename = "Spamming")]
    Spamming,
}

impl ProvenanceState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProvenanceState::AuthenticRefactoring => "Authentic Refactoring",
            ProvenanceState::AmbiguousLargeEdit => "Ambiguous Large Edit",
            ProvenanceState::SuspectedExternalPaste => "Suspected External Paste",
            ProvenanceState::Spamming => "Spamming",
        }
    }
}

impl std::fmt::Display for ProvenanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current temporal interaction pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CognitiveState {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Reflective Pause")]
    ReflectivePause,
    #[serde(rename = "Passive Idle")]
    PassiveIdle,
    #[serde(rename = "Disengagement")]
    Disengagement,
}

impl CognitiveState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CognitiveState::Active => "Active",
            CognitiveState::ReflectivePause => "Reflective Pause",
            CognitiveState::PassiveIdle => "Passive Idle",
            CognitiveState::Disengagement => "Disengagement",
        }
    }
}

impl std::fmt::Display for CognitiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the two-pipeline data-fusion stage.
///
/// Effective metrics are the raw rates with non-productive contributions
/// removed: spam keystrokes out of KPM, the current reflective pause out of
/// the idle ratio. Attempt density passes through unadjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionInsights {
    pub provenance_state: ProvenanceState,
    pub cognitive_state: CognitiveState,
    pub effective_kpm: f64,
    pub effective_ad: f64,
    pub effective_ir: f64,
    /// Penalty for suspected dishonesty, in [0, 1].
    pub integrity_penalty: f64,
}

/// Qualitative engagement band for a CES value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "High Engagement")]
    HighEngagement,
    #[serde(rename = "Moderate Engagement")]
    ModerateEngagement,
    #[serde(rename = "Low Engagement")]
    LowEngagement,
    #[serde(rename = "Disengaged/At-Risk")]
    DisengagedAtRisk,
}

impl Classification {
    /// Band thresholds: >0.5 high, >0.2 moderate, >0.0 low, else at risk.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.5 {
            Classification::HighEngagement
        } else if score > 0.2 {
            Classification::ModerateEngagement
        } else if score > 0.0 {
            Classification::LowEngagement
        } else {
            Classification::DisengagedAtRisk
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::HighEngagement => "High Engagement",
            Classification::ModerateEngagement => "Moderate Engagement",
            Classification::LowEngagement => "Low Engagement",
            Classification::DisengagedAtRisk => "Disengaged/At-Risk",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scored outcome for one telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CesResult {
    /// Bounded score in [-1, 1], rounded to 4 decimals.
    pub ces: f64,
    pub classification: Classification,
    pub provenance_state: ProvenanceState,
    pub cognitive_state: CognitiveState,
    pub effective_kpm: f64,
    pub effective_ad: f64,
    pub effective_ir: f64,
    pub integrity_penalty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Classification band tests
    // ========================================================================

    #[test]
    fn classification_bands() {
        assert_eq!(
            Classification::from_score(0.51),
            Classification::HighEngagement
        );
        assert_eq!(
            Classification::from_score(0.5),
            Classification::ModerateEngagement
        );
        assert_eq!(
            Classification::from_score(0.2),
            Classification::LowEngagement
        );
        assert_eq!(
            Classification::from_score(0.0),
            Classification::DisengagedAtRisk
        );
        assert_eq!(
            Classification::from_score(-1.0),
            Classification::DisengagedAtRisk
        );
    }

    // ========================================================================
    // Serialization tests
    // ========================================================================

    #[test]
    fn states_serialize_to_display_strings() {
        assert_eq!(
            serde_json::to_string(&ProvenanceState::SuspectedExternalPaste).unwrap(),
            "\"Suspected External Paste\""
        );
        assert_eq!(
            serde_json::to_string(&CognitiveState::ReflectivePause).unwrap(),
            "\"Reflective Pause\""
        );
        assert_eq!(
            serde_json::to_string(&Classification::DisengagedAtRisk).unwrap(),
            "\"Disengaged/At-Risk\""
        );
    }

    #[test]
    fn metrics_deserialize_with_default_burst() {
        let json = r#"{
            "duration_minutes": 5.0,
            "total_keystrokes": 100,
            "total_run_attempts": 2,
            "total_idle_minutes": 1.0,
            "focus_violation_count": 0,
            "net_code_change": 80,
            "last_edit_size_chars": 10,
            "last_run_interval_seconds": 30.0,
            "is_semantic_change": true,
            "current_idle_duration": 0.0,
            "is_window_focused": true,
            "last_run_was_error": false
        }"#;
        let metrics: RawSessionMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.recent_burst_size_chars, 0);
    }
}
