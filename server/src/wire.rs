//! JSON shapes for the HTTP boundary.
//!
//! Bodies are parsed and validated here, at the edge; the core crates only
//! ever see already-validated value objects.

use serde::{Deserialize, Serialize};

use praxis_types::{
    ErrorCode, ExecutionRequest, ExecutionResult, ExecutionStatus, Language, RawSessionMetrics,
    RequestError, TestCase, TestVerdict,
};

fn default_language() -> String {
    "python".to_string()
}

fn default_account_type() -> String {
    "student".to_string()
}

pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// `POST /execute` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteBody {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub stdin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl ExecuteBody {
    /// Validate into a core request. An out-of-range timeout or empty code
    /// is an input error; an unknown language is handled separately so it
    /// can travel as an ordinary execution outcome.
    pub fn into_request(self, language: Language) -> Result<ExecutionRequest, RequestError> {
        let mut request = ExecutionRequest::new(self.code, language)?.with_stdin(self.stdin);
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout)?;
        }
        if let Some(cases) = self.test_cases {
            request = request.with_test_cases(cases);
        }
        Ok(request)
    }
}

/// `POST /execute` response body. Every execution outcome, student failures
/// included, uses this 200 shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub status: ExecutionStatus,
    pub output: String,
    #[serde(default)]
    pub error: String,
    pub execution_time: f64,
    pub exit_code: i32,
    /// Error kind for non-student failures; absent for ordinary outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default)]
    pub test_results: Vec<TestVerdict>,
    pub timestamp: String,
}

impl From<ExecutionResult> for ExecuteResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            success: result.status == ExecutionStatus::Success,
            status: result.status,
            output: result.output,
            error: result.error,
            execution_time: result.execution_time,
            exit_code: result.exit_code,
            error_code: result.error_code,
            test_results: result.test_results,
            timestamp: timestamp_now(),
        }
    }
}

impl ExecuteResponse {
    /// A non-outcome failure shaped like an execution result, e.g. an
    /// unsupported language or an unreachable remote service.
    #[must_use]
    pub fn failure(
        status: ExecutionStatus,
        code: ErrorCode,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            status,
            output: String::new(),
            error: error.into(),
            execution_time: 0.0,
            exit_code: praxis_types::INFRA_EXIT_CODE,
            error_code: Some(code),
            test_results: Vec::new(),
            timestamp: timestamp_now(),
        }
    }
}

/// `POST /telemetry/analyze` request body. Identity fields are used only to
/// separate students from other callers; they never reach the scoring math.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryBody {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde(default = "default_account_type")]
    pub account_type: String,
    #[serde(flatten)]
    pub metrics: RawSessionMetrics,
}

/// `POST /telemetry/analyze` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryResponse {
    pub kpm: f64,
    pub ad: f64,
    pub ir: f64,
    pub fvc: u32,
    pub ces: f64,
    pub ces_classification: String,
    pub provenance_state: String,
    pub cognitive_state: String,
    pub effective_kpm: f64,
    pub effective_ad: f64,
    pub effective_ir: f64,
    pub integrity_penalty: f64,
    pub timestamp: String,
}

impl TelemetryResponse {
    /// Neutral zero-valued result for non-student callers.
    #[must_use]
    pub fn not_applicable() -> Self {
        Self {
            kpm: 0.0,
            ad: 0.0,
            ir: 0.0,
            fvc: 0,
            ces: 0.0,
            ces_classification: "Not Applicable".to_string(),
            provenance_state: "instructor".to_string(),
            cognitive_state: "instructor".to_string(),
            effective_kpm: 0.0,
            effective_ad: 0.0,
            effective_ir: 0.0,
            integrity_penalty: 0.0,
            timestamp: timestamp_now(),
        }
    }
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub docker_available: bool,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// `GET /languages` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}
