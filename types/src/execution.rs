//! Execution domain types: requests, results, and per-test verdicts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorCode;

/// Languages the execution engine can compile and run.
///
/// Tags on the wire are lowercased before parsing; an unknown tag is rejected
/// at the boundary and never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
}

/// Unknown language tag, with the supported set for the caller.
#[derive(Debug, Clone, Error)]
#[error("Unsupported language: {tag}. Supported: {supported:?}")]
pub struct UnsupportedLanguageError {
    pub tag: String,
    pub supported: Vec<&'static str>,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::Java];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
        }
    }

    /// Parse a language tag, lowercasing first.
    pub fn parse(tag: &str) -> Result<Self, UnsupportedLanguageError> {
        match tag.to_ascii_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            _ => Err(UnsupportedLanguageError {
                tag: tag.to_string(),
                supported: Self::ALL.iter().map(|l| l.as_str()).collect(),
            }),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared test case.
///
/// `input` is a comma-separated argument literal; empty or the sentinel
/// `none` (any case) means the target method takes zero arguments.
/// `expected_output` is compared against trimmed stdout byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl TestCase {
    #[must_use]
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            description: None,
            hidden: false,
        }
    }
}

/// Invalid execution request parameters.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("timeout must be in range [1, 60] seconds, got {value}")]
    TimeoutOutOfRange { value: u64 },
    #[error("code must not be empty")]
    EmptyCode,
}

/// A validated request to execute student code.
///
/// Constructed at the HTTP boundary; the engine only ever sees values that
/// already passed validation.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: Language,
    pub stdin: String,
    /// Wall-clock ceiling in seconds. Defaults to 30; explicit values are
    /// validated into [1, 60].
    pub timeout_secs: u64,
    pub test_cases: Option<Vec<TestCase>>,
}

impl ExecutionRequest {
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    pub const MAX_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(code: impl Into<String>, language: Language) -> Result<Self, RequestError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(RequestError::EmptyCode);
        }
        Ok(Self {
            code,
            language,
            stdin: String::new(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            test_cases: None,
        })
    }

    #[must_use]
    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Result<Self, RequestError> {
        if !(Self::MIN_TIMEOUT_SECS..=Self::MAX_TIMEOUT_SECS).contains(&secs) {
            return Err(RequestError::TimeoutOutOfRange { value: secs });
        }
        self.timeout_secs = secs;
        Ok(self)
    }

    #[must_use]
    pub fn with_test_cases(mut self, cases: Vec<TestCase>) -> Self {
        self.test_cases = Some(cases);
        self
    }
}

/// Final classification of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
    Timeout,
    FailedTests,
}

impl ExecutionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
            ExecutionStatus::Timeout => "timeout",
            ExecutionStatus::FailedTests => "failed_tests",
        }
    }
}

/// Outcome of one test case, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVerdict {
    /// 1-based position in the declared test list.
    pub test_number: usize,
    pub passed: bool,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Exit code reserved for infrastructure failures (sandbox runtime missing,
/// image unavailable, spawn failure). Student code can never produce it.
pub const INFRA_EXIT_CODE: i32 = -1;

/// Result of executing student code, including per-test verdicts when test
/// cases were attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub output: String,
    pub error: String,
    /// Wall-clock seconds, rounded to 3 decimals.
    pub execution_time: f64,
    pub exit_code: i32,
    /// Error kind for non-student failures (timeouts, sandbox trouble).
    /// Absent for ordinary outcomes, student-code errors included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(default)]
    pub test_results: Vec<TestVerdict>,
}

impl ExecutionResult {
    /// An infrastructure failure with a caller-safe message.
    #[must_use]
    pub fn infra_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            output: String::new(),
            error: message.into(),
            execution_time: 0.0,
            exit_code: INFRA_EXIT_CODE,
            error_code: Some(code),
            test_results: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}
