//! Sandboxed multi-language code execution for Praxis.
//!
//! The [`Engine`] accepts validated [`ExecutionRequest`] values, asks the
//! harness to wrap the student's source, runs the wrapped unit in a fresh
//! per-invocation container, and classifies the outcome. With test cases
//! attached it runs one container per test, sequentially and in declared
//! order, and accumulates per-test verdicts.
//!
//! Student failures (syntax errors, exceptions, wrong answers) are ordinary
//! [`ExecutionResult`] values. Only infrastructure problems surface with the
//! reserved exit code -1, and their messages never leak host details.

mod languages;
mod sandbox;

pub use languages::{LanguageSpec, REGISTRY, spec_for};
pub use sandbox::SandboxError;

use std::time::Duration;

use praxis_harness::WrapMode;
use praxis_types::{
    ErrorCode, ExecutionRequest, ExecutionResult, ExecutionStatus, Language, TestCase,
    TestVerdict,
};

use crate::sandbox::{DockerRuntime, SandboxOutput};

/// Round wall-clock seconds to 3 decimals for the wire.
fn round_secs(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// The execution engine. Cheap to clone behind an `Arc`; holds no state
/// beyond the runtime handle, so concurrent requests never interact.
#[derive(Debug, Clone)]
pub struct Engine {
    runtime: DockerRuntime,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_runtime_binary("docker")
    }

    /// Use an alternate runtime CLI. Also the seam tests use to simulate an
    /// unavailable runtime.
    #[must_use]
    pub fn with_runtime_binary(binary: impl Into<String>) -> Self {
        Self {
            runtime: DockerRuntime::new(binary),
        }
    }

    /// Tags accepted by [`Engine::execute`], in registry order.
    #[must_use]
    pub fn supported_languages() -> Vec<&'static str> {
        REGISTRY.iter().map(|spec| spec.language.as_str()).collect()
    }

    /// True when the sandbox runtime daemon is reachable.
    pub async fn runtime_available(&self) -> bool {
        self.runtime.ping().await
    }

    /// Pull every registry image once. Called at startup; failures are
    /// logged and tolerated since images may already be cached.
    pub async fn pull_images(&self) {
        for spec in REGISTRY {
            if self.runtime.pull(spec.image).await {
                tracing::info!(language = %spec.language, image = spec.image, "image ready");
            } else {
                tracing::warn!(language = %spec.language, image = spec.image, "image pull failed");
            }
        }
    }

    /// Execute one request. Safe to invoke concurrently for distinct
    /// requests; each invocation owns its sandbox exclusively.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let spec = spec_for(request.language);
        let timeout = Duration::from_secs(request.timeout_secs);

        match request.test_cases.as_deref() {
            Some(cases) if !cases.is_empty() => {
                self.run_tests(spec, request, cases, timeout).await
            }
            _ => self.run_plain(spec, request, timeout).await,
        }
    }

    async fn run_plain(
        &self,
        spec: &LanguageSpec,
        request: &ExecutionRequest,
        timeout: Duration,
    ) -> ExecutionResult {
        let wrapped =
            praxis_harness::wrap(&request.code, request.language, &request.stdin, WrapMode::Plain);
        match self.runtime.run(spec, &wrapped, timeout).await {
            Ok(run) => classify(spec, &run, timeout),
            Err(e) => {
                tracing::error!(language = %spec.language, error = %e, "sandbox failure");
                ExecutionResult::infra_error(e.code(), e.to_string())
            }
        }
    }

    /// Run each test case sequentially in declared order, one container per
    /// test, comparing trimmed stdout to the trimmed expectation.
    async fn run_tests(
        &self,
        spec: &LanguageSpec,
        request: &ExecutionRequest,
        cases: &[TestCase],
        timeout: Duration,
    ) -> ExecutionResult {
        let mut verdicts = Vec::with_capacity(cases.len());
        let mut all_passed = true;
        let mut total_time = 0.0;
        let mut last: Option<ExecutionResult> = None;
        let mut infra_code: Option<ErrorCode> = None;

        for (index, case) in cases.iter().enumerate() {
            let wrapped = praxis_harness::wrap(
                &request.code,
                request.language,
                "",
                WrapMode::Test { input: &case.input },
            );
            let expected = case.expected_output.trim().to_string();

            match self.runtime.run(spec, &wrapped, timeout).await {
                Ok(run) => {
                    let outcome = classify(spec, &run, timeout);
                    total_time += outcome.execution_time;
                    let actual = outcome.output.trim().to_string();
                    let passed = outcome.is_success() && actual == expected;
                    verdicts.push(TestVerdict {
                        test_number: index + 1,
                        passed,
                        input: case.input.clone(),
                        expected_output: expected,
                        actual_output: actual,
                        error: (!outcome.error.is_empty()).then(|| outcome.error.clone()),
                    });
                    if !passed {
                        all_passed = false;
                    }
                    last = Some(outcome);
                }
                Err(e) => {
                    tracing::error!(language = %spec.language, error = %e, "sandbox failure");
                    infra_code = Some(e.code());
                    verdicts.push(TestVerdict {
                        test_number: index + 1,
                        passed: false,
                        input: case.input.clone(),
                        expected_output: expected,
                        actual_output: String::new(),
                        error: Some(e.to_string()),
                    });
                    all_passed = false;
                }
            }
        }

        let Some(mut result) = last else {
            return ExecutionResult {
                status: ExecutionStatus::Error,
                output: String::new(),
                error: "No valid test cases executed".to_string(),
                execution_time: round_millis(total_time),
                exit_code: praxis_types::INFRA_EXIT_CODE,
                error_code: Some(infra_code.unwrap_or(ErrorCode::ExecutionFailed)),
                test_results: verdicts,
            };
        };

        result.status = if all_passed {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::FailedTests
        };
        if all_passed {
            result.error = String::new();
            result.error_code = None;
        }
        result.execution_time = round_millis(total_time);
        result.test_results = verdicts;
        result
    }
}

/// Classify one sandbox run into an execution result.
fn classify(spec: &LanguageSpec, run: &SandboxOutput, limit: Duration) -> ExecutionResult {
    if run.timed_out {
        return ExecutionResult {
            status: ExecutionStatus::Timeout,
            output: String::new(),
            error: format!(
                "Execution exceeded the {} second time limit",
                limit.as_secs()
            ),
            execution_time: round_secs(run.duration),
            exit_code: praxis_types::INFRA_EXIT_CODE,
            error_code: Some(ErrorCode::ExecutionTimeout),
            test_results: Vec::new(),
        };
    }

    // javac diagnostics carry a "Main.java:<line>:" prefix; surface them as
    // the error text rather than program output.
    if spec.language == Language::Java
        && (run.stdout.contains(".java:") || run.stderr.contains(".java:"))
    {
        let mut error = run.stdout.trim().to_string();
        if !run.stderr.trim().is_empty() {
            if !error.is_empty() {
                error.push('\n');
            }
            error.push_str(run.stderr.trim());
        }
        return ExecutionResult {
            status: ExecutionStatus::Error,
            output: String::new(),
            error,
            execution_time: round_secs(run.duration),
            exit_code: if run.exit_code == 0 { 1 } else { run.exit_code },
            error_code: None,
            test_results: Vec::new(),
        };
    }

    let status = if run.exit_code == 0 {
        ExecutionStatus::Success
    } else {
        ExecutionStatus::Error
    };
    ExecutionResult {
        status,
        output: run.stdout.clone(),
        error: run.stderr.clone(),
        execution_time: round_secs(run.duration),
        exit_code: run.exit_code,
        error_code: None,
        test_results: Vec::new(),
    }
}
