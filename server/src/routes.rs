//! Request handlers and the auth middleware.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use praxis_types::{ErrorCode, ExecutionStatus, Language};

use crate::error::ApiError;
use crate::state::{AppState, Backend};
use crate::wire::{
    ExecuteBody, ExecuteResponse, HealthResponse, LanguagesResponse, TelemetryBody,
    TelemetryResponse, timestamp_now,
};

const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret check for the protected routes. The provided value is never
/// echoed back or logged.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(state.config.api_key.as_str()) {
        tracing::warn!(path = %request.uri().path(), "rejected request with missing or invalid API key");
        return ApiError::auth_failed().into_response();
    }
    next.run(request).await
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Praxis",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
    }))
}

/// Execute student code. Every outcome, including student-code failures and
/// an unsupported language tag, is a 200 with an execution-shaped body.
pub async fn execute(
    State(state): State<AppState>,
    Json(body): Json<ExecuteBody>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let language = match Language::parse(&body.language) {
        Ok(language) => language,
        Err(e) => {
            return Ok(Json(ExecuteResponse::failure(
                ExecutionStatus::Error,
                ErrorCode::InvalidInput,
                e.to_string(),
            )));
        }
    };

    match &state.backend {
        Backend::Remote(client) => {
            // Validation happens on the remote side as well; forwarding the
            // body untouched keeps the two deployments in agreement.
            Ok(Json(client.execute(&body).await))
        }
        Backend::Local(engine) => {
            let request = body
                .into_request(language)
                .map_err(|e| ApiError::invalid_input(e.to_string()))?;
            tracing::info!(language = %language, tests = request.test_cases.as_ref().map_or(0, Vec::len), "executing code");
            let result = engine.execute(&request).await;
            tracing::info!(status = result.status.as_str(), time = result.execution_time, "execution completed");
            Ok(Json(ExecuteResponse::from(result)))
        }
    }
}

/// Score one telemetry snapshot. Non-student callers get a neutral result;
/// identity fields never influence the numbers.
pub async fn analyze_telemetry(Json(body): Json<TelemetryBody>) -> Json<TelemetryResponse> {
    if body.account_type != "student" {
        tracing::info!(account_type = %body.account_type, "skipping telemetry for non-student caller");
        return Json(TelemetryResponse::not_applicable());
    }

    let result = praxis_scoring::score(&body.metrics);
    tracing::info!(ces = result.ces, classification = result.classification.as_str(), "ces computed");
    Json(TelemetryResponse {
        kpm: result.effective_kpm,
        ad: result.effective_ad,
        ir: result.effective_ir,
        fvc: body.metrics.focus_violation_count,
        ces: result.ces,
        ces_classification: result.classification.as_str().to_string(),
        provenance_state: result.provenance_state.as_str().to_string(),
        cognitive_state: result.cognitive_state.as_str().to_string(),
        effective_kpm: result.effective_kpm,
        effective_ad: result.effective_ad,
        effective_ir: result.effective_ir,
        integrity_penalty: result.integrity_penalty,
        timestamp: timestamp_now(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    match &state.backend {
        Backend::Local(engine) => {
            let docker_available = engine.runtime_available().await;
            Json(HealthResponse {
                status: if docker_available { "healthy" } else { "degraded" }.to_string(),
                docker_available,
                languages: supported_languages(),
            })
        }
        Backend::Remote(client) => Json(client.health().await),
    }
}

pub async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    match &state.backend {
        Backend::Local(_) => Json(LanguagesResponse {
            languages: supported_languages(),
        }),
        Backend::Remote(client) => Json(LanguagesResponse {
            languages: client.languages().await,
        }),
    }
}

fn supported_languages() -> Vec<String> {
    praxis_executor::Engine::supported_languages()
        .into_iter()
        .map(str::to_string)
        .collect()
}
