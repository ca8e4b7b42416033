//! Core domain types for Praxis.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application: the execution engine, the scoring pipeline, and the HTTP
//! boundary all exchange these values.

mod error;
mod execution;
mod telemetry;

pub use error::ErrorCode;
pub use execution::{
    ExecutionRequest, ExecutionResult, ExecutionStatus, INFRA_EXIT_CODE, Language, RequestError,
    TestCase, TestVerdict, UnsupportedLanguageError,
};
pub use telemetry::{
    CesResult, Classification, CognitiveState, FusionInsights, ProvenanceState,
    RawSessionMetrics,
};
