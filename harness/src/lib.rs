//! Test-harness synthesis for student code.
//!
//! Students write a top-level `Solution` type with one or more methods, and
//! may optionally bring their own entry point for sanity checks. [`wrap`]
//! inspects the submitted source and emits a single compilable/runnable unit
//! for the target language:
//!
//! 1. Own entry point present: honor it. The driver injects stdin and
//!    delegates. In test mode the student's entry point is stripped first so
//!    the synthesized driver is the only one.
//! 2. `Solution` with at least one method: the driver constructs a `Solution`
//!    and calls the first method, with the test case's parsed arguments in
//!    test mode or zero arguments in plain mode.
//! 3. `Solution` without methods, or no `Solution` at all: the driver prints
//!    a structured hint on stderr and exits non-zero.
//!
//! `wrap` is total. Unrecognized student forms become hint drivers, so
//! harness misuse always surfaces as an ordinary execution outcome rather
//! than a service error.

mod args;
mod java;
mod python;

pub use args::parse_test_args;

use praxis_types::Language;

/// How the synthesized driver should exercise the student's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode<'a> {
    /// Run the code once with no arguments.
    Plain,
    /// Call the target method with the test case's argument literal.
    Test { input: &'a str },
}

/// Wrap student source into a runnable unit for `language`.
///
/// `stdin` is escaped and installed as the process's standard input before
/// any student code runs.
#[must_use]
pub fn wrap(source: &str, language: Language, stdin: &str, mode: WrapMode<'_>) -> String {
    match language {
        Language::Python => python::wrap(source, stdin, mode),
        Language::Java => java::wrap(source, stdin, mode),
    }
}

