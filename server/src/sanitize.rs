//! Outbound error-message sanitizing.
//!
//! Every error string leaving the service passes through here first: host
//! paths, SQL fragments, stack-trace markers, and bearer tokens are removed
//! so that internals never reach a caller. Full detail stays in the logs.

use std::sync::LazyLock;

use regex::Regex;

static WINDOWS_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]:[/\\][^\s]+").expect("valid regex"));

// Absolute unix paths with at least two components; single-segment routes
// like /execute stay readable.
static UNIX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:[\w.-]+/)+[\w.-]+").expect("valid regex"));

static SQL_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SELECT\s.+?\sFROM").expect("valid regex"));

static SQL_INSERT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)INSERT\s+INTO\s.+?\sVALUES").expect("valid regex"));

static TRACEBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Traceback.*$").expect("valid regex"));

static STACK_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"File ".*", line \d+"#).expect("valid regex"));

static BEARER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=-]+").expect("valid regex"));

/// Strip sensitive fragments from an error message.
#[must_use]
pub fn sanitize_error_message(message: &str) -> String {
    let message = WINDOWS_PATH.replace_all(message, "[PATH]");
    let message = UNIX_PATH.replace_all(&message, "[PATH]");
    let message = SQL_SELECT.replace_all(&message, "SELECT ... FROM");
    let message = SQL_INSERT.replace_all(&message, "INSERT INTO ... VALUES");
    let message = TRACEBACK.replace_all(&message, "");
    let message = STACK_FRAME.replace_all(&message, "");
    let message = BEARER_TOKEN.replace_all(&message, "Bearer [REDACTED]");
    message.trim().to_string()
}
