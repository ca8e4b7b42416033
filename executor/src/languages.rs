//! Static language dispatch table.
//!
//! Each supported language declares its sandbox image, resource caps, fixed
//! source filename, and in-container command. The compile step, where one
//! exists, is folded into the command. The wall-clock ceiling is a request
//! property, not a language one.

use praxis_types::Language;

/// Execution strategy for one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageSpec {
    pub language: Language,
    /// Container image identifier; pulled once at startup.
    pub image: &'static str,
    /// Hard memory cap, in the runtime's `--memory` syntax.
    pub memory_limit: &'static str,
    /// CPU quota as a fraction of one core.
    pub cpus: &'static str,
    /// Filename the wrapped source is staged under inside `/sandbox`.
    pub source_file: &'static str,
    /// Command executed inside the container.
    pub command: &'static [&'static str],
    /// KEY=VALUE environment entries for the container.
    pub env: &'static [&'static str],
}

const PYTHON: LanguageSpec = LanguageSpec {
    language: Language::Python,
    image: "python:3.10-alpine",
    memory_limit: "128m",
    cpus: "0.5",
    source_file: "main.py",
    command: &["python", "/sandbox/main.py"],
    env: &["PYTHONUNBUFFERED=1", "PYTHONDONTWRITEBYTECODE=1"],
};

// The JVM heap stays under the 256 MiB container cap; classes compile into
// the tmpfs scratch, never back into the read-only staging mount.
const JAVA: LanguageSpec = LanguageSpec {
    language: Language::Java,
    image: "eclipse-temurin:17-jdk-alpine",
    memory_limit: "256m",
    cpus: "0.5",
    source_file: "Main.java",
    command: &[
        "/bin/sh",
        "-c",
        "javac -d /tmp /sandbox/Main.java && java -Xmx128m -cp /tmp Main",
    ],
    env: &[],
};

pub const REGISTRY: &[LanguageSpec] = &[PYTHON, JAVA];

/// Resolve the strategy for a validated language tag.
#[must_use]
pub fn spec_for(language: Language) -> &'static LanguageSpec {
    match language {
        Language::Python => &PYTHON,
        Language::Java => &JAVA,
    }
}
