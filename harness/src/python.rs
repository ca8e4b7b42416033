//! Python driver synthesis.

use std::sync::LazyLock;

use regex::Regex;

use crate::WrapMode;
use crate::args::parse_test_args;

static USER_MAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"if\s+__name__\s*==\s*["']__main__["']\s*:"#).expect("valid regex")
});

// Removes everything from the main-block marker to the end of the source.
static USER_MAIN_TO_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\s*if\s+__name__\s*==\s*["']__main__["']\s*:.*$"#).expect("valid regex")
});

static SOLUTION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)class\s+Solution\s*[:(]").expect("valid regex"));

static INSTANCE_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"def\s+([A-Za-z_]\w*)\s*\(\s*self").expect("valid regex"));

/// True when the student brought their own `if __name__ == "__main__":` block.
pub(crate) fn has_user_main(source: &str) -> bool {
    USER_MAIN.is_match(source)
}

/// Remove the student's main block so the synthesized driver is the only
/// entry point.
pub(crate) fn strip_user_main(source: &str) -> String {
    USER_MAIN_TO_END.replace(source, "").into_owned()
}

fn has_solution_class(source: &str) -> bool {
    SOLUTION_CLASS.is_match(source)
}

/// First non-dunder instance method defined after `class Solution`.
pub(crate) fn solution_method(source: &str) -> Option<String> {
    let class_start = SOLUTION_CLASS.find(source)?.start();
    let body = &source[class_start..];
    INSTANCE_METHOD
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .find(|name| !name.starts_with("__"))
}

/// Escape a string for use inside a single-quoted Python literal.
pub(crate) fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn stdin_prelude(stdin: &str) -> String {
    format!(
        "import sys\nimport io\n\nsys.stdin = io.StringIO('{}')\n\n",
        escape_literal(stdin)
    )
}

pub(crate) fn wrap(source: &str, stdin: &str, mode: WrapMode<'_>) -> String {
    match mode {
        WrapMode::Plain => {
            if has_user_main(source) {
                // The student is doing their own testing; respect that.
                return format!("{}{source}\n", stdin_prelude(stdin));
            }
            wrap_solution(source, stdin, None)
        }
        WrapMode::Test { input } => {
            let cleaned;
            let source = if has_user_main(source) {
                cleaned = strip_user_main(source);
                cleaned.as_str()
            } else {
                source
            };
            wrap_solution(source, stdin, Some(input))
        }
    }
}

fn wrap_solution(source: &str, stdin: &str, test_input: Option<&str>) -> String {
    if !has_solution_class(source) {
        return missing_solution_driver();
    }
    let Some(method) = solution_method(source) else {
        return missing_method_driver();
    };

    match test_input {
        Some(input) => {
            let call_args = parse_test_args(input).join(", ");
            format!(
                "{prelude}{source}\n\n\
                 if __name__ == '__main__':\n\
                 {i}try:\n\
                 {i}{i}solution = Solution()\n\
                 {i}{i}result = solution.{method}({call_args})\n\
                 {i}{i}if result is not None:\n\
                 {i}{i}{i}print(result)\n\
                 {i}except Exception as e:\n\
                 {i}{i}print(f\"Error: {{e}}\", file=sys.stderr)\n\
                 {i}{i}raise\n",
                prelude = stdin_prelude(stdin),
                i = "    ",
            )
        }
        None => format!(
            "{prelude}{source}\n\n\
             if __name__ == '__main__':\n\
             {i}solution = Solution()\n\
             {i}try:\n\
             {i}{i}result = solution.{method}()\n\
             {i}{i}if result is not None:\n\
             {i}{i}{i}print(result)\n\
             {i}except TypeError:\n\
             {i}{i}print(\"Note: Method '{method}' requires parameters.\", file=sys.stderr)\n\
             {i}{i}print(\"Tip: attach test cases, or write your own main block for testing:\", file=sys.stderr)\n\
             {i}{i}print(\"\", file=sys.stderr)\n\
             {i}{i}print(\"if __name__ == '__main__':\", file=sys.stderr)\n\
             {i}{i}print(\"    s = Solution()\", file=sys.stderr)\n\
             {i}{i}print(\"    print(s.{method}(5, 3))\", file=sys.stderr)\n\
             {i}{i}sys.exit(1)\n",
            prelude = stdin_prelude(stdin),
            i = "    ",
        ),
    }
}

fn missing_method_driver() -> String {
    "import sys\n\n\
     print(\"Error: Solution class found but no methods defined.\", file=sys.stderr)\n\
     print(\"Please add a method to your Solution class.\", file=sys.stderr)\n\
     print(\"\", file=sys.stderr)\n\
     print(\"Example:\", file=sys.stderr)\n\
     print(\"  class Solution:\", file=sys.stderr)\n\
     print(\"      def hello_world(self):\", file=sys.stderr)\n\
     print(\"          return 'Hello, World!'\", file=sys.stderr)\n\
     sys.exit(1)\n"
        .to_string()
}

fn missing_solution_driver() -> String {
    "import sys\n\n\
     print(\"Error: Please define a Solution class with your methods.\", file=sys.stderr)\n\
     print(\"\", file=sys.stderr)\n\
     print(\"Example:\", file=sys.stderr)\n\
     print(\"  class Solution:\", file=sys.stderr)\n\
     print(\"      def add(self, a, b):\", file=sys.stderr)\n\
     print(\"          return a + b\", file=sys.stderr)\n\
     print(\"\", file=sys.stderr)\n\
     print(\"Then the system will test your Solution methods automatically.\", file=sys.stderr)\n\
     sys.exit(1)\n"
        .to_string()
}
