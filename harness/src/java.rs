//! Java driver synthesis.
//!
//! The synthesized unit is always a `public class Main` driver compiled
//! alongside the student's `Solution` class in one source file. An own entry
//! point must live inside `Solution`; the driver then delegates with
//! `Solution.main(args)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::WrapMode;
use crate::args::parse_test_args;

static USER_MAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+static\s+void\s+main\s*\(\s*String\s*\[\s*\]\s+\w+\s*\)")
        .expect("valid regex")
});

static USER_MAIN_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+static\s+void\s+main\s*\(\s*String\s*\[\s*\]\s+\w+\s*\)\s*(?:throws[^{]*)?\{")
        .expect("valid regex")
});

static SOLUTION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+Solution\s*\{").expect("valid regex"));

static PUBLIC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:static\s+)?(\w+(?:<[^>]+>)?(?:\[\])?)\s+(\w+)\s*\(")
        .expect("valid regex")
});

/// True when the student defined `public static void main(String[] args)`.
pub(crate) fn has_user_main(source: &str) -> bool {
    USER_MAIN.is_match(source)
}

/// Remove the student's main method by matching braces from its opening `{`.
///
/// Returns the source unchanged when no main method is present or the braces
/// never balance (a compile error the student will see anyway).
pub(crate) fn strip_user_main(source: &str) -> String {
    let Some(found) = USER_MAIN_OPEN.find(source) else {
        return source.to_string();
    };

    let brace_start = found.end() - 1;
    let mut depth = 1_i32;
    let bytes = source.as_bytes();
    let mut pos = brace_start + 1;
    while pos < bytes.len() && depth > 0 {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
        pos += 1;
    }

    if depth == 0 {
        let mut cleaned = String::with_capacity(source.len());
        cleaned.push_str(&source[..found.start()]);
        cleaned.push_str(&source[pos..]);
        cleaned
    } else {
        source.to_string()
    }
}

fn has_solution_class(source: &str) -> bool {
    SOLUTION_CLASS.is_match(source)
}

/// First public non-constructor method of `Solution`: `(return_type, name)`.
pub(crate) fn solution_method(source: &str) -> Option<(String, String)> {
    let class_start = SOLUTION_CLASS.find(source)?.end();
    let body = &source[class_start..];
    PUBLIC_METHOD
        .captures_iter(body)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .find(|(_, name)| name != "main")
}

/// Escape a string for use inside a double-quoted Java literal.
pub(crate) fn escape_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

pub(crate) fn wrap(source: &str, stdin: &str, mode: WrapMode<'_>) -> String {
    match mode {
        WrapMode::Plain => {
            if has_user_main(source) {
                return delegate_driver(source, stdin);
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
    let Some((return_type, method)) = solution_method(source) else {
        return missing_method_driver(source);
    };

    match test_input {
        Some(input) => {
            let call_args = parse_test_args(input).join(", ");
            let invocation = if return_type.eq_ignore_ascii_case("void") {
                format!("solution.{method}({call_args});")
            } else {
                format!(
                    "{return_type} result = solution.{method}({call_args});\n                System.out.println(result);"
                )
            };
            format!(
                "import java.io.*;\n\
                 import java.util.*;\n\n\
                 {source}\n\n\
                 public class Main {{\n\
                 \x20   public static void main(String[] args) throws Exception {{\n\
                 \x20       String input = \"{stdin}\";\n\
                 \x20       System.setIn(new ByteArrayInputStream(input.getBytes()));\n\
                 \x20       try {{\n\
                 \x20           Solution solution = new Solution();\n\
                 \x20           {invocation}\n\
                 \x20       }} catch (Exception e) {{\n\
                 \x20           System.err.println(\"Runtime Error: \" + e.getClass().getSimpleName() + \": \" + e.getMessage());\n\
                 \x20           System.exit(1);\n\
                 \x20       }}\n\
                 \x20   }}\n\
                 }}\n",
                stdin = escape_literal(stdin),
            )
        }
        None => format!(
            "import java.io.*;\n\
             import java.util.*;\n\n\
             {source}\n\n\
             public class Main {{\n\
             \x20   public static void main(String[] args) throws Exception {{\n\
             \x20       String input = \"{stdin}\";\n\
             \x20       System.setIn(new ByteArrayInputStream(input.getBytes()));\n\
             \x20       Solution solution = new Solution();\n\
             \x20       try {{\n\
             \x20           java.lang.reflect.Method method = Solution.class.getMethod(\"{method}\");\n\
             \x20           Object result = method.invoke(solution);\n\
             \x20           if (result != null) {{\n\
             \x20               System.out.println(result);\n\
             \x20           }}\n\
             \x20       }} catch (NoSuchMethodException e) {{\n\
             \x20           System.err.println(\"Note: Method '{method}' requires parameters.\");\n\
             \x20           System.err.println(\"Tip: attach test cases, or write your own main method for testing:\");\n\
             \x20           System.err.println(\"\");\n\
             \x20           System.err.println(\"  public static void main(String[] args) {{\");\n\
             \x20           System.err.println(\"      Solution s = new Solution();\");\n\
             \x20           System.err.println(\"      System.out.println(s.{method}(5, 3));\");\n\
             \x20           System.err.println(\"  }}\");\n\
             \x20           System.exit(1);\n\
             \x20       }} catch (java.lang.reflect.InvocationTargetException e) {{\n\
             \x20           Throwable cause = e.getCause();\n\
             \x20           System.err.println(\"Runtime Error: \" + cause.getClass().getSimpleName() + \": \" + cause.getMessage());\n\
             \x20           System.exit(1);\n\
             \x20       }}\n\
             \x20   }}\n\
             }}\n",
            stdin = escape_literal(stdin),
        ),
    }
}

fn delegate_driver(source: &str, stdin: &str) -> String {
    format!(
        "import java.io.*;\n\
         import java.util.*;\n\n\
         {source}\n\n\
         public class Main {{\n\
         \x20   public static void main(String[] args) throws Exception {{\n\
         \x20       String input = \"{stdin}\";\n\
         \x20       System.setIn(new ByteArrayInputStream(input.getBytes()));\n\
         \x20       Solution.main(args);\n\
         \x20   }}\n\
         }}\n",
        stdin = escape_literal(stdin),
    )
}

fn missing_method_driver(source: &str) -> String {
    format!(
        "import java.io.*;\n\
         import java.util.*;\n\n\
         {source}\n\n\
         public class Main {{\n\
         \x20   public static void main(String[] args) throws Exception {{\n\
         \x20       System.err.println(\"Error: Solution class found but no methods defined.\");\n\
         \x20       System.err.println(\"Please add a public method to your Solution class.\");\n\
         \x20       System.err.println(\"\");\n\
         \x20       System.err.println(\"Example:\");\n\
         \x20       System.err.println(\"  class Solution {{\");\n\
         \x20       System.err.println(\"      public String helloWorld() {{\");\n\
         \x20       System.err.println(\"          return \\\"Hello, World!\\\";\");\n\
         \x20       System.err.println(\"      }}\");\n\
         \x20       System.err.println(\"  }}\");\n\
         \x20       System.exit(1);\n\
         \x20   }}\n\
         }}\n",
    )
}

fn missing_solution_driver() -> String {
    "import java.io.*;\n\
     import java.util.*;\n\n\
     public class Main {\n\
     \x20   public static void main(String[] args) throws Exception {\n\
     \x20       System.err.println(\"Error: Please define a Solution class with your methods.\");\n\
     \x20       System.err.println(\"\");\n\
     \x20       System.err.println(\"Example:\");\n\
     \x20       System.err.println(\"  class Solution {\");\n\
     \x20       System.err.println(\"      public int add(int a, int b) {\");\n\
     \x20       System.err.println(\"          return a + b;\");\n\
     \x20       System.err.println(\"      }\");\n\
     \x20       System.err.println(\"  }\");\n\
     \x20       System.err.println(\"\");\n\
     \x20       System.err.println(\"Then the system will test your Solution methods automatically.\");\n\
     \x20       System.exit(1);\n\
     \x20   }\n\
     }\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION_ADD: &str =
        "class Solution {\n    public int add(int a, int b) {\n        return a + b;\n    }\n}\n";

    const SOLUTION_WITH_MAIN: &str = "class Solution {\n    public int add(int a, int b) {\n        return a + b;\n    }\n\n    public static void main(String[] args) {\n        Solution s = new Solution();\n        System.out.println(s.add(5, 3));\n    }\n}\n";

    // ========================================================================
    // Detection tests
    // ========================================================================

    #[test]
    fn detects_main_method_variations() {
        assert!(has_user_main("public static void main(String[] args) {"));
        assert!(has_user_main("public  static  void  main( String[]  args ) {"));
        assert!(has_user_main("public static void main(String[] params) {"));
    }

    #[test]
    fn no_main_method_is_not_detected() {
        assert!(!has_user_main(SOLUTION_ADD));
    }

    #[test]
    fn extracts_first_public_method_and_return_type() {
        let (return_type, name) = solution_method(SOLUTION_ADD).unwrap();
        assert_eq!(return_type, "int");
        assert_eq!(name, "add");
    }

    #[test]
    fn extracts_generic_and_array_return_types() {
        let generic = "class Solution {\n    public List<String> names() { return null; }\n}\n";
        let (return_type, name) = solution_method(generic).unwrap();
        assert_eq!(return_type, "List<String>");
        assert_eq!(name, "names");

        let array = "class Solution {\n    public int[] firstTwo(int[] xs) { return xs; }\n}\n";
        let (return_type, name) = solution_method(array).unwrap();
        assert_eq!(return_type, "int[]");
        assert_eq!(name, "firstTwo");
    }

    #[test]
    fn skips_the_main_method_during_extraction() {
        let code = "class Solution {\n    public static void main(String[] args) {}\n    public int add(int a, int b) { return a + b; }\n}\n";
        let (_, name) = solution_method(code).unwrap();
        assert_eq!(name, "add");
    }

    #[test]
    fn no_public_methods_yields_none() {
        let code = "class Solution {\n    private int hidden() { return 1; }\n}\n";
        assert_eq!(solution_method(code), None);
    }

    // ========================================================================
    // strip_user_main tests
    // ========================================================================

    #[test]
    fn strip_removes_main_with_nested_braces() {
        let code = "class Solution {\n    public int add(int a, int b) { return a + b; }\n    public static void main(String[] args) {\n        if (true) {\n            System.out.println(new Solution().add(1, 2));\n        }\n    }\n}\n";
        let cleaned = strip_user_main(code);
        assert!(!USER_MAIN.is_match(&cleaned));
        assert!(cleaned.contains("public int add"));
        // The class's own closing brace survives.
        assert!(cleaned.trim_end().ends_with('}'));
    }

    #[test]
    fn strip_handles_a_throws_clause() {
        let code = "class Solution {\n    public int add(int a, int b) { return a + b; }\n    public static void main(String[] args) throws Exception {\n        System.out.println(1);\n    }\n}\n";
        let cleaned = strip_user_main(code);
        assert!(!USER_MAIN.is_match(&cleaned));
        assert!(cleaned.contains("public int add"));
    }

    #[test]
    fn strip_without_main_is_identity() {
        assert_eq!(strip_user_main(SOLUTION_ADD), SOLUTION_ADD);
    }

    #[test]
    fn strip_with_unbalanced_braces_is_identity() {
        let code = "class Solution {\n    public static void main(String[] args) {\n        // missing closer\n";
        assert_eq!(strip_user_main(code), code);
    }

    // ========================================================================
    // Wrapping tests
    // ========================================================================

    #[test]
    fn plain_mode_delegates_to_user_main() {
        let wrapped = wrap(SOLUTION_WITH_MAIN, "", WrapMode::Plain);
        assert!(wrapped.contains("Solution.main(args);"));
        assert!(!wrapped.contains("getMethod"));
    }

    #[test]
    fn plain_mode_auto_calls_via_reflection() {
        let code = "class Solution {\n    public String helloWorld() {\n        return \"Hello, World\";\n    }\n}\n";
        let wrapped = wrap(code, "", WrapMode::Plain);
        assert!(wrapped.contains("Solution.class.getMethod(\"helloWorld\")"));
        assert!(wrapped.contains("Note: Method 'helloWorld' requires parameters."));
        assert!(!wrapped.contains("Solution.main"));
    }

    #[test]
    fn test_mode_uses_typed_call_and_prints_result() {
        let wrapped = wrap(SOLUTION_ADD, "", WrapMode::Test { input: "5, 3" });
        assert!(wrapped.contains("int result = solution.add(5, 3);"));
        assert!(wrapped.contains("System.out.println(result);"));
    }

    #[test]
    fn test_mode_void_method_does_not_print() {
        let code = "class Solution {\n    public void log(int x) {}\n}\n";
        let wrapped = wrap(code, "", WrapMode::Test { input: "1" });
        assert!(wrapped.contains("solution.log(1);"));
        assert!(!wrapped.contains("println(result)"));
    }

    #[test]
    fn test_mode_preserves_quoted_string_arguments() {
        let code = "class Solution {\n    public String echo(String s) { return s; }\n}\n";
        let wrapped = wrap(code, "", WrapMode::Test { input: "\"hello\"" });
        assert!(wrapped.contains("solution.echo(\"hello\")"));
    }

    #[test]
    fn test_mode_strips_user_main_first() {
        let wrapped = wrap(SOLUTION_WITH_MAIN, "", WrapMode::Test { input: "5, 3" });
        // Exactly one main: the synthesized driver's.
        assert_eq!(wrapped.matches("static void main").count(), 1);
        assert!(wrapped.contains("int result = solution.add(5, 3);"));
    }

    #[test]
    fn strip_and_rewrap_keeps_a_single_entry_point() {
        let wrapped = wrap(SOLUTION_ADD, "", WrapMode::Test { input: "5, 3" });
        let stripped = strip_user_main(&wrapped);
        assert!(!USER_MAIN.is_match(&stripped));
    }

    #[test]
    fn missing_solution_class_yields_hint_driver() {
        let wrapped = wrap("System.out.println(\"hi\");", "", WrapMode::Plain);
        assert!(wrapped.contains("Please define a Solution class"));
        assert!(wrapped.contains("System.exit(1);"));
        // The unparseable fragment must not be compiled along.
        assert!(!wrapped.contains("System.out.println(\"hi\");"));
    }

    #[test]
    fn solution_without_methods_yields_hint_driver() {
        let code = "class Solution {\n}\n";
        let wrapped = wrap(code, "", WrapMode::Plain);
        assert!(wrapped.contains("no methods defined"));
        assert!(wrapped.contains("System.exit(1);"));
    }

    // ========================================================================
    // Stdin escaping tests
    // ========================================================================

    #[test]
    fn stdin_is_escaped_as_a_literal() {
        let wrapped = wrap(SOLUTION_ADD, "a\"b\nc\t\\", WrapMode::Plain);
        assert!(wrapped.contains(r#"String input = "a\"b\nc\t\\";"#));
    }

    #[test]
    fn stdin_injection_precedes_delegation() {
        let wrapped = wrap(SOLUTION_WITH_MAIN, "data", WrapMode::Plain);
        let setin = wrapped.find("System.setIn").unwrap();
        let delegate = wrapped.find("Solution.main(args)").unwrap();
        assert!(setin < delegate);
    }
}
