//! Test-input argument parsing.
//!
//! A test case's input is a comma-separated list of source-language literals.
//! Tokens are preserved byte-for-byte so that `"hello"` stays quoted and `5`
//! stays bare when spliced into the call site.

/// Parse a test input literal into positional argument tokens.
///
/// The empty string and the case-insensitive sentinel `none` both mean zero
/// arguments. Splitting happens on top-level commas only: commas inside
/// string literals or inside brackets do not separate arguments.
#[must_use]
pub fn parse_test_args(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in trimmed.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    args.push(current.trim().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_none_mean_zero_args() {
        assert!(parse_test_args("").is_empty());
        assert!(parse_test_args("   ").is_empty());
        assert!(parse_test_args("none").is_empty());
        assert!(parse_test_args("None").is_empty());
        assert!(parse_test_args("NONE").is_empty());
    }

    #[test]
    fn splits_simple_scalars() {
        assert_eq!(parse_test_args("5, 3"), vec!["5", "3"]);
        assert_eq!(parse_test_args("-5, 3"), vec!["-5", "3"]);
        assert_eq!(parse_test_args("10, 20"), vec!["10", "20"]);
    }

    #[test]
    fn single_argument_is_preserved() {
        assert_eq!(parse_test_args("42"), vec!["42"]);
    }

    #[test]
    fn quoted_strings_keep_their_quotes() {
        assert_eq!(
            parse_test_args(r#""hello", "world""#),
            vec![r#""hello""#, r#""world""#]
        );
    }

    #[test]
    fn commas_inside_strings_do_not_split() {
        assert_eq!(
            parse_test_args(r#""a, b", 3"#),
            vec![r#""a, b""#, "3"]
        );
    }

    #[test]
    fn commas_inside_brackets_do_not_split() {
        assert_eq!(
            parse_test_args("[1, 2, 3], 4"),
            vec!["[1, 2, 3]", "4"]
        );
        assert_eq!(
            parse_test_args("(1, 2), {3: 4}"),
            vec!["(1, 2)", "{3: 4}"]
        );
    }

    #[test]
    fn escaped_quote_does_not_end_a_string() {
        assert_eq!(
            parse_test_args(r#""a\"b", 1"#),
            vec![r#""a\"b""#, "1"]
        );
    }
}
