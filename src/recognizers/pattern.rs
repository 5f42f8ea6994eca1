//! Whole-string regular expression matching for user-supplied patterns.

use super::Recognition;
use regex::RegexBuilder;

/// Upper bound on the compiled size of a user pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Test whether `pattern` matches the whole of `text`.
///
/// Substring matches do not count. An invalid pattern is an error, not a
/// rejection.
pub fn match_regex(pattern: &str, text: &str) -> Recognition {
    // Compile the pattern on its own first so a stray `)` cannot pair up with
    // the anchoring group below.
    if let Err(err) = build(pattern) {
        return Recognition::error(format!("Regex error: {err}"));
    }

    match build(&format!(r"\A(?:{pattern})\z")) {
        Ok(re) if re.is_match(text) => Recognition::accepted("Regex matched!"),
        Ok(_) => Recognition::rejected("Regex did NOT match."),
        Err(err) => Recognition::error(format!("Regex error: {err}")),
    }
}

fn build(pattern: &str) -> Result<regex::Regex, regex::Error> {
    RegexBuilder::new(pattern).size_limit(PATTERN_SIZE_LIMIT).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verdict;

    #[test]
    fn matches_whole_string_only() {
        assert_eq!(match_regex("a+b", "aaab").verdict, Verdict::Accepted);
        assert_eq!(match_regex("a+b", "aaabc").verdict, Verdict::Rejected);
        assert_eq!(match_regex("b", "abc").message, "Regex did NOT match.");
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        assert_eq!(match_regex("a|ab", "ab").verdict, Verdict::Accepted);
        assert_eq!(match_regex("a|b", "ab").verdict, Verdict::Rejected);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let res = match_regex("(", "x");
        assert_eq!(res.verdict, Verdict::Error);
        assert!(res.message.starts_with("Regex error: "));
    }

    #[test]
    fn unbalanced_close_cannot_escape_anchoring() {
        assert_eq!(match_regex("a)(b", "ab").verdict, Verdict::Error);
    }

    #[test]
    fn empty_pattern_matches_only_empty_text() {
        assert_eq!(match_regex("", "").verdict, Verdict::Accepted);
        assert_eq!(match_regex("", "x").verdict, Verdict::Rejected);
    }
}
