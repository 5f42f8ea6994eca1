//! Text normalization applied before rule matching.
//!
//! The pipeline is fixed:
//!
//! ```text
//! raw ── lowercase ── contraction rewrite ── collapse + trim whitespace
//! ```
//!
//! Contractions are rewritten before whitespace is collapsed. The rewrite
//! output never contains whitespace or an apostrophe, and collapsing never
//! touches non-whitespace, so running the pipeline twice yields the same text.

/// Contractions rewritten to their apostrophe-free spelling.
const CONTRACTIONS: &[(&str, &str)] = &[("what's", "whats")];

/// Canonicalize `input` for rule matching.
///
/// Lower-cases, rewrites known contractions, and collapses every run of
/// whitespace into a single space with no leading or trailing whitespace.
///
/// # Example
/// ```
/// assert_eq!(parley::normalize("  What's   UP\t"), "whats up");
/// assert_eq!(parley::normalize(""), "");
/// ```
pub fn normalize(input: &str) -> String {
    let mut text = input.to_lowercase();
    for (from, to) in CONTRACTIONS {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
