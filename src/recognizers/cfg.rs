//! Toy "grammar": a closed vocabulary of pronouns, verbs and nouns.
//!
//! No structure is enforced beyond vocabulary membership; "apples love i" is
//! as valid as "i love apples".

use super::Recognition;

const VOCABULARY: &[&str] =
    &["i", "you", "he", "she", "it", "we", "they", "like", "love", "eat", "food", "apples", "bananas"];

const VALID: &str = "Valid sentence according to toy CFG";
const INVALID: &str = "Invalid sentence according to toy CFG";

/// Accept iff every whitespace-separated token, lower-cased, is in the
/// vocabulary. A sentence with no tokens is accepted.
pub fn check_toy_cfg(sentence: &str) -> Recognition {
    let lower = sentence.to_lowercase();
    if lower.split_whitespace().all(|token| VOCABULARY.contains(&token)) {
        Recognition::accepted(VALID)
    } else {
        Recognition::rejected(INVALID)
    }
}
