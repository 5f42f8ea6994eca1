//! Trait scanning (input pre-classification).
//!
//! Inspects an utterance and produces coarse `InputTraits` that let the
//! dispatcher skip rules without running their patterns.
//!
//! ## Design notes
//!
//! - Unlike a heuristic pre-filter, a false negative here would change which
//!   rule answers. Every trait must therefore be implied by the patterns that
//!   require it (see the invariants in `compiled_rules.rs`).
//! - The scan only looks at the normalized text. Arithmetic characters are
//!   untouched by normalization, so the raw-text arithmetic rule can rely on
//!   the same trait.

use super::compiled_rules::InputTraits;
use crate::Utterance;

/// Prefixes of the command mini-language.
pub(crate) const COMMAND_PREFIXES: &[&str] = &["regex:", "dfa:", "pda:", "cfg:"];

/// Non-space characters of the arithmetic character class.
const ARITHMETIC_CHARS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '+', '-', '*', '/', '(', ')', '.'];

/// Input traits detected from an utterance.
#[derive(Debug, Clone, Copy)]
pub struct TraitScan {
    pub traits: InputTraits,
}

impl TraitScan {
    pub fn scan(utterance: &Utterance) -> Self {
        let text = utterance.normalized();
        let mut traits = InputTraits::empty();

        if COMMAND_PREFIXES.iter().any(|p| text.starts_with(p)) {
            traits |= InputTraits::COMMAND_PREFIX;
        }

        if text.contains(ARITHMETIC_CHARS) {
            traits |= InputTraits::ARITHMETIC;
        }

        TraitScan { traits }
    }
}
