//! The command mini-language: `regex:`, `dfa:`, `pda:` and `cfg:` prefixes
//! routed to the recognizers.
//!
//! Commands are read from the normalized text, so patterns and inputs arrive
//! lower-cased with collapsed whitespace. Every occurrence of the prefix is
//! removed from the argument, not just the leading one.

use crate::engine::InputTraits;
use crate::{Intent, Pattern, Rule, Utterance};
use crate::{check_balanced_parentheses, check_dfa_ends01, check_toy_cfg, match_regex};

pub(crate) const REGEX_FORMAT_HINT: &str = "Format: regex:<pattern>; string:<text>";

/// Argument of a single-part command: the text with `prefix` removed, trimmed.
fn argument(utt: &Utterance, prefix: &str) -> String {
    utt.normalized().replace(prefix, "").trim().to_string()
}

/// `regex:<pattern>; string:<text>`. Only the first two `;`-separated parts
/// are read; a missing second part yields the format hint.
pub fn rule_regex_command() -> Rule {
    rule! {
        name: "regex command",
        intent: Intent::Command,
        pattern: Pattern::Prefix("regex:"),
        traits: InputTraits::COMMAND_PREFIX.bits(),
        prod: |utt, _m, _scope| {
            let mut parts = utt.normalized().split(';');
            let pattern = parts.next().unwrap_or_default().replace("regex:", "");
            let Some(subject) = parts.next() else {
                return Some(REGEX_FORMAT_HINT.to_string());
            };
            let subject = subject.replace("string:", "");
            Some(match_regex(pattern.trim(), subject.trim()).message)
        },
    }
}

pub fn rule_dfa_command() -> Rule {
    rule! {
        name: "dfa command",
        intent: Intent::Command,
        pattern: Pattern::Prefix("dfa:"),
        traits: InputTraits::COMMAND_PREFIX.bits(),
        prod: |utt, _m, _scope| { Some(check_dfa_ends01(&argument(utt, "dfa:")).message) },
    }
}

pub fn rule_pda_command() -> Rule {
    rule! {
        name: "pda command",
        intent: Intent::Command,
        pattern: Pattern::Prefix("pda:"),
        traits: InputTraits::COMMAND_PREFIX.bits(),
        prod: |utt, _m, _scope| { Some(check_balanced_parentheses(&argument(utt, "pda:")).message) },
    }
}

pub fn rule_cfg_command() -> Rule {
    rule! {
        name: "cfg command",
        intent: Intent::Command,
        pattern: Pattern::Prefix("cfg:"),
        traits: InputTraits::COMMAND_PREFIX.bits(),
        prod: |utt, _m, _scope| { Some(check_toy_cfg(&argument(utt, "cfg:")).message) },
    }
}
