//! The default rule table.
//!
//! Rules are listed in dispatch precedence: earlier rules shadow later ones.
//! Reordering this list changes behavior (e.g. greetings are checked before
//! arithmetic, so "hi, what is 2+2" is greeted).

mod arithmetic;
mod code;
mod commands;
mod conversation;
#[cfg(test)]
mod tests;

use crate::Rule;
use crate::engine::RuleTable;

/// Reply when no rule answers.
pub(crate) const FALLBACK: &str =
    "Sorry, I didn't get that. I can do greetings, math, run code, jokes, DFA/PDA/CFG demos, or tell fun facts.";

pub fn get() -> Vec<Rule> {
    vec![
        conversation::rule_good_morning(),
        conversation::rule_good_afternoon(),
        conversation::rule_good_evening(),
        conversation::rule_good_night(),
        conversation::rule_greeting(),
        conversation::rule_time_query(),
        conversation::rule_small_talk(),
        conversation::rule_gratitude(),
        conversation::rule_farewell(),
        conversation::rule_fun_fact(),
        conversation::rule_glossary(),
        commands::rule_regex_command(),
        commands::rule_dfa_command(),
        commands::rule_pda_command(),
        commands::rule_cfg_command(),
        arithmetic::rule_pure_arithmetic(),
        arithmetic::rule_embedded_arithmetic(),
        code::rule_code(),
        conversation::rule_joke(),
    ]
}

pub(crate) fn table() -> RuleTable {
    RuleTable::new(get(), FALLBACK)
}
