//! First-match dispatcher.
//!
//! The operational core of the engine:
//!
//! - Scan the utterance for input traits (see `trigger.rs`).
//! - Walk the rule table in order. For each rule whose traits are present,
//!   match its pattern; on a match, run its production.
//! - The first production that returns a reply ends the walk.
//! - If the table is exhausted, answer with the table's fallback reply.
//!
//! ```text
//! rule 0 ──▶ gated?  ──yes──▶ next
//!              │no
//!              ▼
//!           pattern ──none──▶ next
//!              │some(Match)
//!              ▼
//!          production ──None──▶ next (declined)
//!              │Some(reply)
//!              ▼
//!            Fired: stop
//! ```
//!
//! Exactly one reply is produced per utterance, and the dispatcher itself has
//! no failure mode: "no rule answered" is the fallback branch.

use super::compiled_rules::RuleTable;
use super::metrics::{AttemptOutcome, DispatchMetrics, RuleRecord};
use super::trigger::TraitScan;
use super::Scope;
use crate::{Intent, Match, Pattern, Rule, Utterance};
use regex::Regex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of dispatching one utterance.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub reply: String,
    /// Name of the rule that answered; `None` for the fallback reply.
    pub rule: Option<&'static str>,
    pub intent: Intent,
    pub metrics: DispatchMetrics,
}

/// Applies a [`RuleTable`] to utterances.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    table: &'a RuleTable,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Dispatcher { table }
    }

    /// Produce the reply for `utterance`.
    pub fn dispatch(&self, utterance: &Utterance, scope: &Scope<'_>) -> Dispatch {
        let start = Instant::now();
        let scan = TraitScan::scan(utterance);
        debug!(
            target: "parley::engine",
            normalized = utterance.normalized(),
            traits = ?scan.traits,
            rules = self.table.len(),
            "dispatching utterance"
        );

        let mut attempts = Vec::new();

        for (_, rule, meta) in self.table.iter() {
            if !scan.traits.contains(meta.traits) {
                attempts.push(record(rule, AttemptOutcome::Gated, Duration::ZERO));
                continue;
            }

            let attempt_start = Instant::now();
            let Some(m) = match_pattern(&rule.pattern, utterance) else {
                attempts.push(record(rule, AttemptOutcome::NoMatch, attempt_start.elapsed()));
                continue;
            };

            match (rule.production)(utterance, &m, scope) {
                Some(reply) => {
                    attempts.push(record(rule, AttemptOutcome::Fired, attempt_start.elapsed()));
                    debug!(target: "parley::engine", rule = rule.name, intent = ?rule.intent, phrase = ?m.phrase, "rule fired");
                    return Dispatch {
                        reply,
                        rule: Some(rule.name),
                        intent: rule.intent,
                        metrics: DispatchMetrics { total: start.elapsed(), attempts },
                    };
                }
                None => {
                    debug!(target: "parley::engine", rule = rule.name, "pattern matched but production declined");
                    attempts.push(record(rule, AttemptOutcome::Declined, attempt_start.elapsed()));
                }
            }
        }

        let metrics = DispatchMetrics { total: start.elapsed(), attempts };
        debug!(target: "parley::engine", evaluated = metrics.evaluated(), "no rule answered; using fallback");
        Dispatch { reply: self.table.fallback.to_string(), rule: None, intent: Intent::Fallback, metrics }
    }
}

fn record(rule: &Rule, outcome: AttemptOutcome, duration: Duration) -> RuleRecord {
    RuleRecord { name: rule.name, intent: rule.intent, outcome, duration }
}

/// Match `pattern` against the view of `utterance` it inspects.
pub(crate) fn match_pattern(pattern: &Pattern, utterance: &Utterance) -> Option<Match> {
    let text = utterance.normalized();
    match pattern {
        Pattern::Phrases(phrases) => {
            let phrase = phrases.iter().copied().find(|p| text.contains(p))?;
            Some(Match { phrase: Some(phrase), ..Match::default() })
        }
        Pattern::Table(entries) => {
            let (phrase, entry) = entries.iter().copied().find(|(p, _)| text.contains(p))?;
            Some(Match { phrase: Some(phrase), entry: Some(entry), ..Match::default() })
        }
        Pattern::Prefix(prefix) => {
            text.starts_with(prefix).then(|| Match { phrase: Some(*prefix), ..Match::default() })
        }
        Pattern::Regex(re) => captures(re, text),
        Pattern::RawRegex(re) => captures(re, utterance.raw().trim()),
        Pattern::RawPhrases(tokens) => {
            let raw = utterance.raw();
            let token = tokens.iter().copied().find(|t| raw.contains(t))?;
            Some(Match { phrase: Some(token), ..Match::default() })
        }
    }
}

/// Leftmost match only; later matches are never consulted.
fn captures(re: &Regex, text: &str) -> Option<Match> {
    let caps = re.captures(text)?;
    let groups = caps.iter().map(|g| g.map(|g| g.as_str().to_string()).unwrap_or_default()).collect();
    Some(Match { groups, ..Match::default() })
}
