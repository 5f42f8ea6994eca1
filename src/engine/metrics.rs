//! Dispatch metrics.
//!
//! Small structs used to observe what the dispatcher did for one utterance:
//! which rules it tried, how each attempt ended, and how long it took.
//!
//! Records are cheap (one entry per attempted rule) and are always collected;
//! callers that only want the reply ignore them.

use crate::Intent;
use std::time::Duration;

/// How a single rule attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Skipped because the utterance lacked a required input trait.
    Gated,
    /// The pattern did not match.
    NoMatch,
    /// The pattern matched but the production declined to answer.
    Declined,
    /// The rule produced the reply. Always the last record of a dispatch.
    Fired,
}

/// One attempted rule.
#[derive(Debug, Clone)]
pub struct RuleRecord {
    pub name: &'static str,
    pub intent: Intent,
    pub outcome: AttemptOutcome,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct DispatchMetrics {
    /// Total elapsed time for [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
    pub total: Duration,
    /// Attempts in table order, up to and including the rule that fired.
    pub attempts: Vec<RuleRecord>,
}

impl DispatchMetrics {
    /// Number of rules whose pattern was actually evaluated.
    pub fn evaluated(&self) -> usize {
        self.attempts.iter().filter(|a| a.outcome != AttemptOutcome::Gated).count()
    }
}
