//! Intent dispatch engine.
//!
//! This module is the entry point for turning one utterance into one reply. It
//! is split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! rules (all, in priority order) ──┐
//!                                  │  RuleTable::new            (compiled_rules.rs)
//!                                  └───────────────┬─────────────
//!                                                  │
//! raw text ── normalize (normalize.rs) ── Utterance│
//!                 │                                │
//!                 └── TraitScan::scan (trigger.rs) ┤  gate rules on input traits
//!                                                  v
//!                                  Dispatcher::dispatch (dispatcher.rs)
//!                                    - try rules in table order
//!                                    - first production that answers wins
//!                                    - nothing answers -> fallback reply
//!                                                  │
//!                                                  v
//!                                    Dispatch { reply, rule, metrics }
//! ```
//!
//! The dispatcher is *first-match-wins*. Rules are never scored; table order
//! is the precedence, and a rule placed late (embedded arithmetic, code
//! detection) only sees utterances every earlier rule passed on.
//!
//! ## Responsibilities by module
//!
//! - `normalize.rs`: case folding, contraction rewrite and whitespace collapse.
//! - `compiled_rules.rs`: wraps the ordered rule list with per-rule metadata.
//! - `trigger.rs`: scans the utterance for coarse input traits used to skip
//!   rules that cannot possibly match.
//! - `dispatcher.rs`: pattern matching and the first-match pass.
//! - `metrics.rs`: per-rule attempt records and timings.
//!
//! ## Debugging
//!
//! Rule activity is reported through `tracing` at `debug` level under the
//! `parley::engine` target.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/dispatcher.rs"]
mod dispatcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/trigger.rs"]
mod trigger;

pub(crate) use compiled_rules::{InputTraits, RuleTable};
pub(crate) use dispatcher::{Dispatch, Dispatcher};
pub use metrics::AttemptOutcome;
pub(crate) use metrics::{DispatchMetrics, RuleRecord};
pub use normalize::normalize;

use crate::Context;
use crate::random::RandomSource;
use crate::sandbox::ProgramRunner;

/// Capabilities a rule production may use.
///
/// Productions are otherwise pure functions of the utterance; everything
/// nondeterministic or effectful is reached through here so callers (and
/// tests) decide what backs it.
pub(crate) struct Scope<'a> {
    pub context: &'a Context,
    pub random: &'a dyn RandomSource,
    pub runner: &'a ProgramRunner,
}
