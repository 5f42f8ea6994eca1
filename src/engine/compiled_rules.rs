//! Rule table compilation.
//!
//! The static side of the engine: the ordered rule list plus the metadata the
//! dispatcher consults before running a rule's pattern.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `RuleTable::rules` and `RuleTable::metas`.
//!   Those vectors stay aligned and keep the order the rules were given in;
//!   that order is the dispatch precedence.
//! - A rule's `InputTraits` requirement must be a *necessary* condition of its
//!   pattern. Gating may only skip rules that could not have answered, so it
//!   never changes which rule fires.
//!
//! ## Extension points
//!
//! - Adding a trait:
//!   1. Add an `InputTraits` bit.
//!   2. Teach `TraitScan::scan` (in `trigger.rs`) to detect it.
//!   3. Declare it on the rules whose patterns imply it.

use crate::Rule;

/// Rule identifier (index into the rules vector).
pub(crate) type RuleId = usize;

bitflags::bitflags! {
    /// Coarse features of an utterance, computed once per dispatch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputTraits: u8 {
        /// Normalized text starts with a command prefix (`regex:`, `dfa:`, ...).
        const COMMAND_PREFIX = 1 << 0;
        /// Normalized text contains a digit, operator, parenthesis or dot.
        const ARITHMETIC     = 1 << 1;
    }
}

/// Metadata attached to a rule.
#[derive(Clone, Copy, Debug)]
pub struct RuleMeta {
    pub traits: InputTraits,
}

/// Ordered rule set with per-rule metadata and the reply used when no rule
/// answers.
#[derive(Debug)]
pub struct RuleTable {
    pub rules: Vec<Rule>,
    pub metas: Vec<RuleMeta>,
    pub fallback: &'static str,
}

impl RuleTable {
    /// Take ownership of `rules`, keeping their order.
    pub fn new(rules: Vec<Rule>, fallback: &'static str) -> Self {
        let metas = rules.iter().map(|r| RuleMeta { traits: InputTraits::from_bits_truncate(r.traits) }).collect();
        RuleTable { rules, metas, fallback }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Iterate `(id, rule, meta)` in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule, &RuleMeta)> {
        self.rules.iter().zip(self.metas.iter()).enumerate().map(|(id, (rule, meta))| (id, rule, meta))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}
