//! Formal-language recognizers.
//!
//! Four independent, stateless membership checks. Each returns a
//! [`Recognition`]: exactly one [`Verdict`] plus the message shown to the
//! user. Failures (an invalid regex) are reported as [`Verdict::Error`], never
//! as a panic.

mod cfg;
mod dfa;
mod pattern;
mod pda;

pub use cfg::check_toy_cfg;
pub use dfa::check_dfa_ends01;
pub use pattern::match_regex;
pub use pda::check_balanced_parentheses;

/// Tagged outcome of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    Error,
}

/// A verdict and its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub verdict: Verdict,
    pub message: String,
}

impl Recognition {
    pub(crate) fn accepted(message: impl Into<String>) -> Self {
        Recognition { verdict: Verdict::Accepted, message: message.into() }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Recognition { verdict: Verdict::Rejected, message: message.into() }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        Recognition { verdict: Verdict::Error, message: message.into() }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }
}

impl std::fmt::Display for Recognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
