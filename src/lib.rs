extern crate self as parley;

use chrono::NaiveDateTime;
use regex::Regex;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod eval;
mod random;
mod recognizers;
mod rules;
mod sandbox;
mod session;

pub use api::{
    Chatbot, Context, DispatchDetails, Options, Reply, Request, RuleAttempt, respond, respond_verbose_with,
    respond_with,
};
pub use engine::{AttemptOutcome, normalize};
pub use error::{EvalError, RunnerError};
pub use eval::{evaluate, format_number};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use recognizers::{Recognition, Verdict, check_balanced_parentheses, check_dfa_ends01, check_toy_cfg, match_regex};
pub use sandbox::{ExecutionResult, ProgramRunner, RunnerConfig, Termination};
pub use session::{Role, SessionBuffer, Turn};

// --- Utterances -------------------------------------------------------------

/// One incoming request: the raw text, its normalized form and the moment it
/// arrived. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    raw: String,
    normalized: String,
    timestamp: NaiveDateTime,
}

impl Utterance {
    pub fn new(raw: &str, timestamp: NaiveDateTime) -> Self {
        Utterance { raw: raw.to_string(), normalized: normalize(raw), timestamp }
    }

    /// Text exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text after [`normalize`].
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Coarse category of the rule that answered an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    TimeQuery,
    SmallTalk,
    Gratitude,
    Farewell,
    FunFact,
    Glossary,
    Command,
    Arithmetic,
    Code,
    Joke,
    Fallback,
}

// --- Rules ------------------------------------------------------------------

// Pattern items used by rules. Each variant names the view of the utterance it
// inspects: the normalized text unless the variant says `Raw`.
#[derive(Debug)]
pub(crate) enum Pattern {
    /// Any of the phrases occurs in the normalized text. The first phrase in
    /// table order that occurs is reported in [`Match::phrase`].
    Phrases(&'static [&'static str]),

    /// Like `Phrases`, but each phrase carries a fixed reply that is reported
    /// in [`Match::entry`].
    Table(&'static [(&'static str, &'static str)]),

    /// The normalized text starts with the prefix.
    Prefix(&'static str),

    /// Leftmost match of a regular expression against the normalized text.
    /// The `Regex` is stored as a static reference (created via the `regex!`
    /// helper macro in `src/macros.rs`).
    Regex(&'static Regex),

    /// Regular expression tested against the trimmed raw text.
    RawRegex(&'static Regex),

    /// Any of the tokens occurs in the raw text (case-sensitive).
    RawPhrases(&'static [&'static str]),
}

/// What a [`Pattern`] captured. Handed to the rule's production together
/// with the utterance.
#[derive(Debug, Clone, Default)]
pub(crate) struct Match {
    pub phrase: Option<&'static str>,
    pub entry: Option<&'static str>,
    /// Regex capture groups; index 0 is the whole match. Unmatched optional
    /// groups are empty strings.
    pub groups: Vec<String>,
}

impl Match {
    pub fn group(&self, idx: usize) -> Option<&str> {
        self.groups.get(idx).map(String::as_str)
    }
}

pub(crate) type Production =
    Box<dyn Fn(&Utterance, &Match, &engine::Scope<'_>) -> Option<String> + Send + Sync>;

/// A dispatch rule: a name, the intent it answers, a `pattern` and a
/// `production` that turns the match into a reply.
///
/// A production may return `None` to decline even though the pattern matched;
/// the dispatcher then moves on to the next rule.
pub(crate) struct Rule {
    pub name: &'static str,
    pub intent: Intent,
    pub pattern: Pattern,
    pub production: Production,
    /// `InputTraits` bits that must all be present for this rule to be tried.
    pub traits: u8,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("intent", &self.intent)
            .field("pattern", &self.pattern)
            .field("production", &"<function>")
            .field("traits", &self.traits)
            .finish()
    }
}
