use crate::engine::{Dispatcher, RuleRecord, RuleTable, Scope};
use crate::{
    AttemptOutcome, Intent, ProgramRunner, RandomSource, Role, RunnerConfig, SeededRandom, SessionBuffer, ThreadRandom,
    Turn, Utterance,
};
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

static DEFAULT_RULES: Lazy<RuleTable> = Lazy::new(crate::rules::table);

/// Per-request context.
#[derive(Debug, Clone)]
pub struct Context {
    /// Wall-clock time the request arrived; answers time queries and stamps
    /// session turns.
    pub reference_time: NaiveDateTime,
}

impl Context {
    pub fn at(reference_time: NaiveDateTime) -> Self {
        Context { reference_time }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self { reference_time: Local::now().naive_local() }
    }
}

/// Options that affect how replies are produced.
#[derive(Debug, Clone)]
pub struct Options {
    /// Settings for the program runner used by the code rule.
    pub runner: RunnerConfig,
    /// Turns kept by [`Chatbot`] history.
    pub session_capacity: usize,
    /// Seed for joke and fact selection. `None` draws from the thread RNG.
    ///
    /// The stateless functions build a fresh generator from this seed on
    /// every call, so `respond_with("joke", ..)` returns the same joke each
    /// time. A [`Chatbot`] seeds once and walks the sequence.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options { runner: RunnerConfig::default(), session_capacity: crate::session::DEFAULT_CAPACITY, seed: None }
    }
}

impl Options {
    fn random(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom),
        }
    }
}

/// Incoming request, `{"q": "<free text>"}`. A missing `q` is an empty query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub q: String,
}

/// Outgoing reply, `{"a": "<reply>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub a: String,
}

/// One rule the dispatcher looked at, in table order.
#[derive(Debug, Clone)]
pub struct RuleAttempt {
    pub name: String,
    pub intent: Intent,
    pub outcome: AttemptOutcome,
    pub duration: Duration,
}

impl From<&RuleRecord> for RuleAttempt {
    fn from(record: &RuleRecord) -> Self {
        RuleAttempt {
            name: record.name.to_string(),
            intent: record.intent,
            outcome: record.outcome,
            duration: record.duration,
        }
    }
}

/// Additional details returned by [`respond_verbose_with`] and
/// [`Chatbot::handle_verbose`].
///
/// Meant for debugging rule precedence: which rules were tried, which one
/// answered and where the time went.
#[derive(Debug, Clone)]
pub struct DispatchDetails {
    /// The utterance after normalization.
    pub normalized: String,
    pub intent: Intent,
    /// Rule that answered; `None` when the fallback reply was used.
    pub rule: Option<String>,
    /// Rules in table order up to and including the one that answered.
    pub attempts: Vec<RuleAttempt>,
    pub normalize: Duration,
    pub dispatch: Duration,
    pub total: Duration,
}

/// Reply to `text` using the default rules, the current time and default
/// [`Options`].
///
/// # Example
/// ```
/// use parley::respond;
///
/// assert_eq!(respond("dfa:0101").a, "Accepted by DFA (ends with '01')");
/// assert_eq!(respond("what is 7/2").a, "Result: 3.5");
/// ```
pub fn respond(text: &str) -> Reply {
    respond_with(text, &Context::default(), &Options::default())
}

/// Reply to `text` using the provided `context`/`options`.
///
/// Use this for deterministic replies: fix the reference time and the seed.
/// With a fixed seed every call makes the same random pick; use [`Chatbot`]
/// for a varying sequence.
pub fn respond_with(text: &str, context: &Context, options: &Options) -> Reply {
    respond_verbose_with(text, context, options).0
}

/// Like [`respond_with`], also returning [`DispatchDetails`].
pub fn respond_verbose_with(text: &str, context: &Context, options: &Options) -> (Reply, DispatchDetails) {
    let random = options.random();
    let runner = ProgramRunner::new(options.runner.clone());
    run(&DEFAULT_RULES, text, context, random.as_ref(), &runner)
}

fn run(
    table: &RuleTable,
    text: &str,
    context: &Context,
    random: &dyn RandomSource,
    runner: &ProgramRunner,
) -> (Reply, DispatchDetails) {
    let start = Instant::now();
    let utterance = Utterance::new(text, context.reference_time);
    let normalize = start.elapsed();

    let scope = Scope { context, random, runner };
    let dispatch = Dispatcher::new(table).dispatch(&utterance, &scope);

    let details = DispatchDetails {
        normalized: utterance.normalized().to_string(),
        intent: dispatch.intent,
        rule: dispatch.rule.map(str::to_string),
        attempts: dispatch.metrics.attempts.iter().map(RuleAttempt::from).collect(),
        normalize,
        dispatch: dispatch.metrics.total,
        total: start.elapsed(),
    };
    (Reply { a: dispatch.reply }, details)
}

/// A conversation: the rule table plus the state around it.
///
/// Every [`handle`](Chatbot::handle) records the user turn, dispatches and
/// records the bot turn. History is bounded by
/// [`Options::session_capacity`] and is never persisted.
///
/// # Example
/// ```
/// use parley::{Chatbot, Options, Role};
///
/// let bot = Chatbot::new(Options::default());
/// assert_eq!(bot.handle("pda:(()())").a, "Accepted by PDA (balanced parentheses)");
///
/// let history = bot.history();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[0].role, Role::User);
/// ```
pub struct Chatbot {
    table: RuleTable,
    session: SessionBuffer,
    random: Box<dyn RandomSource>,
    runner: ProgramRunner,
}

impl Chatbot {
    pub fn new(options: Options) -> Self {
        let random = options.random();
        Self::with_random(options, random)
    }

    /// Use `random` for joke and fact selection instead of `options.seed`.
    pub fn with_random(options: Options, random: Box<dyn RandomSource>) -> Self {
        Chatbot {
            table: crate::rules::table(),
            session: SessionBuffer::new(options.session_capacity),
            random,
            runner: ProgramRunner::new(options.runner),
        }
    }

    pub fn handle(&self, text: &str) -> Reply {
        self.handle_verbose(text, &Context::default()).0
    }

    pub fn handle_with(&self, text: &str, context: &Context) -> Reply {
        self.handle_verbose(text, context).0
    }

    pub fn handle_verbose(&self, text: &str, context: &Context) -> (Reply, DispatchDetails) {
        self.session.record(Role::User, text, context.reference_time);
        let (reply, details) = run(&self.table, text, context, self.random.as_ref(), &self.runner);
        self.session.record(Role::Bot, reply.a.clone(), context.reference_time);
        debug!(target: "parley::engine", rule = ?details.rule, turns = self.session.len(), "handled utterance");
        (reply, details)
    }

    /// Retained turns, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.session.snapshot()
    }

    pub fn clear_history(&self) {
        self.session.clear();
    }

    /// Names of the rules in dispatch order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.table.names()
    }
}

impl Default for Chatbot {
    fn default() -> Self {
        Chatbot::new(Options::default())
    }
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot")
            .field("rules", &self.table.len())
            .field("session", &self.session)
            .field("runner", self.runner.config())
            .finish_non_exhaustive()
    }
}
