use crate::engine::{AttemptOutcome, Dispatcher, RuleTable, Scope};
use crate::rules::{self, FALLBACK, commands, conversation};
use crate::{Context, Intent, ProgramRunner, RandomSource, RunnerConfig, Utterance};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Always picks the first item.
struct FirstPick;

impl RandomSource for FirstPick {
    fn index(&self, _len: usize) -> usize {
        0
    }
}

struct Harness {
    table: RuleTable,
    context: Context,
    runner: ProgramRunner,
}

impl Harness {
    fn new() -> Self {
        let reference = NaiveDate::from_ymd_opt(2013, 2, 12).unwrap().and_hms_opt(4, 30, 0).unwrap();
        let runner = ProgramRunner::new(RunnerConfig {
            interpreter: PathBuf::from("/bin/sh"),
            interpreter_args: Vec::new(),
            file_name: "main.sh".to_string(),
            timeout: Duration::from_secs(5),
            isolate_network: false,
            isolate_filesystem: false,
            ..RunnerConfig::default()
        });
        Harness { table: rules::table(), context: Context::at(reference), runner }
    }

    fn dispatch(&self, text: &str) -> crate::engine::Dispatch {
        let scope = Scope { context: &self.context, random: &FirstPick, runner: &self.runner };
        let utterance = Utterance::new(text, self.context.reference_time);
        Dispatcher::new(&self.table).dispatch(&utterance, &scope)
    }

    fn reply(&self, text: &str) -> String {
        self.dispatch(text).reply
    }
}

const GREETING: &str = "Hey! I'm your bot. Ask me to solve math, run code, or tell you a joke.";

#[test]
fn rule_names_are_unique() {
    let names = rules::table().names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), names.len(), "duplicate rule names in {names:?}");
}

#[test]
fn greetings_shadow_everything_after_them() {
    let h = Harness::new();
    let cases = [
        ("hi, what is 2+2", GREETING),
        ("Good Morning!", "Good morning! Hope you have a great day!"),
        ("good afternoon", "Good afternoon! How’s your day going?"),
        ("good evening all", "Good evening! How was your day?"),
        ("GOOD   night", "Good night! Sleep well!"),
        ("hello there", GREETING),
        // "you" contains "yo"
        ("how are you", GREETING),
        ("thank you", GREETING),
        ("print('hi')", GREETING),
    ];
    for (input, expected) in cases {
        assert_eq!(h.reply(input), expected, "input {input:?}");
    }
}

#[test]
fn time_of_day_greeting_beats_generic_greeting() {
    let h = Harness::new();
    let d = h.dispatch("good morning, hey");
    assert_eq!(d.rule, Some("good morning"));
    assert_eq!(d.intent, Intent::Greeting);
}

#[test]
fn time_query_uses_the_reference_time() {
    let h = Harness::new();
    assert_eq!(h.reply("what time is it"), "It's 04:30:00");
    assert_eq!(h.dispatch("TIME please").intent, Intent::TimeQuery);
}

#[test]
fn canned_lookups() {
    let h = Harness::new();
    let cases = [
        ("What's up", "Just chatting with cool people like you!"),
        ("how's it going", "Going great! Ready to solve math or run code?"),
        ("thanks a lot", "You're welcome! 😎"),
        ("thx", "You're welcome! 😎"),
        ("bye", "Bye! Catch you later! 👋"),
        ("ok, see u later", "Bye! Catch you later! 👋"),
        ("explain loop", "A loop repeats a set of instructions until a condition is met."),
        ("what is a variable", "A variable stores data that can be used and modified in your program."),
        ("fun fact", conversation::FACTS[0]),
        ("tell me a joke", conversation::JOKES[0]),
    ];
    for (input, expected) in cases {
        assert_eq!(h.reply(input), expected, "input {input:?}");
    }
}

#[test]
fn commands_route_to_recognizers() {
    let h = Harness::new();
    let cases = [
        ("dfa:0101", "Accepted by DFA (ends with '01')"),
        ("dfa: 010", "Rejected by DFA"),
        ("pda:(()())", "Accepted by PDA (balanced parentheses)"),
        ("pda:(()", "Rejected by PDA (unbalanced parentheses)"),
        ("cfg: I love apples", "Valid sentence according to toy CFG"),
        ("cfg:i love pizza", "Invalid sentence according to toy CFG"),
        ("regex:a+b; string:aab", "Regex matched!"),
        ("regex: a+b ; string: abc", "Regex did NOT match."),
        ("regex:abc", commands::REGEX_FORMAT_HINT),
    ];
    for (input, expected) in cases {
        assert_eq!(h.reply(input), expected, "input {input:?}");
    }
}

#[test]
fn invalid_regex_command_reports_error() {
    let h = Harness::new();
    let reply = h.reply("regex:(; string:x");
    assert!(reply.starts_with("Regex error: "), "{reply}");
}

#[test]
fn regex_command_sees_normalized_text() {
    let h = Harness::new();
    assert_eq!(h.reply("REGEX:[a-z]+; STRING:ABC"), "Regex matched!");
}

#[test]
fn arithmetic_forms() {
    let h = Harness::new();
    let cases = [
        ("2+2", "Result: 4"),
        ("  (1 + 2) * 3 ", "Result: 9"),
        ("7/2", "Result: 3.5"),
        ("what is 7/2", "Result: 3.5"),
        ("solve (1+2)*3", "Result: 9"),
        ("2 + 2 = ?", "Result: 4"),
        ("1/0", "Result: error: division by zero"),
        ("2 cats", "Result: 2"),
    ];
    for (input, expected) in cases {
        assert_eq!(h.reply(input), expected, "input {input:?}");
    }
}

#[test]
fn pure_arithmetic_fires_before_embedded() {
    let h = Harness::new();
    assert_eq!(h.dispatch("2+2").rule, Some("pure arithmetic"));
    assert_eq!(h.dispatch("what is 2+2").rule, Some("embedded arithmetic"));
}

#[test]
fn stray_digits_after_a_space_fall_through() {
    let h = Harness::new();
    let d = h.dispatch("I have 2 cats and 3 dogs");
    assert_eq!(d.reply, FALLBACK);
    assert_eq!(d.rule, None);
    let embedded = d.metrics.attempts.iter().find(|a| a.name == "embedded arithmetic").unwrap();
    assert_eq!(embedded.outcome, AttemptOutcome::Declined);
}

#[test]
fn code_is_run_in_the_sandbox() {
    let h = Harness::new();
    let d = h.dispatch("import os");
    assert_eq!(d.intent, Intent::Code);
    assert!(d.reply.starts_with("Program output:\n"), "{}", d.reply);
}

#[test]
fn runner_failures_render_inline() {
    let mut h = Harness::new();
    h.runner = ProgramRunner::new(RunnerConfig {
        interpreter: PathBuf::from("/nonexistent/interpreter"),
        ..RunnerConfig::default()
    });
    let reply = h.reply("import os");
    assert!(reply.starts_with("Program output:\nerror executing: "), "{reply}");
}

#[test]
fn unknown_input_gets_the_fallback() {
    let h = Harness::new();
    for input in ["blorp", "", "   "] {
        let d = h.dispatch(input);
        assert_eq!(d.reply, FALLBACK, "input {input:?}");
        assert_eq!(d.intent, Intent::Fallback);
    }
}

#[test]
fn gating_skips_rules_without_running_them() {
    let h = Harness::new();
    let d = h.dispatch("blorp");
    for attempt in &d.metrics.attempts {
        let gated = matches!(
            attempt.name,
            "regex command" | "dfa command" | "pda command" | "cfg command" | "pure arithmetic" | "embedded arithmetic"
        );
        assert_eq!(attempt.outcome == AttemptOutcome::Gated, gated, "rule {}", attempt.name);
    }
    assert_eq!(d.metrics.attempts.len(), h.table.len());
}

#[test]
fn attempts_stop_at_the_rule_that_fired() {
    let h = Harness::new();
    let d = h.dispatch("dfa:01");
    let last = d.metrics.attempts.last().unwrap();
    assert_eq!(last.name, "dfa command");
    assert_eq!(last.outcome, AttemptOutcome::Fired);
    assert_eq!(d.metrics.attempts.iter().filter(|a| a.outcome == AttemptOutcome::Fired).count(), 1);
}
