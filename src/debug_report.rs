use parley::{AttemptOutcome, DispatchDetails};
use std::fmt::Display;

/// What a piece of report text is; each role maps to one SGR sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Title,
    Section,
    Name,
    Fired,
    Declined,
    Quiet,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Title => "1;36",
            Style::Section => "90",
            Style::Name => "34",
            Style::Fired => "1;32",
            Style::Declined => "33",
            Style::Quiet => "2",
        }
    }

    fn for_outcome(outcome: AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::Fired => Style::Fired,
            AttemptOutcome::Declined => Style::Declined,
            AttemptOutcome::NoMatch | AttemptOutcome::Gated => Style::Quiet,
        }
    }
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, style: Style, text: impl Display) -> String {
        if self.color { format!("\x1b[{}m{text}\x1b[0m", style.sgr()) } else { text.to_string() }
    }

    fn section(&self, title: &str) {
        println!("\n{}", self.paint(Style::Section, format_args!("── {title} ──")));
    }
}

fn outcome_label(outcome: AttemptOutcome) -> &'static str {
    match outcome {
        AttemptOutcome::Fired => "fired",
        AttemptOutcome::Declined => "matched, declined",
        AttemptOutcome::NoMatch => "no match",
        AttemptOutcome::Gated => "gated",
    }
}

pub fn print_dispatch(input: &str, details: &DispatchDetails, color: bool) {
    let p = Painter { color };
    println!("\n{}", p.paint(Style::Title, format_args!("dispatch {input:?}")));

    p.section("normalized");
    println!("  {}", p.paint(Style::Name, format_args!("{:?}", details.normalized)));

    p.section("rules");
    print_attempts(details, &p);

    p.section("result");
    match &details.rule {
        Some(rule) => println!("  {} ({:?})", p.paint(Style::Fired, rule), details.intent),
        None => {
            println!("  {}", p.paint(Style::Declined, "fallback: no rule answered"));
            println!("  {}", p.paint(Style::Quiet, "set PARLEY_LOG=parley=debug to log every attempt"));
        }
    }

    p.section("timing");
    println!(
        "  total {}  normalize {}  dispatch {}",
        p.paint(Style::Fired, format_args!("{:?}", details.total)),
        p.paint(Style::Quiet, format_args!("{:?}", details.normalize)),
        p.paint(Style::Quiet, format_args!("{:?}", details.dispatch)),
    );
    println!();
}

fn print_attempts(details: &DispatchDetails, p: &Painter) {
    let (gated, tried): (Vec<_>, Vec<_>) =
        details.attempts.iter().partition(|attempt| attempt.outcome == AttemptOutcome::Gated);

    for (position, attempt) in tried.iter().enumerate() {
        println!(
            "  {:>2}. {} {}  {}",
            position + 1,
            p.paint(Style::Name, format_args!("{:<22}", attempt.name)),
            p.paint(Style::for_outcome(attempt.outcome), outcome_label(attempt.outcome)),
            p.paint(Style::Quiet, format_args!("{:?}", attempt.duration)),
        );
    }

    if !gated.is_empty() {
        let names: Vec<&str> = gated.iter().map(|attempt| attempt.name.as_str()).collect();
        println!("  {}", p.paint(Style::Quiet, format_args!("skipped by input traits: {}", names.join(", "))));
    }
}
