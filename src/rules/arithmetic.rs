//! Arithmetic rules. Both hand the expression to the restricted evaluator.

use crate::engine::InputTraits;
use crate::{EvalError, Intent, Rule, evaluate};

fn render(result: Result<String, EvalError>) -> String {
    match result {
        Ok(value) => format!("Result: {value}"),
        Err(err) => format!("Result: error: {err}"),
    }
}

/// The whole trimmed raw input is arithmetic characters, e.g. `2 + 2`.
pub fn rule_pure_arithmetic() -> Rule {
    rule! {
        name: "pure arithmetic",
        intent: Intent::Arithmetic,
        pattern: raw_re!(r"^[0-9+\-*/(). ]+$"),
        traits: InputTraits::ARITHMETIC.bits(),
        prod: |utt, _m, _scope| { Some(render(evaluate(utt.raw()))) },
    }
}

/// An arithmetic run inside a sentence, e.g. `what is 7/2` or `solve (1+2)*3`.
///
/// Only the leftmost match is considered. If its run is blank the rule
/// declines, so "i have 2 cats" (leftmost run: the first space) falls
/// through while "2 cats" evaluates `2`.
pub fn rule_embedded_arithmetic() -> Rule {
    rule! {
        name: "embedded arithmetic",
        intent: Intent::Arithmetic,
        pattern: re!(r"(?:what is|solve)?\s*([0-9+\-*/(). ]+)"),
        traits: InputTraits::ARITHMETIC.bits(),
        prod: |_utt, m, _scope| {
            let expr = m.group(1)?.trim();
            if expr.is_empty() {
                return None;
            }
            Some(render(evaluate(expr)))
        },
    }
}
