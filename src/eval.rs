//! Restricted arithmetic evaluator.
//!
//! Expressions are evaluated by a tokenizer and a recursive-descent parser
//! over a closed grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | '(' expr ')'
//! NUMBER  := [0-9.]+            (must parse as a decimal literal)
//! ```
//!
//! There are no identifiers in the grammar, so there is nothing to look up:
//! no variables, functions or attributes. Whatever the input, evaluation is
//! plain `f64` arithmetic and terminates in time linear in the input.

#[path = "eval/lexer.rs"]
mod lexer;
#[path = "eval/parser.rs"]
mod parser;

use crate::EvalError;

/// Maximum nesting of parentheses and unary signs.
pub(crate) const MAX_DEPTH: usize = 256;

/// Evaluate `expr` and format the result.
///
/// # Example
/// ```
/// assert_eq!(parley::evaluate("2+2").unwrap(), "4");
/// assert_eq!(parley::evaluate("(1 + 2) / 4").unwrap(), "0.75");
/// assert!(parley::evaluate("1/0").is_err());
/// ```
pub fn evaluate(expr: &str) -> Result<String, EvalError> {
    let tokens = lexer::tokenize(expr)?;
    let value = parser::Parser::new(&tokens).parse()?;
    format_number(value)
}

/// Render a value: integral values without a fractional part, everything
/// else in shortest round-trip form.
pub fn format_number(value: f64) -> Result<String, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    if value == 0.0 {
        // also folds -0
        return Ok("0".to_string());
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Ok(format!("{}", value as i64))
    } else {
        Ok(format!("{}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_basic_operators() {
        assert_eq!(evaluate("2+2").unwrap(), "4");
        assert_eq!(evaluate("7 - 10").unwrap(), "-3");
        assert_eq!(evaluate("6*7").unwrap(), "42");
        assert_eq!(evaluate("7/2").unwrap(), "3.5");
    }

    #[test]
    fn respects_precedence_and_parentheses() {
        assert_eq!(evaluate("2+3*4").unwrap(), "14");
        assert_eq!(evaluate("(2+3)*4").unwrap(), "20");
        assert_eq!(evaluate("8/4/2").unwrap(), "1");
        assert_eq!(evaluate("10-4-3").unwrap(), "3");
    }

    #[test]
    fn supports_decimals_and_unary_signs() {
        assert_eq!(evaluate("1.5 * 2").unwrap(), "3");
        assert_eq!(evaluate(".5 + .25").unwrap(), "0.75");
        assert_eq!(evaluate("-(-3)").unwrap(), "3");
        assert_eq!(evaluate("2--2").unwrap(), "4");
        assert_eq!(evaluate("0.1+0.2").unwrap(), "0.30000000000000004");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(evaluate("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("0/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1/(2-2)").unwrap_err().to_string(), "division by zero");
    }

    #[test]
    fn malformed_expressions_are_errors() {
        assert_eq!(evaluate(""), Err(EvalError::Empty));
        assert_eq!(evaluate("   "), Err(EvalError::Empty));
        assert_eq!(evaluate("2+"), Err(EvalError::UnexpectedEnd));
        assert!(matches!(evaluate("2 3"), Err(EvalError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("(2"), Err(EvalError::UnexpectedEnd)));
        assert!(matches!(evaluate("2)"), Err(EvalError::UnexpectedToken { .. })));
        assert!(matches!(evaluate("1.2.3"), Err(EvalError::InvalidNumber { .. })));
        assert!(matches!(evaluate("."), Err(EvalError::InvalidNumber { .. })));
    }

    #[test]
    fn identifiers_are_not_part_of_the_language() {
        assert!(matches!(evaluate("__import__('os')"), Err(EvalError::UnexpectedChar { ch: '_', pos: 0 })));
        assert!(matches!(evaluate("2**3"), Err(EvalError::UnexpectedToken { .. })));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let expr = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(evaluate(&expr), Err(EvalError::TooDeep(MAX_DEPTH)));
        assert_eq!(evaluate(&"-".repeat(10_000)), Err(EvalError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn overflow_is_an_error() {
        let big = format!("1{}", "0".repeat(300));
        assert_eq!(evaluate(&format!("{big}*{big}")), Err(EvalError::NonFinite));
    }

    #[test]
    fn formats_large_integral_values_without_saturating() {
        assert_eq!(format_number(1e20).unwrap(), "100000000000000000000");
        assert_eq!(format_number(-0.0).unwrap(), "0");
    }
}
