//! Balanced-parenthesis check in the style of a one-symbol pushdown automaton.
//!
//! The stack only ever holds `(`, so it is represented by its depth.

use super::Recognition;

const ACCEPTED: &str = "Accepted by PDA (balanced parentheses)";
const REJECTED: &str = "Rejected by PDA (unbalanced parentheses)";

/// Single left-to-right scan: push on `(`, pop on `)`. Popping an empty stack
/// rejects immediately; a non-empty stack at the end rejects. Every other
/// character is ignored.
pub fn check_balanced_parentheses(input: &str) -> Recognition {
    let mut depth: usize = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return Recognition::rejected(REJECTED),
            },
            _ => {}
        }
    }

    if depth == 0 { Recognition::accepted(ACCEPTED) } else { Recognition::rejected(REJECTED) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verdict;
    use proptest::prelude::*;

    #[test]
    fn balanced_inputs_are_accepted() {
        assert_eq!(check_balanced_parentheses("(()())").verdict, Verdict::Accepted);
        assert_eq!(check_balanced_parentheses("").verdict, Verdict::Accepted);
        assert_eq!(check_balanced_parentheses("f(a, (b)) + c").verdict, Verdict::Accepted);
    }

    #[test]
    fn unbalanced_inputs_are_rejected() {
        assert_eq!(check_balanced_parentheses("(()").verdict, Verdict::Rejected);
        assert_eq!(check_balanced_parentheses(")(").verdict, Verdict::Rejected);
        assert_eq!(check_balanced_parentheses("())(()").message, "Rejected by PDA (unbalanced parentheses)");
    }

    proptest! {
        #[test]
        fn agrees_with_explicit_stack(input in "[()x]{0,24}") {
            let mut stack = Vec::new();
            let mut ok = true;
            for c in input.chars() {
                if c == '(' {
                    stack.push(c);
                } else if c == ')' && stack.pop().is_none() {
                    ok = false;
                    break;
                }
            }
            let expected = ok && stack.is_empty();
            prop_assert_eq!(check_balanced_parentheses(&input).is_accepted(), expected);
        }
    }
}
