//! Hard-coded DFA over {0,1} accepting strings that end in `01`.
//!
//! ```text
//!            0            1
//!   Start ──────▶ Zero ──────▶ ZeroOne (accepting)
//!     │ 1 ▲         │ 0 ▲         │ 0 ──▶ Zero
//!     └───┘         └───┘         │ 1 ──▶ Start
//! ```
//!
//! Any symbol outside the alphabet sends the machine to a dead state.

use super::Recognition;

const ACCEPTED: &str = "Accepted by DFA (ends with '01')";
const REJECTED: &str = "Rejected by DFA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Zero,
    ZeroOne,
    Dead,
}

impl State {
    fn step(self, symbol: char) -> State {
        match (self, symbol) {
            (State::Dead, _) => State::Dead,
            (_, '0') => State::Zero,
            (State::Zero, '1') => State::ZeroOne,
            (State::Start | State::ZeroOne, '1') => State::Start,
            _ => State::Dead,
        }
    }
}

/// Accept iff `input` consists only of `0`/`1` and ends with `01`.
pub fn check_dfa_ends01(input: &str) -> Recognition {
    let mut state = State::Start;
    for symbol in input.chars() {
        state = state.step(symbol);
        if state == State::Dead {
            break;
        }
    }

    if state == State::ZeroOne { Recognition::accepted(ACCEPTED) } else { Recognition::rejected(REJECTED) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verdict;
    use proptest::prelude::*;

    #[test]
    fn accepts_strings_ending_in_01() {
        assert_eq!(check_dfa_ends01("0101").verdict, Verdict::Accepted);
        assert_eq!(check_dfa_ends01("01").verdict, Verdict::Accepted);
        assert_eq!(check_dfa_ends01("11001").verdict, Verdict::Accepted);
        assert_eq!(check_dfa_ends01("01").message, "Accepted by DFA (ends with '01')");
    }

    #[test]
    fn rejects_short_and_wrong_endings() {
        assert_eq!(check_dfa_ends01("010").verdict, Verdict::Rejected);
        assert_eq!(check_dfa_ends01("").verdict, Verdict::Rejected);
        assert_eq!(check_dfa_ends01("1").verdict, Verdict::Rejected);
        assert_eq!(check_dfa_ends01("011").message, "Rejected by DFA");
    }

    #[test]
    fn rejects_symbols_outside_alphabet() {
        assert_eq!(check_dfa_ends01("0201").verdict, Verdict::Rejected);
        assert_eq!(check_dfa_ends01("0 01").verdict, Verdict::Rejected);
    }

    proptest! {
        #[test]
        fn agrees_with_regex_oracle(input in "[01a]{0,16}") {
            let oracle = regex::Regex::new(r"\A[01]*01\z").unwrap();
            prop_assert_eq!(check_dfa_ends01(&input).is_accepted(), oracle.is_match(&input));
        }
    }
}
