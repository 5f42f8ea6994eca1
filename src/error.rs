use std::io;
use thiserror::Error;

/// Errors produced by the arithmetic evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("division by zero")]
    DivisionByZero,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{literal}' at position {pos}")]
    InvalidNumber { literal: String, pos: usize },

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("result is not a finite number")]
    NonFinite,
}

/// Infrastructure failures of the program runner.
///
/// A program that crashes or times out is *not* an error; see
/// [`Termination`](crate::Termination).
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),

    #[error("failed to write program source: {0}")]
    WriteSource(#[source] io::Error),

    #[error("failed to prepare sandbox confinement: {0}")]
    Confine(#[source] io::Error),

    #[error("failed to spawn '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for program: {0}")]
    Wait(#[source] io::Error),
}
