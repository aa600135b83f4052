use thiserror::Error;

use crate::automaton::State;
use crate::types::Clock;

/// Errors reported when building automata or reading timed words.
///
/// The matching algorithms themselves never fail: a branch that cannot be
/// taken is simply absent from the result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("clock {clock} is out of range (the automaton has {num_clocks} clocks)")]
    ClockOutOfRange { clock: Clock, num_clocks: usize },

    #[error("state {state} is out of range (the automaton has {num_states} states)")]
    StateOutOfRange { state: State, num_states: usize },

    #[error("initial and accepting states must be sorted and free of duplicates")]
    UnsortedStates,

    #[error("edge {source_state} -> {target} is stored in the edge list of state {list}")]
    EdgeSourceMismatch {
        source_state: State,
        target: State,
        list: State,
    },

    #[error("timestamp {current} at index {index} is smaller than the previous timestamp {previous}")]
    NonMonotonicTimestamp { index: usize, previous: f64, current: f64 },

    #[error("malformed timed word at entry {line}: {content:?}")]
    MalformedWord { line: usize, content: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("index {index} was already released (front is {front})")]
    IndexBeforeFront { index: usize, front: usize },

    #[error("index {index} is out of range (the word has {len} events)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
