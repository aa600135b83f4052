//! Forward simulation of a timed automaton over a window of a timed word.
//!
//! Every matcher is built from the same step: starting at position `i`,
//! follow the automaton along the word and keep, for every branch, the
//! current state, the time each clock was last reset and the set of start
//! times still compatible with the guards seen so far. Clocks that were never
//! reset inside the window measure time since the (unknown) match start, so
//! their guards tighten the start interval instead of being checked.

use crate::answer::{Answer, AnswerSink, Bound, Interval};
use crate::automaton::{State, TimedAutomaton};
use crate::word::TimedEvent;

/// One branch of the simulation.
#[derive(Debug, Clone, PartialEq)]
struct Branch {
    state: State,
    /// Time of the last reset of each clock, `None` before the first one.
    resets: Vec<Option<f64>>,
    begin: Interval,
}

/// Durations of the empty matches: an initial state may leave through an
/// end-of-match edge right away, constrained only by that edge's guard.
pub fn immediate_durations(ta: &TimedAutomaton) -> Vec<Interval> {
    let mut durations = Vec::new();
    for &s in ta.initial() {
        for e in ta.accepting_end_edges(s) {
            let mut duration = Interval::ANY;
            for c in &e.guard {
                duration.constrain(c.op, c.bound as f64);
            }
            if !duration.is_empty() {
                durations.push(duration);
            }
        }
    }
    durations
}

/// The start times belonging to window `i`: after the previous event (or
/// time 0) and strictly before the event at `i`.
fn window_begin(previous: Option<f64>, time: f64) -> Interval {
    Interval::new(previous.map_or(Bound::closed(0.0), Bound::closed), Bound::open(time))
}

/// Empty matches that start and end inside window `i`.
pub fn emit_window_immediate(durations: &[Interval], previous: Option<f64>, time: f64, sink: &mut impl AnswerSink) {
    for &duration in durations {
        sink.push(Answer {
            begin: window_begin(previous, time),
            end: Interval::new(previous.map_or(Bound::open(0.0), Bound::open), Bound::closed(time)),
            duration,
        });
    }
}

/// Empty matches after the last event of the word.
pub fn emit_tail_immediate(durations: &[Interval], last_time: f64, sink: &mut impl AnswerSink) {
    for &duration in durations {
        sink.push(Answer {
            begin: Interval::new(Bound::closed(last_time), Bound::INFINITY),
            end: Interval::new(Bound::open(last_time), Bound::INFINITY),
            duration,
        });
    }
}

/// The simulation of one window.
#[derive(Debug, Clone)]
pub struct Window<'a> {
    ta: &'a TimedAutomaton,
    frontier: Vec<Branch>,
    last: Vec<Branch>,
}

impl<'a> Window<'a> {
    /// Opens the window whose first event happens at `time`; `previous` is
    /// the timestamp of the event before it, if any.
    pub fn open(ta: &'a TimedAutomaton, previous: Option<f64>, time: f64) -> Self {
        let begin = window_begin(previous, time);
        let frontier = ta
            .initial()
            .iter()
            .map(|&state| Branch {
                state,
                resets: vec![None; ta.num_clocks()],
                begin,
            })
            .collect();
        Self {
            ta,
            frontier,
            last: Vec::new(),
        }
    }

    /// Whether every branch has died.
    pub fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Feeds the next event. `next_time` is the timestamp of the event after
    /// it, or `None` at the end of the word; a match ending here ends before
    /// that event.
    pub fn step(&mut self, event: TimedEvent, next_time: Option<f64>, sink: &mut impl AnswerSink) {
        let ta = self.ta;
        let t = event.time;
        self.last = std::mem::take(&mut self.frontier);

        for branch in &self.last {
            'edges: for e in ta.edges(branch.state).iter().filter(|e| e.symbol == event.symbol) {
                let mut begin = branch.begin;
                for c in &e.guard {
                    match branch.resets[c.clock.index()] {
                        Some(r) => {
                            if !c.op.holds(t - r, c.bound as f64) {
                                continue 'edges;
                            }
                        }
                        None => begin.constrain(c.op.flip(), t - c.bound as f64),
                    }
                }
                if begin.is_empty() {
                    continue;
                }

                let mut resets = branch.resets.clone();
                for x in &e.resets {
                    resets[x.index()] = Some(t);
                }

                for f in ta.accepting_end_edges(e.target) {
                    let mut end = Interval::new(Bound::open(t), next_time.map_or(Bound::INFINITY, Bound::closed));
                    let mut duration = Interval::ANY;
                    for c in &f.guard {
                        match resets[c.clock.index()] {
                            Some(r) => end.constrain(c.op, c.bound as f64 + r),
                            None => duration.constrain(c.op, c.bound as f64),
                        }
                    }
                    let answer = Answer { begin, end, duration };
                    if !answer.is_empty() {
                        log::trace!("match via {} at {}", f, t);
                        sink.push(answer);
                    }
                }

                self.frontier.push(Branch {
                    state: e.target,
                    resets,
                    begin,
                });
            }
        }
    }

    /// States of the branches alive when the scan of this window stopped.
    ///
    /// If the word ran out, these are the states after its last event;
    /// otherwise the window died, and these are the states before the
    /// event that killed it.
    pub fn last_states(&self, reached_end: bool) -> impl Iterator<Item = State> + '_ {
        let branches = if reached_end { &self.frontier } else { &self.last };
        branches.iter().map(|b| b.state)
    }
}

/// Runs window `i` over an in-memory word until it dies or the word ends.
///
/// Returns the largest `skip[s]` over the states the scan stopped in (at
/// least 1), the shift a backward scan may take from here.
pub fn run_window(
    ta: &TimedAutomaton,
    word: &[TimedEvent],
    i: usize,
    skip: impl Fn(State) -> usize,
    sink: &mut impl AnswerSink,
) -> usize {
    let previous = i.checked_sub(1).map(|p| word[p].time);
    let mut window = Window::open(ta, previous, word[i].time);
    let mut j = i;
    while !window.is_exhausted() && j < word.len() {
        let next_time = word.get(j + 1).map(|e| e.time);
        window.step(word[j], next_time, sink);
        j += 1;
    }
    window.last_states(j >= word.len()).map(skip).fold(1, usize::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::TaEdge;
    use crate::types::Constraint;

    fn events(pairs: &[(char, f64)]) -> Vec<TimedEvent> {
        pairs.iter().map(|&p| p.into()).collect()
    }

    /// `a` then `b` within 1 time unit, then the end.
    fn a_then_b() -> TimedAutomaton {
        TimedAutomaton::from_edges(
            4,
            [
                TaEdge::new(0, 1, 'a').reset([0]),
                TaEdge::new(1, 2, 'b').guard([Constraint::lt(0, 1)]),
                TaEdge::new(2, 3, '$'),
            ],
            vec![0],
            vec![3],
            vec![1],
        )
        .unwrap()
    }

    #[test]
    fn test_immediate_durations() {
        let ta = TimedAutomaton::from_edges(
            2,
            [
                TaEdge::new(0, 1, '$').guard([Constraint::ge(0, 1), Constraint::lt(0, 3)]),
                TaEdge::new(0, 1, '$').guard([Constraint::gt(0, 2), Constraint::lt(0, 1)]),
            ],
            vec![0],
            vec![1],
            vec![3],
        )
        .unwrap();
        let durations = immediate_durations(&ta);
        assert_eq!(durations, vec![Interval::new(Bound::closed(1.0), Bound::open(3.0))]);
        assert!(immediate_durations(&a_then_b()).is_empty());
    }

    #[test]
    fn test_window_resolved_guard() {
        let ta = a_then_b();
        let word = events(&[('a', 1.0), ('b', 1.5), ('a', 2.0), ('b', 3.5)]);

        let mut answers = Vec::new();
        run_window(&ta, &word, 0, |_| 1, &mut answers);
        assert_eq!(answers.len(), 1);
        let ans = answers[0];
        assert_eq!(ans.begin, Interval::new(Bound::closed(0.0), Bound::open(1.0)));
        assert_eq!(ans.end, Interval::new(Bound::open(1.5), Bound::closed(2.0)));
        assert_eq!(ans.duration, Interval::ANY);

        // `b` comes 1.5 after the second `a`.
        let mut answers = Vec::new();
        run_window(&ta, &word, 2, |_| 1, &mut answers);
        assert!(answers.is_empty());
    }

    #[test]
    fn test_window_unresolved_guard_tightens_begin() {
        // `a` less than 2 after the start, then the end at most 3 after the start.
        let ta = TimedAutomaton::from_edges(
            3,
            [
                TaEdge::new(0, 1, 'a').guard([Constraint::lt(0, 2)]),
                TaEdge::new(1, 2, '$').guard([Constraint::le(0, 3)]),
            ],
            vec![0],
            vec![2],
            vec![3],
        )
        .unwrap();
        let word = events(&[('b', 1.0), ('a', 4.0)]);
        let mut answers = Vec::new();
        run_window(&ta, &word, 1, |_| 1, &mut answers);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].begin, Interval::new(Bound::open(2.0), Bound::open(4.0)));
        assert_eq!(answers[0].end, Interval::new(Bound::open(4.0), Bound::INFINITY));
        assert_eq!(answers[0].duration, Interval::new(Bound::closed(0.0), Bound::closed(3.0)));
    }

    #[test]
    fn test_last_states() {
        let ta = a_then_b();
        let skip = |s: State| s + 5;
        let mut answers = Vec::new();

        // Dies on the `b` before the end of the word: the initial state.
        let word = events(&[('b', 1.0), ('a', 2.0)]);
        assert_eq!(run_window(&ta, &word, 0, skip, &mut answers), 5);

        // Reaches the end of the word in state 1.
        let word = events(&[('a', 1.0), ('a', 1.5)]);
        assert_eq!(run_window(&ta, &word, 1, skip, &mut answers), 6);

        // Dies on the last event: nothing is left.
        assert_eq!(run_window(&ta, &word, 0, skip, &mut answers), 1);
        assert!(answers.is_empty());
    }
}
