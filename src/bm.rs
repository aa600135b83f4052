//! Boyer-Moore style timed pattern matching.
//!
//! The matcher tries windows from the end of the word towards its start,
//! like [`naive::match_into`][crate::naive::match_into], but after each window
//! it may skip several start positions at once. How far depends on the
//! pattern states the simulation of the window stopped in: `skip[s]` is the
//! smallest shift at which a new match could overlap a run that reached
//! `s`. The table is computed once per pattern from its zone automaton and
//! the zone automaton of its self-product.
//!
//! # Examples
//!
//! ```
//! use timed_pattern::bm::BoyerMoore;
//! use timed_pattern::fixtures;
//! use timed_pattern::word::TimedWord;
//!
//! let matcher = BoyerMoore::new(fixtures::ta4());
//! assert_eq!(matcher.m(), 7);
//! assert_eq!(matcher.skip_table()[1], 5);
//!
//! let word = TimedWord::new(vec![('a', 0.0).into(), ('a', 1.5).into(), ('a', 1.7).into()])?;
//! assert!(matcher.match_word(&word).is_empty());
//! # Ok::<(), timed_pattern::error::Error>(())
//! ```

use std::time::Instant;

use crate::abstraction::ZoneAutomaton;
use crate::answer::{Answer, AnswerSink, Interval};
use crate::automaton::{State, TimedAutomaton};
use crate::partial_run::PartialRunChecker;
use crate::runs::{calc_l, calc_ls, Run};
use crate::scan::{emit_tail_immediate, emit_window_immediate, immediate_durations, run_window};
use crate::word::TimedWord;
use crate::zone::Zone;

/// Options of [`BoyerMoore`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Shift by the skip table; otherwise every start position is tried.
    pub use_skip_table: bool,
    /// Grow a single product zone automaton for all skip queries instead of
    /// building a fresh one per query.
    pub share_product_automaton: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            use_skip_table: true,
            share_product_automaton: true,
        }
    }
}

/// A pattern prepared for matching.
#[derive(Debug, Clone)]
pub struct BoyerMoore {
    ta: TimedAutomaton,
    config: MatcherConfig,
    skip: Vec<usize>,
    m: usize,
    durations: Vec<Interval>,
}

impl BoyerMoore {
    pub fn new(ta: TimedAutomaton) -> Self {
        Self::with_config(ta, MatcherConfig::default())
    }

    pub fn with_config(ta: TimedAutomaton, config: MatcherConfig) -> Self {
        let start = Instant::now();
        let (skip, m) = skip_table(&ta, config.share_product_automaton);
        log::info!("precomputation: {:.3} ms", start.elapsed().as_secs_f64() * 1000.0);
        let durations = immediate_durations(&ta);
        Self {
            ta,
            config,
            skip,
            m,
            durations,
        }
    }

    pub fn ta(&self) -> &TimedAutomaton {
        &self.ta
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The shift allowed after a window stopped in each pattern state.
    pub fn skip_table(&self) -> &[usize] {
        &self.skip
    }

    /// The number of steps of the shortest accepting run of the zone automaton.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Returns every match of the pattern in `word`.
    pub fn match_word(&self, word: &TimedWord) -> Vec<Answer> {
        let mut answers = Vec::new();
        self.match_into(word, &mut answers);
        answers
    }

    /// Like [`match_word`][Self::match_word], but hands the answers to `sink`.
    pub fn match_into(&self, word: &TimedWord, sink: &mut impl AnswerSink) {
        let events = word.events();
        let Some(last) = events.last() else {
            return;
        };
        emit_tail_immediate(&self.durations, last.time, sink);

        let shift_of = |s: State| if self.config.use_skip_table { self.skip[s] } else { 1 };

        // A match reads at least m - 1 events, so the last windows cannot hold one.
        let mut next = events.len().checked_sub(self.m.saturating_sub(1).max(1));
        let mut windows = 0;
        while let Some(i) = next {
            let previous = i.checked_sub(1).map(|p| events[p].time);
            emit_window_immediate(&self.durations, previous, events[i].time, sink);
            let shift = run_window(&self.ta, events, i, shift_of, sink);
            windows += 1;
            next = i.checked_sub(shift);
        }
        log::debug!(
            "tried {} of {} windows, {} answers",
            windows,
            events.len(),
            sink.emitted()
        );
    }
}

/// Computes the skip table of `ta` and the length `m` of its shortest
/// matches (in steps of the zone automaton).
///
/// `skip[s]` is the smallest `n` in `1..m-1` such that some shortest run
/// `r`, shifted by `n`, can be read on the same word as some run reaching
/// `s`; if there is none, it is `max(1, m - 1)`.
pub fn skip_table(ta: &TimedAutomaton, share_product_automaton: bool) -> (Vec<usize>, usize) {
    let za = ZoneAutomaton::build(ta);
    let (l, m) = calc_l(&za);
    log::info!("zone automaton: {} states; m = {}, |L| = {}", za.num_states(), m, l.len());

    let mut checker = PartialRunChecker::new(ta);
    let skip: Vec<usize> = (0..ta.num_states())
        .map(|s| {
            let (ls, ms) = calc_ls(&za, s, m);
            if !share_product_automaton {
                checker.clear();
            }
            let n = smallest_overlap(&za, &l, m, &ls, ms, &mut checker, share_product_automaton);
            log::debug!("skip[{}] = {} (ms = {}, |Ls| = {})", s, n, ms, ls.len());
            n
        })
        .collect();

    log::info!("skip table: {:?}", skip);
    (skip, m)
}

fn smallest_overlap(
    za: &ZoneAutomaton,
    l: &[Run],
    m: usize,
    ls: &[Run],
    ms: usize,
    checker: &mut PartialRunChecker<Zone>,
    share: bool,
) -> usize {
    let mut n = 1;
    while n + 1 < m {
        for r in l {
            for rs in ls {
                if !share {
                    checker.clear();
                }
                let (q1, q2) = (r[n], rs[0]);
                checker.seed(za.ta_state(q1), za.ta_state(q2), Zone::embed(za.value(q1), za.value(q2)));
                let r_end = (ms + n).min(m);
                let rs_end = (m - n).min(ms);
                if checker.check(za, &r[n..r_end], &rs[..rs_end]) {
                    return n;
                }
            }
        }
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{sort_answers, AnswerCounter};
    use crate::fixtures;
    use crate::naive;
    use test_log::test;

    #[test]
    fn test_skip_table_without_clocks() {
        let (skip, m) = skip_table(&fixtures::ta0(), true);
        assert_eq!(m, 3);
        assert_eq!(skip, vec![1, 2, 2, 2]);
    }

    #[test]
    fn test_skip_table_chain() {
        let (skip, m) = skip_table(&fixtures::ta4(), true);
        assert_eq!(m, 7);
        assert_eq!(skip, vec![1, 5, 5, 5, 5, 5, 5, 5]);

        let (skip, m) = skip_table(&fixtures::chain(3), true);
        assert_eq!(m, 6);
        assert_eq!(skip[0], 1);
        assert!(skip[1..].iter().all(|&n| n == 4));
    }

    #[test]
    fn test_shared_product_gives_same_table() {
        for ta in [fixtures::ta2(), fixtures::ta4(), fixtures::ta6(), fixtures::phi4()] {
            assert_eq!(skip_table(&ta, true), skip_table(&ta, false));
        }
    }

    #[test]
    fn test_matches_reference() {
        let word = TimedWord::new(vec![
            ('a', 0.5),
            ('a', 2.0),
            ('a', 2.5),
            ('a', 2.75),
            ('a', 2.9),
            ('a', 3.5),
            ('a', 3.6),
            ('a', 5.0),
            ('a', 6.5),
            ('a', 8.0),
            ('a', 8.1),
        ]
        .into_iter()
        .map(Into::into)
        .collect())
        .unwrap();
        let ta = fixtures::ta4();
        let mut expected = naive::match_word(&ta, &word);
        assert!(!expected.is_empty());
        sort_answers(&mut expected);

        for use_skip_table in [true, false] {
            let config = MatcherConfig {
                use_skip_table,
                ..MatcherConfig::default()
            };
            let mut actual = BoyerMoore::with_config(ta.clone(), config).match_word(&word);
            sort_answers(&mut actual);
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_short_and_empty_words() {
        let matcher = BoyerMoore::new(fixtures::ta4());
        let mut counter = AnswerCounter::default();
        matcher.match_into(&TimedWord::default(), &mut counter);
        matcher.match_into(&TimedWord::new(vec![('a', 1.0).into()]).unwrap(), &mut counter);
        assert_eq!(counter.emitted(), 0);
    }

    #[test]
    fn test_immediate_matches_in_every_window() {
        let ta = TimedAutomaton::from_edges(
            3,
            [crate::automaton::TaEdge::new(0, 1, '$'), crate::automaton::TaEdge::new(0, 2, 'a')],
            vec![0],
            vec![1],
            vec![],
        )
        .unwrap();
        let matcher = BoyerMoore::new(ta.clone());
        assert_eq!(matcher.m(), 1);
        let word = TimedWord::new(vec![('a', 1.0).into(), ('b', 2.0).into(), ('a', 3.0).into()]).unwrap();
        assert_eq!(matcher.match_word(&word).len(), 4);
        assert_eq!(naive::match_word(&ta, &word).len(), 4);
    }
}
