//! Synchronous product of timed automata.

use crate::automaton::{State, TaEdge, TimedAutomaton};

/// Encodes the pair `(s1, s2)` as `s1 + num_states1 * s2`.
pub fn pair_state(num_states1: usize, s1: State, s2: State) -> State {
    s1 + num_states1 * s2
}

/// Builds the product of `a` and `b`.
///
/// The product runs both automata in lockstep: an edge on symbol `c` exists
/// iff both components have an edge on `c`. The clocks of `b` are numbered
/// after the clocks of `a`, and the guards and resets of both edges are
/// concatenated. States are encoded with [`pair_state`].
///
/// # Examples
///
/// ```
/// use timed_pattern::automaton::{TaEdge, TimedAutomaton};
/// use timed_pattern::product::intersection;
/// use timed_pattern::types::Constraint;
///
/// let a = TimedAutomaton::from_edges(2, [TaEdge::new(0, 1, 'a').guard([Constraint::le(0, 1)])], vec![0], vec![1], vec![1]).unwrap();
/// let b = TimedAutomaton::from_edges(2, [TaEdge::new(0, 1, 'a').guard([Constraint::ge(0, 2)])], vec![0], vec![1], vec![2]).unwrap();
///
/// let ab = intersection(&a, &b);
/// assert_eq!(ab.num_states(), 4);
/// assert_eq!(ab.num_clocks(), 2);
/// assert_eq!(ab.edges(0)[0].guard, vec![Constraint::le(0, 1), Constraint::ge(1, 2)]);
/// assert_eq!(ab.accepting(), &[3]);
/// ```
pub fn intersection(a: &TimedAutomaton, b: &TimedAutomaton) -> TimedAutomaton {
    let n1 = a.num_states();
    let offset = a.num_clocks();
    let num_states = n1 * b.num_states();

    let mut edges = vec![Vec::new(); num_states];
    for s2 in 0..b.num_states() {
        for s1 in 0..n1 {
            let list: &mut Vec<TaEdge> = &mut edges[pair_state(n1, s1, s2)];
            for e1 in a.edges(s1) {
                for e2 in b.edges(s2).iter().filter(|e2| e2.symbol == e1.symbol) {
                    let resets = e1.resets.iter().copied().chain(e2.resets.iter().map(|x| x.offset(offset)));
                    let guard = e1.guard.iter().copied().chain(e2.guard.iter().map(|c| c.offset(offset)));
                    list.push(TaEdge {
                        source: pair_state(n1, e1.source, e2.source),
                        target: pair_state(n1, e1.target, e2.target),
                        symbol: e1.symbol,
                        resets: resets.collect(),
                        guard: guard.collect(),
                    });
                }
            }
        }
    }

    let cross = |xs: &[State], ys: &[State]| -> Vec<State> {
        let mut states: Vec<State> = ys.iter().flat_map(|&s2| xs.iter().map(move |&s1| pair_state(n1, s1, s2))).collect();
        states.sort_unstable();
        states
    };
    let initial = cross(a.initial(), b.initial());
    let accepting = cross(a.accepting(), b.accepting());

    let max_constants = a.max_constants().iter().chain(b.max_constants()).copied().collect();

    log::debug!("product automaton: {} states, {} clocks", num_states, offset + b.num_clocks());
    TimedAutomaton::from_parts(edges, initial, accepting, max_constants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive;
    use crate::types::{Constraint, Symbol};
    use crate::word::TimedWord;

    /// `a` at a time within `[lo, hi]` after the match start, then the end.
    fn a_within(lo: i64, hi: i64) -> TimedAutomaton {
        TimedAutomaton::from_edges(
            3,
            [
                TaEdge::new(0, 1, 'a').guard([Constraint::ge(0, lo), Constraint::le(0, hi)]),
                TaEdge::new(1, 2, '$'),
            ],
            vec![0],
            vec![2],
            vec![hi],
        )
        .unwrap()
    }

    #[test]
    fn test_pair_state() {
        assert_eq!(pair_state(3, 2, 0), 2);
        assert_eq!(pair_state(3, 0, 1), 3);
        assert_eq!(pair_state(3, 2, 4), 14);
    }

    #[test]
    fn test_structure() {
        let a = a_within(0, 1);
        let b = a_within(1, 2);
        let ab = intersection(&a, &b);
        assert_eq!(ab.num_states(), 9);
        assert_eq!(ab.initial(), &[0]);
        assert_eq!(ab.accepting(), &[8]);
        assert_eq!(ab.max_constants(), &[1, 2]);
        assert_eq!(ab.edges(0).len(), 1);
        assert_eq!(ab.edges(0)[0].target, 4);
        assert_eq!(ab.edges(4)[0].symbol, Symbol::END);
        // No edge pairs up different states of the left component alone.
        assert!(ab.edges(1).is_empty());
    }

    #[test]
    fn test_resets_are_offset() {
        let a = TimedAutomaton::from_edges(2, [TaEdge::new(0, 1, 'a').reset([0])], vec![0], vec![1], vec![1]).unwrap();
        let ab = intersection(&a, &a);
        assert_eq!(ab.num_clocks(), 2);
        let resets: Vec<usize> = ab.edges(0)[0].resets.iter().map(|x| x.index()).collect();
        assert_eq!(resets, vec![0, 1]);
    }

    #[test]
    fn test_language_intersection() {
        // `a` within [0, 2] and within [1, 4]: the product accepts `a` within [1, 2].
        let a = a_within(0, 2);
        let b = a_within(1, 4);
        let ab = intersection(&a, &b);

        // Some match of the one-letter word may start at time 0.
        let accepts = |ta: &TimedAutomaton, t: f64| -> bool {
            let word = TimedWord::new(vec![('a', t).into()]).unwrap();
            naive::match_word(ta, &word).iter().any(|ans| ans.begin.contains(0.0))
        };

        for t in [0.5, 1.0, 1.5, 2.0, 2.5, 4.0] {
            let both = accepts(&a, t) && accepts(&b, t);
            assert_eq!(accepts(&ab, t), both, "t = {}", t);
        }
        assert!(accepts(&ab, 1.0));
        assert!(accepts(&ab, 1.5));
        assert!(accepts(&ab, 2.0));
        assert!(!accepts(&ab, 0.5));
        assert!(!accepts(&ab, 2.5));
    }
}
