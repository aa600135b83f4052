//! Sample pattern automata.
//!
//! These are the patterns the `tpm` demo selects by number, and the ones
//! the matchers are tested and benchmarked on. Every pattern uses `$`
//! ([`Symbol::END`][crate::types::Symbol::END]) for its end-of-match edges.

use crate::automaton::{State, TaEdge, TimedAutomaton};
use crate::types::Constraint;

/// Parameters of the families of patterns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixtureParams {
    /// Scales the constants of [`ta3`].
    pub resolution: f64,
    /// Size of [`chain`] and [`ta8`].
    pub length: usize,
}

impl Default for FixtureParams {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            length: 3,
        }
    }
}

/// Number of patterns [`case`] knows about.
pub const NUM_CASES: usize = 15;

/// Returns pattern number `n`, or `None` if there is no such pattern.
pub fn case(n: usize, params: &FixtureParams) -> Option<TimedAutomaton> {
    let ta = match n {
        0 => ta0(),
        1 => ta1(),
        2 => ta2(),
        3 => ta3(params.resolution),
        4 => ta4(),
        5 => chain(100),
        6 => ta6(),
        7 => chain(params.length),
        8 => ta8(params.length),
        9 => ta9(),
        10 => phi8(),
        11 => phi5(),
        12 => phi4(),
        13 => hscc2014(),
        14 => hscc2014_settle(),
        _ => return None,
    };
    Some(ta)
}

/// Short description of pattern number `n`.
pub fn name(n: usize) -> &'static str {
    match n {
        0 => "a b",
        1 => "a b (a b)*",
        2 => "two clocks, exact delays",
        3 => "round trips with deadlines",
        4 => "chain of 4 quick a's",
        5 => "chain of 100 quick a's",
        6 => "b, then quick a's",
        7 => "chain of quick a's",
        8 => "a, quick a, quick end",
        9 => "four phases",
        10 => "Phi8",
        11 => "Phi5",
        12 => "Phi4",
        13 => "settle within 100",
        14 => "settle after 100",
        _ => "unknown",
    }
}

fn build(
    num_states: usize,
    edges: impl IntoIterator<Item = TaEdge>,
    initial: Vec<State>,
    accepting: Vec<State>,
    max_constants: Vec<i64>,
) -> TimedAutomaton {
    let mut lists = vec![Vec::new(); num_states];
    for e in edges {
        lists[e.source].push(e);
    }
    TimedAutomaton::from_parts(lists, initial, accepting, max_constants)
}

/// `a`, then `b`, then the end. No clocks.
pub fn ta0() -> TimedAutomaton {
    build(
        4,
        [TaEdge::new(0, 1, 'a'), TaEdge::new(1, 2, 'b'), TaEdge::new(2, 3, '$')],
        vec![0],
        vec![3],
        vec![],
    )
}

/// `(a b)+`, then the end. No clocks.
pub fn ta1() -> TimedAutomaton {
    build(
        4,
        [
            TaEdge::new(0, 1, 'a'),
            TaEdge::new(1, 2, 'b'),
            TaEdge::new(2, 1, 'a'),
            TaEdge::new(2, 3, '$'),
        ],
        vec![0],
        vec![3],
        vec![],
    )
}

/// A run of `a`s where one `a` comes exactly 1 after the start and a later
/// one exactly 1 after the last reset of `x1`.
pub fn ta2() -> TimedAutomaton {
    build(
        4,
        [
            TaEdge::new(0, 0, 'a').reset([1]),
            TaEdge::new(0, 1, 'a').guard([Constraint::ge(0, 1), Constraint::le(0, 1)]),
            TaEdge::new(1, 1, 'a'),
            TaEdge::new(1, 2, 'a').guard([Constraint::ge(1, 1), Constraint::le(1, 1)]),
            TaEdge::new(2, 3, '$'),
        ],
        vec![0],
        vec![3],
        vec![1, 1],
    )
}

/// Round trips between `p`, `q`, `r` and `s` events, each within 10 time
/// units, ending within 80 of the start. The constants are multiplied by
/// `resolution` (and truncated).
pub fn ta3(resolution: f64) -> TimedAutomaton {
    let short = (10.0 * resolution) as i64;
    let long = (80.0 * resolution) as i64;
    build(
        5,
        [
            TaEdge::new(0, 1, 'p'),
            TaEdge::new(0, 2, 'q'),
            TaEdge::new(0, 4, '$').guard([Constraint::le(2, long)]),
            TaEdge::new(1, 0, 'r').reset([0]).guard([Constraint::le(0, short)]),
            TaEdge::new(1, 2, 'q'),
            TaEdge::new(2, 0, 's').reset([1]).guard([Constraint::le(1, short)]),
            TaEdge::new(2, 3, 'p'),
            TaEdge::new(3, 1, 's').reset([1]).guard([Constraint::le(1, short)]),
            TaEdge::new(3, 2, 'r').reset([0]).guard([Constraint::le(0, short)]),
        ],
        vec![0],
        vec![4],
        vec![short, short, long],
    )
}

/// [`chain`] of length 4.
pub fn ta4() -> TimedAutomaton {
    chain(4)
}

/// A slow `a`, then `length` quick `a`s (each less than 1 after the previous
/// one), more quick `a`s, a slow `a`, slow `a`s, and the end exactly 1 after
/// the last `a`.
pub fn chain(length: usize) -> TimedAutomaton {
    let last = length + 1;
    let mut edges = vec![TaEdge::new(0, 1, 'a').reset([0]).guard([Constraint::gt(0, 1)])];
    for s in 1..=length {
        edges.push(TaEdge::new(s, s + 1, 'a').reset([0]).guard([Constraint::lt(0, 1)]));
    }
    edges.extend([
        TaEdge::new(last, last + 1, 'a').reset([0]).guard([Constraint::gt(0, 1)]),
        TaEdge::new(last, last, 'a').reset([0]).guard([Constraint::lt(0, 1)]),
        TaEdge::new(last + 1, last + 2, '$').reset([0]).guard([Constraint::le(0, 1), Constraint::ge(0, 1)]),
        TaEdge::new(last + 1, last + 1, 'a').reset([0]).guard([Constraint::gt(0, 1)]),
    ]);
    build(length + 4, edges, vec![0], vec![length + 3], vec![1])
}

/// `b`, then at least four `a`s less than 1 after it, one more `a` after
/// that, and the end.
pub fn ta6() -> TimedAutomaton {
    build(
        8,
        [
            TaEdge::new(0, 1, 'b').reset([0]),
            TaEdge::new(1, 2, 'a').guard([Constraint::lt(0, 1)]),
            TaEdge::new(2, 3, 'a').guard([Constraint::lt(0, 1)]),
            TaEdge::new(3, 4, 'a').guard([Constraint::lt(0, 1)]),
            TaEdge::new(4, 5, 'a').guard([Constraint::lt(0, 1)]),
            TaEdge::new(5, 6, 'a').guard([Constraint::gt(0, 1)]),
            TaEdge::new(5, 5, 'a'),
            TaEdge::new(6, 7, '$'),
        ],
        vec![0],
        vec![7],
        vec![1],
    )
}

/// `length` identical branches: `a`, a quick `a`, and a quick end.
pub fn ta8(length: usize) -> TimedAutomaton {
    let mut edges = Vec::with_capacity(3 * length);
    for i in 0..length {
        let first = 2 + 2 * i;
        edges.push(TaEdge::new(0, first, 'a').reset([0]));
        edges.push(TaEdge::new(first, first + 1, 'a').reset([0]).guard([Constraint::lt(0, 1)]));
        edges.push(TaEdge::new(first + 1, 1, '$').guard([Constraint::lt(0, 1)]));
    }
    build(2 + 2 * length, edges, vec![0], vec![1], vec![1])
}

/// Four phases of letters from `0-3`, `4-7`, `8-b` and `c-f`, each within
/// 10 time units of the first letter, then `d`s and the end.
pub fn ta9() -> TimedAutomaton {
    let within = || [Constraint::lt(0, 10)];
    let soon = || [Constraint::le(0, 2)];
    let mut edges = Vec::new();
    for c in ['0', '1', '2', '3'] {
        edges.push(TaEdge::new(0, 1, c).reset([0]));
    }
    for c in ['4', '5', '6', '7'] {
        edges.push(TaEdge::new(1, 2, c).guard(within()));
        edges.push(TaEdge::new(2, 2, c).guard(within()));
    }
    for c in ['8', '9', 'a', 'b'] {
        edges.push(TaEdge::new(2, 3, c).guard(within()));
        edges.push(TaEdge::new(3, 3, c).guard(within()));
    }
    for c in ['c', 'e'] {
        edges.push(TaEdge::new(3, 4, c).reset([0]).guard(within()));
        edges.push(TaEdge::new(4, 4, c).guard(soon()));
    }
    for c in ['d', 'f'] {
        edges.push(TaEdge::new(3, 5, c).guard(within()));
        edges.push(TaEdge::new(4, 5, c).guard(soon()));
    }
    edges.extend([
        TaEdge::new(5, 6, 'd').reset([0]),
        TaEdge::new(6, 7, '$').guard([Constraint::gt(0, 1)]),
        TaEdge::new(6, 6, 'd').guard([Constraint::le(0, 1)]),
    ]);
    build(8, edges, vec![0], vec![7], vec![10])
}

/// Two interleavings of `2`/`5` and `3`/`4`, the `4` within 10 of the start,
/// then the end more than 1 after the `4`.
pub fn phi8() -> TimedAutomaton {
    let within = || [Constraint::le(0, 10)];
    build(
        11,
        [
            TaEdge::new(1, 2, '5'),
            TaEdge::new(1, 3, '2'),
            TaEdge::new(2, 4, '2'),
            TaEdge::new(3, 4, '5'),
            TaEdge::new(3, 5, '3'),
            TaEdge::new(4, 6, '3'),
            TaEdge::new(5, 6, '5'),
            TaEdge::new(5, 7, '4').reset([0]).guard(within()),
            TaEdge::new(6, 8, '4').reset([0]).guard(within()),
            TaEdge::new(7, 8, '5'),
            TaEdge::new(8, 0, '$').guard([Constraint::gt(0, 1)]),
            TaEdge::new(9, 1, '1'),
            TaEdge::new(9, 10, '5'),
            TaEdge::new(10, 2, '1'),
        ],
        vec![9],
        vec![0],
        vec![10],
    )
}

/// One of `1-4`, then a different one less than 2 later, then the end.
pub fn phi5() -> TimedAutomaton {
    let mut edges = Vec::new();
    for first in 1..=4usize {
        let c = char::from(b'0' + first as u8);
        edges.push(TaEdge::new(9, first, c).reset([0]));
        for second in (1..=4usize).filter(|&s| s != first) {
            let c = char::from(b'0' + second as u8);
            edges.push(TaEdge::new(first, first + 4, c).guard([Constraint::lt(0, 2)]));
        }
        edges.push(TaEdge::new(first + 4, 0, '$'));
    }
    build(10, edges, vec![9], vec![0], vec![2])
}

/// `1`, then `2` less than 2 later, then the end.
pub fn phi4() -> TimedAutomaton {
    build(
        4,
        [
            TaEdge::new(1, 2, '2').guard([Constraint::lt(0, 2)]),
            TaEdge::new(2, 0, '$'),
            TaEdge::new(3, 1, '1').reset([0]),
        ],
        vec![3],
        vec![0],
        vec![2],
    )
}

/// `1` (a mode switch), then `0` (settled) less than 100 later.
pub fn hscc2014() -> TimedAutomaton {
    build(
        4,
        [
            TaEdge::new(1, 3, '0').guard([Constraint::lt(0, 100)]),
            TaEdge::new(2, 1, '1').reset([0]),
            TaEdge::new(3, 0, '$'),
        ],
        vec![2],
        vec![0],
        vec![100],
    )
}

/// `1`, then `0`, with the match lasting more than 100 after the `1`.
pub fn hscc2014_settle() -> TimedAutomaton {
    build(
        4,
        [
            TaEdge::new(1, 3, '0'),
            TaEdge::new(2, 1, '1').reset([0]),
            TaEdge::new(3, 0, '$').guard([Constraint::gt(0, 100)]),
        ],
        vec![2],
        vec![0],
        vec![100],
    )
}
