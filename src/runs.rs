//! Shortest runs of an abstraction automaton.
//!
//! [`calc_l`] finds how many steps a match needs at least (`m`) and the
//! runs that get there. [`calc_ls`] answers the same question for reaching
//! a given pattern state, capped at `m`. The skip table of
//! [`BoyerMoore`][crate::bm::BoyerMoore] is computed from both.

use std::collections::{BTreeSet, HashSet};

use crate::abstraction::{Abstraction, AbstractionAutomaton};
use crate::automaton::{Nfa, State};
use crate::ops;

/// A sequence of abstraction automaton states, each one step after the
/// previous.
pub type Run = Vec<State>;

/// Marks the states whose tag is among the tags of `sources`.
fn tag_filter<A: Abstraction>(automaton: &AbstractionAutomaton<A>, sources: &[State]) -> Vec<bool> {
    let tags: HashSet<_> = sources.iter().map(|&q| automaton.tag_key(q)).collect();
    (0..automaton.num_states()).map(|q| tags.contains(&automaton.tag_key(q))).collect()
}

/// Extends every run by one edge towards an allowed state.
fn extend(nfa: &Nfa, runs: &[Run], allowed: &[bool]) -> Vec<Run> {
    let mut next = BTreeSet::new();
    for run in runs {
        let Some(&last) = run.last() else {
            continue;
        };
        for e in nfa.edges[last].iter().filter(|e| allowed[e.target]) {
            let mut longer = run.clone();
            longer.push(e.target);
            next.insert(longer);
        }
    }
    next.into_iter().collect()
}

/// Computes `(L, m)`.
///
/// `m` is the number of steps after which a run from an initial state first
/// reaches an accepting state, only walking through states from which an
/// accepting state is reachable. `L` holds those shortest runs without their
/// accepting last state, so every run in `L` has `m` states. If no accepting
/// state is reachable, `L` is empty.
pub fn calc_l<A: Abstraction>(automaton: &AbstractionAutomaton<A>) -> (Vec<Run>, usize) {
    let nfa = automaton.nfa();
    let co_reachable = ops::reachable(&ops::reverse(nfa));
    let allowed = tag_filter(automaton, &co_reachable);

    let mut runs: Vec<Run> = nfa.initial.iter().filter(|&&q| allowed[q]).map(|&q| vec![q]).collect();
    let mut m = 0;
    while !runs.is_empty() {
        let accepted = runs.iter().any(|r| r.last().is_some_and(|&q| nfa.is_accepting(q)));
        if accepted {
            break;
        }
        runs = extend(nfa, &runs, &allowed);
        m += 1;
    }

    let mut prefixes: Vec<Run> = runs
        .into_iter()
        .map(|mut r| {
            r.pop();
            r
        })
        .collect();
    prefixes.sort();
    prefixes.dedup();
    log::debug!("calc_l: m = {}, {} runs", m, prefixes.len());
    (prefixes, m)
}

/// Computes `(Ls, ms)` for the pattern state `s`.
///
/// Like [`calc_l`], but the target is any state tagged with `s` and the
/// search gives up once `ms` reaches `m`. The runs in `Ls` keep their last
/// state and have `ms` states each.
pub fn calc_ls<A: Abstraction>(automaton: &AbstractionAutomaton<A>, s: State, m: usize) -> (Vec<Run>, usize) {
    let nfa = automaton.nfa();
    let targets: Vec<State> = (0..automaton.num_states()).filter(|&q| automaton.ta_state(q) == s).collect();
    let reaching = ops::reachable_from(&ops::reverse(nfa), &targets);
    let allowed = tag_filter(automaton, &reaching);

    let mut runs: Vec<Run> = nfa.initial.iter().filter(|&&q| allowed[q]).map(|&q| vec![q]).collect();
    let mut ms = 1;
    while !runs.is_empty() {
        let arrived = runs.iter().any(|r| r.last().is_some_and(|&q| automaton.ta_state(q) == s));
        if arrived || m < ms + 1 {
            break;
        }
        runs = extend(nfa, &runs, &allowed);
        ms += 1;
    }

    runs.sort();
    runs.dedup();
    log::trace!("calc_ls({}): ms = {}, {} runs", s, ms, runs.len());
    (runs, ms)
}
