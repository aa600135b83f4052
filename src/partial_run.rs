//! Joint realizability of two runs.
//!
//! Two runs of the abstraction automaton of a pattern `A` describe two
//! possible readings of the same timed word, started at different
//! positions. Whether both can happen on one word is decided on the
//! abstraction automaton of the self-product `A x A`: the pair of runs is
//! realizable if some product run visits, step by step, the pair of pattern
//! states of both runs with both halves of its clock valuation matching
//! theirs.

use std::collections::HashMap;

use crate::abstraction::{Abstraction, AbstractionAutomaton};
use crate::automaton::{State, TimedAutomaton};
use crate::product::{intersection, pair_state};

type HalfKeys<A> = (<A as Abstraction>::Key, <A as Abstraction>::Key);

/// Checks pairs of runs against a growing product abstraction automaton.
#[derive(Debug, Clone)]
pub struct PartialRunChecker<A: Abstraction> {
    /// The self-product of the pattern.
    product_ta: TimedAutomaton,
    product: AbstractionAutomaton<A>,
    num_states: usize,
    num_clocks: usize,
    /// Keys of the two projections of every indexed product state.
    halves: Vec<HalfKeys<A>>,
    index: HashMap<(State, A::Key, A::Key), Vec<State>>,
}

impl<A: Abstraction> PartialRunChecker<A> {
    pub fn new(ta: &TimedAutomaton) -> Self {
        let product_ta = intersection(ta, ta);
        log::debug!(
            "partial-run checker over a product of {} states and {} clocks",
            product_ta.num_states(),
            product_ta.num_clocks()
        );
        Self {
            product_ta,
            product: AbstractionAutomaton::new(),
            num_states: ta.num_states(),
            num_clocks: ta.num_clocks(),
            halves: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn product_ta(&self) -> &TimedAutomaton {
        &self.product_ta
    }

    pub fn product(&self) -> &AbstractionAutomaton<A> {
        &self.product
    }

    /// Explores the product from the pair of pattern states `(s1, s2)` with
    /// the valuation `value` over both clock halves.
    pub fn seed(&mut self, s1: State, s2: State, value: A) {
        let start = pair_state(self.num_states, s1, s2);
        self.product.extend(&self.product_ta, &[start], value);
        self.refresh_index();
    }

    /// Forgets every explored product state.
    pub fn clear(&mut self) {
        self.product = AbstractionAutomaton::new();
        self.halves.clear();
        self.index.clear();
    }

    /// Indexes the product states added since the last call.
    fn refresh_index(&mut self) {
        let n = self.num_clocks;
        for q in self.halves.len()..self.product.num_states() {
            let value = self.product.value(q);
            let first = value.project(0..n).key();
            let second = value.project(n..2 * n).key();
            self.index
                .entry((self.product.ta_state(q), first.clone(), second.clone()))
                .or_default()
                .push(q);
            self.halves.push((first, second));
        }
    }

    /// Checks whether the runs `r1` and `r2` of `base` can be followed in
    /// lockstep by one run of the product.
    ///
    /// Runs of different lengths never can. The product must already have
    /// been seeded at the first pair of states.
    ///
    /// # Panics
    ///
    /// Panics if no product state matches the first pair of states.
    pub fn check(&self, base: &AbstractionAutomaton<A>, r1: &[State], r2: &[State]) -> bool {
        if r1.len() != r2.len() {
            return false;
        }
        let Some((&first1, &first2)) = r1.first().zip(r2.first()) else {
            return true;
        };

        let pair = |q1: State, q2: State| pair_state(self.num_states, base.ta_state(q1), base.ta_state(q2));

        let start = (pair(first1, first2), base.value(first1).key(), base.value(first2).key());
        let mut candidates = match self.index.get(&start) {
            Some(states) if !states.is_empty() => states.clone(),
            _ => panic!("no product state for the runs starting at {} and {}", first1, first2),
        };

        for (&q1, &q2) in r1.iter().zip(r2).skip(1) {
            let target = pair(q1, q2);
            let keys = (base.value(q1).key(), base.value(q2).key());
            let mut next: Vec<State> = candidates
                .iter()
                .flat_map(|&q| self.product.nfa().edges[q].iter())
                .map(|e| e.target)
                .filter(|&t| self.product.ta_state(t) == target && self.halves[t] == keys)
                .collect();
            if next.is_empty() {
                return false;
            }
            next.sort_unstable();
            next.dedup();
            candidates = next;
        }
        true
    }
}
