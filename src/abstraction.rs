//! Finite abstractions of a timed automaton.
//!
//! Both the region and the zone construction explore the same symbolic state
//! space: configurations `(pattern state, abstract valuation)`, connected by
//! "let time pass, then take an edge". They differ only in how time elapse,
//! guard admission and normalization work, which the [`Abstraction`] trait
//! captures. [`AbstractionAutomaton::extend`] is the shared BFS.
//!
//! # Examples
//!
//! ```
//! use timed_pattern::abstraction::ZoneAutomaton;
//! use timed_pattern::automaton::{TaEdge, TimedAutomaton};
//! use timed_pattern::types::Constraint;
//!
//! // `a` within one time unit, then end of match.
//! let ta = TimedAutomaton::from_edges(
//!     3,
//!     [
//!         TaEdge::new(0, 1, 'a').guard([Constraint::lt(0, 1)]),
//!         TaEdge::new(1, 2, '$'),
//!     ],
//!     vec![0],
//!     vec![2],
//!     vec![1],
//! )
//! .unwrap();
//!
//! let za = ZoneAutomaton::build(&ta);
//! assert_eq!(za.num_states(), 3);
//! assert_eq!(za.nfa().accepting, vec![2]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

use crate::automaton::{Nfa, State, TaEdge, TimedAutomaton};
use crate::ops;
use crate::region::Region;
use crate::types::{Clock, Constraint};
use crate::zone::Zone;

/// Outcome of testing a guard against an abstract valuation.
#[derive(Debug, Clone)]
pub enum Admission<A> {
    /// The guard holds; carries the valuation restricted to the guard.
    Admitted(A),
    /// The guard does not hold yet, but may hold after more time passes.
    Pending,
    /// The guard cannot hold now nor after any further delay.
    Exhausted,
}

/// A finite abstraction of clock valuations.
pub trait Abstraction: Clone + fmt::Debug + fmt::Display {
    /// Canonical hashable value identifying an abstract valuation.
    type Key: Clone + Eq + Hash + fmt::Debug;

    /// Time successors, in increasing order.
    type Delays: Iterator<Item = Self>;

    /// The abstraction of the all-zero valuation of `ta`'s clocks.
    fn initial(ta: &TimedAutomaton) -> Self;

    fn num_clocks(&self) -> usize;

    /// Valuations reachable by letting time pass.
    fn delays(&self) -> Self::Delays;

    /// Tests a guard (a conjunction of constraints).
    fn admits(&self, guard: &[Constraint]) -> Admission<Self>;

    /// Sets the given clocks to zero.
    fn reset(&mut self, clocks: &[Clock]);

    /// Brings the value into the canonical form used by [`Abstraction::key`].
    fn normalize(&mut self);

    fn key(&self) -> Self::Key;

    fn is_satisfiable(&self) -> bool;

    /// Restricts to a contiguous range of clocks, renumbered from 0.
    fn project(&self, clocks: Range<usize>) -> Self;
}

/// An NFA whose states are tagged with `(pattern state, abstract valuation)`.
#[derive(Debug, Clone)]
pub struct AbstractionAutomaton<A: Abstraction> {
    nfa: Nfa,
    tags: Vec<(State, A)>,
    index: HashMap<(State, A::Key), State>,
}

pub type RegionAutomaton = AbstractionAutomaton<Region>;
pub type ZoneAutomaton = AbstractionAutomaton<Zone>;

impl<A: Abstraction> Default for AbstractionAutomaton<A> {
    fn default() -> Self {
        Self {
            nfa: Nfa::default(),
            tags: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<A: Abstraction> AbstractionAutomaton<A> {
    /// Creates an empty automaton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the abstraction automaton of `ta` from its initial states at
    /// the zero valuation.
    pub fn build(ta: &TimedAutomaton) -> Self {
        let mut automaton = Self::new();
        automaton.extend(ta, ta.initial(), A::initial(ta));
        log::info!("abstraction automaton: {} states, {} edges", automaton.num_states(), automaton.nfa.num_edges());
        automaton
    }

    /// Explores the configurations reachable from `(s, seed)` for every `s`
    /// in `initial`, appending newly found states.
    ///
    /// Configurations already present are reused, so repeated calls grow a
    /// single automaton. Returns the states of the seeds.
    pub fn extend(&mut self, ta: &TimedAutomaton, initial: &[State], seed: A) -> Vec<State> {
        let seed_key = seed.key();
        let mut seeds = Vec::with_capacity(initial.len());
        let mut frontier = Vec::new();
        for &s in initial {
            if let Some(&q) = self.index.get(&(s, seed_key.clone())) {
                seeds.push(q);
                continue;
            }
            let q = self.add_state(ta, s, seed.clone(), seed_key.clone());
            self.nfa.initial.push(q);
            seeds.push(q);
            frontier.push(q);
        }

        let mut wave = 0;
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &q in &frontier {
                let (s, value) = self.tags[q].clone();
                for (edge, successor) in successors(ta, s, &value) {
                    let key = successor.key();
                    let target = match self.index.get(&(edge.target, key.clone())) {
                        Some(&t) => t,
                        None => {
                            let t = self.add_state(ta, edge.target, successor, key);
                            next.push(t);
                            t
                        }
                    };
                    self.nfa.add_edge(q, target, edge.symbol);
                }
            }
            wave += 1;
            log::debug!("wave {}: {} new states", wave, next.len());
            frontier = next;
        }
        seeds
    }

    fn add_state(&mut self, ta: &TimedAutomaton, s: State, value: A, key: A::Key) -> State {
        let q = self.nfa.add_state();
        self.tags.push((s, value));
        self.index.insert((s, key), q);
        if ta.is_accepting(s) {
            self.nfa.accepting.push(q);
        }
        q
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn num_states(&self) -> usize {
        self.tags.len()
    }

    /// All state tags, indexed by state.
    pub fn tags(&self) -> &[(State, A)] {
        &self.tags
    }

    /// The pattern state of `q`.
    pub fn ta_state(&self, q: State) -> State {
        self.tags[q].0
    }

    /// The abstract valuation of `q`.
    pub fn value(&self, q: State) -> &A {
        &self.tags[q].1
    }

    /// Canonical tag of `q`.
    pub fn tag_key(&self, q: State) -> (State, A::Key) {
        (self.tags[q].0, self.tags[q].1.key())
    }

    /// Finds the state tagged with `(s, key)`.
    pub fn lookup(&self, s: State, key: &A::Key) -> Option<State> {
        self.index.get(&(s, key.clone())).copied()
    }

    /// Removes the states unreachable from the initial states, carrying the
    /// tags along the renumbering.
    pub fn prune_unreachable(&self) -> Self {
        let (nfa, kept) = ops::prune_unreachable(&self.nfa);
        let tags: Vec<(State, A)> = kept.iter().map(|&q| self.tags[q].clone()).collect();
        let index = tags.iter().enumerate().map(|(q, (s, value))| ((*s, value.key()), q)).collect();
        Self { nfa, tags, index }
    }

    /// Checks whether some run from an initial state visits exactly the
    /// pattern states `ta_run`, in order.
    pub fn is_partial_run(&self, ta_run: &[State]) -> bool {
        let Some((&first, rest)) = ta_run.split_first() else {
            return true;
        };
        let mut current: Vec<State> = self.nfa.initial.iter().copied().filter(|&q| self.ta_state(q) == first).collect();
        for &s in rest {
            if current.is_empty() {
                return false;
            }
            let mut next: Vec<State> = current
                .iter()
                .flat_map(|&q| self.nfa.edges[q].iter())
                .map(|e| e.target)
                .filter(|&t| self.ta_state(t) == s)
                .collect();
            next.sort_unstable();
            next.dedup();
            current = next;
        }
        !current.is_empty()
    }
}

/// Abstract successors of `(state, value)`: every edge admitted after some
/// delay, with the resulting normalized valuation.
fn successors<'a, A: Abstraction>(ta: &'a TimedAutomaton, state: State, value: &A) -> Vec<(&'a TaEdge, A)> {
    let edges = ta.edges(state);
    let mut result = Vec::new();
    for now in value.delays() {
        let mut exhausted = true;
        for edge in edges {
            match now.admits(&edge.guard) {
                Admission::Admitted(mut next) => {
                    exhausted = false;
                    next.reset(&edge.resets);
                    next.normalize();
                    result.push((edge, next));
                }
                Admission::Pending => exhausted = false,
                Admission::Exhausted => {}
            }
        }
        if exhausted {
            break;
        }
    }
    log::trace!("state {}: {} abstract successors", state, result.len());
    result
}

/// Builds the region automaton over every `(state, region)` pair, reachable
/// or not.
///
/// The initial states are the zero regions of `ta`'s initial states. This is
/// the textbook construction; [`RegionAutomaton::build`] explores only the
/// reachable part.
pub fn naive_region_automaton(ta: &TimedAutomaton) -> RegionAutomaton {
    let regions = Region::enumerate_all(ta.max_constants());
    log::debug!("naive region automaton over {} regions per state", regions.len());

    let mut automaton = RegionAutomaton::new();
    for s in 0..ta.num_states() {
        for region in &regions {
            automaton.add_state(ta, s, region.clone(), region.key());
        }
    }

    for q in 0..automaton.num_states() {
        let (s, region) = automaton.tags[q].clone();
        for (edge, successor) in successors(ta, s, &region) {
            let Some(target) = automaton.lookup(edge.target, &successor.key()) else {
                panic!("region {} is missing from the region space", successor);
            };
            automaton.nfa.add_edge(q, target, edge.symbol);
        }
    }

    let zero = Region::zero(ta.max_constants()).key();
    let mut initial: Vec<State> = ta.initial().iter().filter_map(|&s| automaton.lookup(s, &zero)).collect();
    initial.sort_unstable();
    automaton.nfa.initial = initial;
    automaton
}
