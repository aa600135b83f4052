//! Pattern automata and the plain NFAs built from them.
//!
//! A [`TimedAutomaton`] is the pattern: states with per-source edge lists,
//! where every edge carries a symbol, a guard and a set of clocks to reset.
//! An [`Nfa`] is the untimed skeleton produced by the abstraction
//! constructions (see [`crate::abstraction`]); states in both are plain
//! indices into owned vectors.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{display_guard, Clock, Constraint, Symbol};

/// State index inside an automaton.
pub type State = usize;

/// An edge of a timed automaton.
///
/// # Examples
///
/// ```
/// use timed_pattern::automaton::TaEdge;
/// use timed_pattern::types::Constraint;
///
/// let e = TaEdge::new(0, 1, 'a').reset([0]).guard([Constraint::lt(0, 1)]);
/// assert_eq!(e.to_string(), "0 -a-> 1 [x0 < 1] {x0}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaEdge {
    pub source: State,
    pub target: State,
    pub symbol: Symbol,
    pub resets: Vec<Clock>,
    pub guard: Vec<Constraint>,
}

impl TaEdge {
    /// Creates an edge without guard and resets.
    pub fn new(source: State, target: State, symbol: impl Into<Symbol>) -> Self {
        Self {
            source,
            target,
            symbol: symbol.into(),
            resets: Vec::new(),
            guard: Vec::new(),
        }
    }

    /// Adds clocks to reset when the edge is taken.
    pub fn reset(mut self, clocks: impl IntoIterator<Item = usize>) -> Self {
        self.resets.extend(clocks.into_iter().map(Clock::new));
        self
    }

    /// Adds constraints to the guard.
    pub fn guard(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.guard.extend(constraints);
        self
    }

    /// Checks whether this is an end-of-match edge.
    pub fn is_end(&self) -> bool {
        self.symbol.is_end()
    }
}

impl fmt::Display for TaEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -{}-> {} [{}]", self.source, self.symbol, self.target, display_guard(&self.guard))?;
        if !self.resets.is_empty() {
            let resets = self.resets.iter().map(|x| x.to_string()).collect::<Vec<_>>();
            write!(f, " {{{}}}", resets.join(", "))?;
        }
        Ok(())
    }
}

/// A timed automaton: the pattern to search for.
///
/// # Invariants
///
/// - `edges[s]` holds exactly the edges whose source is `s`
/// - every state mentioned by an edge, `initial` or `accepting` is `< num_states()`
/// - every clock mentioned by a guard or reset is `< num_clocks()`
/// - `initial` and `accepting` are strictly increasing
///
/// `max_constants[x]` is the largest constant compared against clock `x`;
/// both abstractions rely on it being an upper bound of every guard constant.
#[derive(Debug, Clone)]
pub struct TimedAutomaton {
    edges: Vec<Vec<TaEdge>>,
    initial: Vec<State>,
    accepting: Vec<State>,
    max_constants: Vec<i64>,
}

impl TimedAutomaton {
    /// Creates a timed automaton from per-source edge lists, validating its structure.
    pub fn new(
        edges: Vec<Vec<TaEdge>>,
        initial: Vec<State>,
        accepting: Vec<State>,
        max_constants: Vec<i64>,
    ) -> Result<Self> {
        let ta = Self {
            edges,
            initial,
            accepting,
            max_constants,
        };
        ta.validate()?;
        Ok(ta)
    }

    /// Creates a timed automaton with `num_states` states from a flat edge list.
    pub fn from_edges(
        num_states: usize,
        edges: impl IntoIterator<Item = TaEdge>,
        initial: Vec<State>,
        accepting: Vec<State>,
        max_constants: Vec<i64>,
    ) -> Result<Self> {
        let mut lists = vec![Vec::new(); num_states];
        for edge in edges {
            if edge.source >= num_states {
                return Err(Error::StateOutOfRange {
                    state: edge.source,
                    num_states,
                });
            }
            lists[edge.source].push(edge);
        }
        Self::new(lists, initial, accepting, max_constants)
    }

    /// Builds an automaton that is valid by construction.
    pub(crate) fn from_parts(
        edges: Vec<Vec<TaEdge>>,
        initial: Vec<State>,
        accepting: Vec<State>,
        max_constants: Vec<i64>,
    ) -> Self {
        let ta = Self {
            edges,
            initial,
            accepting,
            max_constants,
        };
        debug_assert!(ta.validate().is_ok());
        ta
    }

    fn validate(&self) -> Result<()> {
        let num_states = self.num_states();
        let num_clocks = self.num_clocks();

        for list in [&self.initial, &self.accepting] {
            if list.windows(2).any(|w| w[0] >= w[1]) {
                return Err(Error::UnsortedStates);
            }
            if let Some(&state) = list.iter().find(|&&s| s >= num_states) {
                return Err(Error::StateOutOfRange { state, num_states });
            }
        }

        for (list, edges) in self.edges.iter().enumerate() {
            for edge in edges {
                if edge.source != list {
                    return Err(Error::EdgeSourceMismatch {
                        source_state: edge.source,
                        target: edge.target,
                        list,
                    });
                }
                if edge.target >= num_states {
                    return Err(Error::StateOutOfRange {
                        state: edge.target,
                        num_states,
                    });
                }
                let clocks = edge.resets.iter().copied().chain(edge.guard.iter().map(|c| c.clock));
                for clock in clocks {
                    if clock.index() >= num_clocks {
                        return Err(Error::ClockOutOfRange { clock, num_clocks });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn num_states(&self) -> usize {
        self.edges.len()
    }

    pub fn num_clocks(&self) -> usize {
        self.max_constants.len()
    }

    /// Outgoing edges of state `s`.
    pub fn edges(&self, s: State) -> &[TaEdge] {
        &self.edges[s]
    }

    /// All edges, grouped by source state.
    pub fn edge_lists(&self) -> &[Vec<TaEdge>] {
        &self.edges
    }

    pub fn initial(&self) -> &[State] {
        &self.initial
    }

    pub fn accepting(&self) -> &[State] {
        &self.accepting
    }

    pub fn is_accepting(&self, s: State) -> bool {
        self.accepting.binary_search(&s).is_ok()
    }

    pub fn max_constants(&self) -> &[i64] {
        &self.max_constants
    }

    /// The largest of all max constants (`0` without clocks).
    pub fn max_constant(&self) -> i64 {
        self.max_constants.iter().copied().max().unwrap_or(0)
    }

    /// End-of-match edges leaving `s` towards an accepting state.
    pub fn accepting_end_edges(&self, s: State) -> impl Iterator<Item = &TaEdge> + '_ {
        self.edges[s].iter().filter(move |e| e.is_end() && self.is_accepting(e.target))
    }

    /// The letters used by this automaton, excluding the end-of-match symbol.
    pub fn alphabet(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.edges.iter().flatten().map(|e| e.symbol).filter(|c| !c.is_end()).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    /// Returns a copy with a different set of initial states.
    ///
    /// # Panics
    ///
    /// Panics if `initial` is not strictly increasing or mentions an unknown state.
    pub fn with_initial(&self, initial: Vec<State>) -> Self {
        assert!(initial.windows(2).all(|w| w[0] < w[1]), "initial states must be sorted");
        assert!(initial.iter().all(|&s| s < self.num_states()), "initial state out of range");
        Self {
            initial,
            ..self.clone()
        }
    }
}

impl fmt::Display for TimedAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TimedAutomaton(states={}, clocks={}, initial={:?}, accepting={:?}, max={:?})",
            self.num_states(),
            self.num_clocks(),
            self.initial,
            self.accepting,
            self.max_constants
        )?;
        for edge in self.edges.iter().flatten() {
            writeln!(f, "  {}", edge)?;
        }
        Ok(())
    }
}

/// An untimed edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NfaEdge {
    pub source: State,
    pub target: State,
    pub symbol: Symbol,
}

/// A nondeterministic finite automaton over integer-indexed states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nfa {
    /// Sorted initial states.
    pub initial: Vec<State>,
    /// Sorted accepting states.
    pub accepting: Vec<State>,
    /// Outgoing edges, indexed by source state.
    pub edges: Vec<Vec<NfaEdge>>,
}

impl Nfa {
    /// Creates an NFA with `num_states` states and no edges.
    pub fn with_states(num_states: usize) -> Self {
        Self {
            initial: Vec::new(),
            accepting: Vec::new(),
            edges: vec![Vec::new(); num_states],
        }
    }

    pub fn num_states(&self) -> usize {
        self.edges.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.iter().map(|es| es.len()).sum()
    }

    /// Appends a fresh state and returns its index.
    pub fn add_state(&mut self) -> State {
        self.edges.push(Vec::new());
        self.edges.len() - 1
    }

    pub fn add_edge(&mut self, source: State, target: State, symbol: Symbol) {
        self.edges[source].push(NfaEdge { source, target, symbol });
    }

    pub fn is_initial(&self, s: State) -> bool {
        self.initial.binary_search(&s).is_ok()
    }

    pub fn is_accepting(&self, s: State) -> bool {
        self.accepting.binary_search(&s).is_ok()
    }

    /// Iterates over all edges.
    pub fn all_edges(&self) -> impl Iterator<Item = &NfaEdge> + '_ {
        self.edges.iter().flatten()
    }
}

/// Inserts `s` into a sorted state list, keeping it sorted and duplicate-free.
pub(crate) fn insert_sorted(list: &mut Vec<State>, s: State) {
    if let Err(pos) = list.binary_search(&s) {
        list.insert(pos, s);
    }
}
