//! Automata to DOT (Graphviz) conversion.
//!
//! Timed automata, plain NFAs and abstraction automata can all be rendered
//! as directed graphs:
//!
//! - **States** are circles, accepting states double circles
//! - **Initial states** get an incoming arrow from an invisible point
//! - **Edges** are labeled with their symbol; timed automaton edges also
//!   show their guard and reset set
//! - **Abstraction automaton states** optionally show their tag
//!   `(pattern state, abstract valuation)`
//!
//! # Examples
//!
//! ```
//! use timed_pattern::fixtures;
//!
//! let ta = fixtures::ta4();
//! let dot = ta.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::fmt::Write as _;

use crate::abstraction::{Abstraction, AbstractionAutomaton};
use crate::automaton::{Nfa, State, TimedAutomaton};
use crate::types::display_guard;

/// Configuration options for DOT output generation.
///
/// ```
/// use timed_pattern::dot::DotConfig;
/// use timed_pattern::fixtures;
///
/// let config = DotConfig {
///     rank_dir: "TB",
///     ..DotConfig::default()
/// };
/// let dot = fixtures::ta0().to_dot_with_config(&config).unwrap();
/// assert!(dot.contains("rankdir=TB"));
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for accepting states (default: "doublecircle")
    pub accepting_shape: &'static str,
    /// Layout direction (default: "LR")
    pub rank_dir: &'static str,
    /// Whether to label abstraction automaton states with their tags (default: true)
    pub show_tags: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            accepting_shape: "doublecircle",
            rank_dir: "LR",
            show_tags: true,
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes a graph with the given states and `(source, target, label)` edges.
fn write_graph(
    config: &DotConfig,
    num_states: usize,
    initial: &[State],
    accepting: &[State],
    state_label: impl Fn(State) -> String,
    edges: impl Iterator<Item = (State, State, String)>,
) -> Result<String, std::fmt::Error> {
    let mut dot = String::new();
    writeln!(dot, "digraph {{")?;
    writeln!(dot, "rankdir={};", config.rank_dir)?;
    writeln!(dot, "node [shape={}];", config.state_shape)?;

    for s in 0..num_states {
        let shape = if accepting.contains(&s) {
            config.accepting_shape
        } else {
            config.state_shape
        };
        writeln!(dot, "{} [shape={}, label=\"{}\"];", s, shape, escape(&state_label(s)))?;
    }

    for (i, &s) in initial.iter().enumerate() {
        writeln!(dot, "init{} [shape=point, style=invis];", i)?;
        writeln!(dot, "init{} -> {};", i, s)?;
    }

    for (source, target, label) in edges {
        writeln!(dot, "{} -> {} [label=\"{}\"];", source, target, escape(&label))?;
    }

    writeln!(dot, "}}")?;
    Ok(dot)
}

impl Nfa {
    /// Converts the automaton to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        write_graph(
            config,
            self.num_states(),
            &self.initial,
            &self.accepting,
            |s| s.to_string(),
            self.all_edges().map(|e| (e.source, e.target, e.symbol.to_string())),
        )
    }
}

impl TimedAutomaton {
    /// Converts the automaton to DOT format. Edges are labeled
    /// `symbol [guard] {resets}`.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let edges = self.edge_lists().iter().flatten().map(|e| {
            let mut label = e.symbol.to_string();
            if !e.guard.is_empty() {
                label.push_str(&format!(" [{}]", display_guard(&e.guard)));
            }
            if !e.resets.is_empty() {
                let resets: Vec<String> = e.resets.iter().map(|x| x.to_string()).collect();
                label.push_str(&format!(" {{{}}}", resets.join(", ")));
            }
            (e.source, e.target, label)
        });
        write_graph(
            config,
            self.num_states(),
            self.initial(),
            self.accepting(),
            |s| s.to_string(),
            edges,
        )
    }
}

impl<A: Abstraction> AbstractionAutomaton<A> {
    /// Converts the automaton to DOT format, labeling states with their tags
    /// unless [`DotConfig::show_tags`] is off.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let nfa = self.nfa();
        write_graph(
            config,
            self.num_states(),
            &nfa.initial,
            &nfa.accepting,
            |q| {
                if config.show_tags {
                    format!("{}: ({}, {})", q, self.ta_state(q), self.value(q))
                } else {
                    q.to_string()
                }
            },
            nfa.all_edges().map(|e| (e.source, e.target, e.symbol.to_string())),
        )
    }
}
