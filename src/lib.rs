//! # timed-pattern: Timed Pattern Matching in Rust
//!
//! **`timed-pattern`** finds every occurrence of a timed pattern in a timed word.
//! Patterns are **timed automata**; a word is a sequence of `(symbol, timestamp)` events.
//!
//! ## What is timed pattern matching?
//!
//! Given a pattern automaton `A` and a word `w`, the task is to find all pairs of
//! times `(t, t')` such that the part of `w` between `t` and `t'` (with timestamps
//! shifted to start at 0) is accepted by `A`. There are infinitely many such pairs in
//! general, so each answer is a **zone**: an interval for the start `t`, an interval
//! for the end `t'`, and an interval for the duration `t' - t`.
//!
//! The end of a match is marked in the pattern by edges labeled with the reserved
//! symbol `$` ([`Symbol::END`][crate::types::Symbol::END]); their guards constrain
//! the time elapsed until the match ends.
//!
//! ## Key Features
//!
//! - **Boyer-Moore Skipping**: The [`BoyerMoore`][crate::bm::BoyerMoore] matcher tries
//!   start positions from right to left and skips those that cannot start a new match,
//!   using a table precomputed from the **zone automaton** of the pattern and of its
//!   self-product.
//! - **Region & Zone Abstractions**: Both finite abstractions of clock valuations
//!   share one construction through the [`Abstraction`][crate::abstraction::Abstraction] trait.
//! - **Streaming Input**: Words can be read lazily from text or binary sources,
//!   dropping the prefix that no window needs anymore.
//! - **Reference Matchers**: [`naive`] holds straightforward matchers that every
//!   optimization is checked against.
//!
//! ## Basic Usage
//!
//! ```rust
//! use timed_pattern::automaton::{TaEdge, TimedAutomaton};
//! use timed_pattern::bm::BoyerMoore;
//! use timed_pattern::types::Constraint;
//! use timed_pattern::word::TimedWord;
//!
//! // 1. Describe the pattern: `a`, then `b` less than 1 time unit later.
//! let ta = TimedAutomaton::from_edges(
//!     4,
//!     [
//!         TaEdge::new(0, 1, 'a').reset([0]),
//!         TaEdge::new(1, 2, 'b').guard([Constraint::lt(0, 1)]),
//!         TaEdge::new(2, 3, '$'),
//!     ],
//!     vec![0],
//!     vec![3],
//!     vec![1],
//! )?;
//!
//! // 2. Precompute the skip table
//! let matcher = BoyerMoore::new(ta);
//!
//! // 3. Match
//! let word = TimedWord::new(vec![('a', 0.5).into(), ('b', 1.2).into(), ('b', 3.0).into()])?;
//! let answers = matcher.match_word(&word);
//! assert_eq!(answers.len(), 1);
//! assert!(answers[0].begin.contains(0.2));
//! assert!(answers[0].end.contains(2.0));
//! # Ok::<(), timed_pattern::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`bm`]**: The Boyer-Moore matcher and its skip table.
//! - **[`abstraction`]**: Region and zone automata.
//! - **[`word`]**: Timed words and word sources.
//! - **[`answer`]**: Answer zones and sinks that collect them.
//! - **[`dot`]**: Utilities for visualizing automata using Graphviz.

pub mod abstraction;
pub mod answer;
pub mod automaton;
pub mod bm;
pub mod dot;
pub mod error;
pub mod fixtures;
pub mod naive;
pub mod ops;
pub mod partial_run;
pub mod product;
pub mod region;
pub mod runs;
pub mod scan;
pub mod types;
pub mod word;
pub mod zone;
