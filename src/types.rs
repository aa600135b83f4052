//! Value types shared by automata, abstractions and matchers.
//!
//! This module provides small newtype wrappers (symbols, clocks) and the
//! clock constraints that make up edge guards.
use std::cmp::Ordering;
use std::fmt;

/// A letter of the input alphabet.
///
/// One letter is reserved: [`Symbol::END`] labels the "end of match"
/// transitions of a pattern automaton and never occurs in a timed word.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Symbol(char);

impl Symbol {
    /// The reserved end-of-match symbol (`$`).
    pub const END: Symbol = Symbol('$');

    /// Creates a new symbol from a character.
    pub const fn new(c: char) -> Self {
        Symbol(c)
    }

    /// Returns the underlying character.
    pub fn as_char(self) -> char {
        self.0
    }

    /// Checks whether this is the reserved end-of-match symbol.
    pub fn is_end(self) -> bool {
        self == Symbol::END
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(c)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// A clock identifier (0-indexed).
///
/// Clocks are numbered `0..n` inside one timed automaton. Difference-bound
/// matrices shift them by one, reserving row/column 0 for the reference clock.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Clock(usize);

impl Clock {
    /// Creates a new clock with the given index.
    pub const fn new(index: usize) -> Self {
        Clock(index)
    }

    /// Returns the raw clock index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns the same clock shifted by `offset` (used when building products).
    pub fn offset(self, offset: usize) -> Self {
        Clock(self.0 + offset)
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<usize> for Clock {
    fn from(index: usize) -> Self {
        Clock(index)
    }
}

impl From<Clock> for usize {
    fn from(clock: Clock) -> Self {
        clock.0
    }
}

/// Comparison operator of a clock constraint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    /// `<` and `<=` bound a value from above.
    pub fn is_upper(self) -> bool {
        matches!(self, Comparator::Lt | Comparator::Le)
    }

    /// `<=` and `>=` admit the bound itself.
    pub fn is_closed(self) -> bool {
        matches!(self, Comparator::Le | Comparator::Ge)
    }

    /// Mirrors the operator, so that `a op b` iff `b op.flip() a`.
    pub fn flip(self) -> Self {
        match self {
            Comparator::Lt => Comparator::Gt,
            Comparator::Le => Comparator::Ge,
            Comparator::Gt => Comparator::Lt,
            Comparator::Ge => Comparator::Le,
        }
    }

    /// Evaluates `lhs op rhs`.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// A clock constraint `x op c` with an integer bound `c`.
///
/// A guard is a conjunction of constraints, stored as a slice.
///
/// # Examples
///
/// ```
/// use timed_pattern::types::Constraint;
///
/// let c = Constraint::lt(0, 1);
/// assert!(c.is_satisfied_by(0.5));
/// assert!(!c.is_satisfied_by(1.0));
/// assert_eq!(c.to_string(), "x0 < 1");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Constraint {
    pub clock: Clock,
    pub op: Comparator,
    pub bound: i64,
}

impl Constraint {
    pub fn new(clock: impl Into<Clock>, op: Comparator, bound: i64) -> Self {
        Self {
            clock: clock.into(),
            op,
            bound,
        }
    }

    /// `x < c`
    pub fn lt(clock: impl Into<Clock>, bound: i64) -> Self {
        Self::new(clock, Comparator::Lt, bound)
    }

    /// `x <= c`
    pub fn le(clock: impl Into<Clock>, bound: i64) -> Self {
        Self::new(clock, Comparator::Le, bound)
    }

    /// `x > c`
    pub fn gt(clock: impl Into<Clock>, bound: i64) -> Self {
        Self::new(clock, Comparator::Gt, bound)
    }

    /// `x >= c`
    pub fn ge(clock: impl Into<Clock>, bound: i64) -> Self {
        Self::new(clock, Comparator::Ge, bound)
    }

    /// Checks the constraint against a concrete clock value.
    pub fn is_satisfied_by(&self, value: f64) -> bool {
        self.op.holds(value, self.bound as f64)
    }

    /// Compares a clock valuation against the constraint.
    ///
    /// Returns [`Ordering::Equal`] when the constraint holds. Otherwise the
    /// result says on which side the value lies: [`Ordering::Greater`] when an
    /// upper bound is violated (no later valuation can satisfy it), and
    /// [`Ordering::Less`] when a lower bound is not yet reached.
    pub fn compare(&self, valuation: &[f64]) -> Ordering {
        if self.is_satisfied_by(valuation[self.clock.index()]) {
            Ordering::Equal
        } else if self.op.is_upper() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    /// Returns the same constraint on a clock shifted by `offset`.
    pub fn offset(&self, offset: usize) -> Self {
        Self {
            clock: self.clock.offset(offset),
            ..*self
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.clock, self.op, self.bound)
    }
}

/// Formats a guard as a conjunction, `true` when empty.
pub fn display_guard(guard: &[Constraint]) -> String {
    if guard.is_empty() {
        return "true".to_string();
    }
    guard.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" && ")
}
