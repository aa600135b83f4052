//! Clock zones as difference-bound matrices.
//!
//! A [`Zone`] over `n` clocks is an `(n + 1) × (n + 1)` matrix `D` where
//! `D[i][j]` bounds the difference `x_i - x_j`. Index 0 is the reference clock
//! (constantly zero), clock `x` lives at index `x + 1`. Every entry is a
//! [`DbmBound`]: an integer with a strict/non-strict flag.
//!
//! Operations keep the matrix in canonical form (its own shortest-path
//! closure), so that two equal zones have equal matrices and
//! [`Zone::key`] can be used for deduplication.
//!
//! # Examples
//!
//! ```
//! use timed_pattern::types::Constraint;
//! use timed_pattern::zone::Zone;
//!
//! let mut zone = Zone::zero(1, 1);
//! zone.elapse();
//! zone.constrain(&Constraint::lt(0, 1));
//! assert!(zone.is_satisfiable());
//! assert!(zone.contains(&[0.5]));
//! assert!(!zone.contains(&[1.0]));
//! ```

use std::fmt;
use std::ops::{Add, Range};

use crate::abstraction::{Abstraction, Admission};
use crate::automaton::TimedAutomaton;
use crate::types::{Clock, Comparator, Constraint};

/// A bound `(value, closed)` on a clock difference: `≤ value` or `< value`.
///
/// Bounds are ordered by tightness: `< v` is tighter than `≤ v`, and
/// [`DbmBound::INFINITY`] is the loosest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DbmBound {
    value: i64,
    closed: bool,
}

impl DbmBound {
    /// No bound at all (`< ∞`).
    pub const INFINITY: DbmBound = DbmBound {
        value: i64::MAX,
        closed: false,
    };

    /// `≤ 0`
    pub const ZERO: DbmBound = DbmBound::le(0);

    /// `≤ value`
    pub const fn le(value: i64) -> Self {
        Self { value, closed: true }
    }

    /// `< value`
    pub const fn lt(value: i64) -> Self {
        Self { value, closed: false }
    }

    pub fn value(self) -> i64 {
        self.value
    }

    pub fn is_closed(self) -> bool {
        self.closed
    }

    pub fn is_infinite(self) -> bool {
        self == Self::INFINITY
    }

    /// Checks whether a concrete difference satisfies the bound.
    pub fn admits(self, diff: f64) -> bool {
        if self.is_infinite() {
            return true;
        }
        let value = self.value as f64;
        diff < value || (self.closed && diff == value)
    }
}

impl Add for DbmBound {
    type Output = DbmBound;

    fn add(self, rhs: DbmBound) -> DbmBound {
        if self.is_infinite() || rhs.is_infinite() {
            return DbmBound::INFINITY;
        }
        DbmBound {
            value: self.value + rhs.value,
            closed: self.closed && rhs.closed,
        }
    }
}

impl fmt::Display for DbmBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "<inf")
        } else if self.closed {
            write!(f, "<={}", self.value)
        } else {
            write!(f, "<{}", self.value)
        }
    }
}

/// A clock zone in canonical DBM form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Zone {
    dim: usize,
    matrix: Vec<DbmBound>,
    max_constant: i64,
}

impl Zone {
    /// The zone where all `num_clocks` clocks equal zero.
    ///
    /// `max_constant` is the bound used by [`Zone::abstractize`].
    pub fn zero(num_clocks: usize, max_constant: i64) -> Self {
        let dim = num_clocks + 1;
        Self {
            dim,
            matrix: vec![DbmBound::ZERO; dim * dim],
            max_constant,
        }
    }

    /// A zone with every entry unbounded, except the zero diagonal.
    fn unbounded(num_clocks: usize, max_constant: i64) -> Self {
        let dim = num_clocks + 1;
        let mut zone = Self {
            dim,
            matrix: vec![DbmBound::INFINITY; dim * dim],
            max_constant,
        };
        for i in 0..dim {
            zone.set(i, i, DbmBound::ZERO);
        }
        zone
    }

    pub fn num_clocks(&self) -> usize {
        self.dim - 1
    }

    pub fn max_constant(&self) -> i64 {
        self.max_constant
    }

    /// Bound on `x_i - x_j`, where index 0 is the reference clock.
    pub fn get(&self, i: usize, j: usize) -> DbmBound {
        self.matrix[i * self.dim + j]
    }

    fn set(&mut self, i: usize, j: usize, bound: DbmBound) {
        self.matrix[i * self.dim + j] = bound;
    }

    /// Upper bound of clock `x` (`x - 0`).
    pub fn upper(&self, x: Clock) -> DbmBound {
        self.get(x.index() + 1, 0)
    }

    /// Negated lower bound of clock `x` (`0 - x`).
    pub fn lower(&self, x: Clock) -> DbmBound {
        self.get(0, x.index() + 1)
    }

    /// Lets time elapse: drops every upper bound `x - 0`.
    pub fn elapse(&mut self) {
        for i in 1..self.dim {
            self.set(i, 0, DbmBound::INFINITY);
        }
    }

    /// Intersects with `x_i - x_j ⋈ bound` (DBM indices) and re-canonizes.
    pub fn tighten(&mut self, i: usize, j: usize, bound: DbmBound) {
        if bound < self.get(i, j) {
            self.set(i, j, bound);
        }
        self.canonize();
    }

    /// Intersects with a clock constraint.
    pub fn constrain(&mut self, constraint: &Constraint) {
        let x = constraint.clock.index() + 1;
        let c = constraint.bound;
        match constraint.op {
            Comparator::Lt => self.tighten(x, 0, DbmBound::lt(c)),
            Comparator::Le => self.tighten(x, 0, DbmBound::le(c)),
            Comparator::Gt => self.tighten(0, x, DbmBound::lt(-c)),
            Comparator::Ge => self.tighten(0, x, DbmBound::le(-c)),
        }
    }

    /// Sets clock `x` to zero.
    pub fn reset(&mut self, x: Clock) {
        let x = x.index() + 1;
        for i in 0..self.dim {
            self.set(x, i, DbmBound::ZERO + self.get(0, i));
            self.set(i, x, self.get(i, 0) + DbmBound::ZERO);
        }
        self.set(x, x, DbmBound::ZERO);
    }

    /// Extrapolates with the max constant `M`: bounds above `≤ M` become
    /// infinite, bounds below `< -M` become `< -M`.
    pub fn abstractize(&mut self) {
        let upper = DbmBound::le(self.max_constant);
        let lower = DbmBound::lt(-self.max_constant);
        for i in 0..self.dim {
            for j in 0..self.dim {
                let b = self.get(i, j);
                if i == j || b.is_infinite() {
                    continue;
                }
                if b > upper {
                    self.set(i, j, DbmBound::INFINITY);
                } else if b < lower {
                    self.set(i, j, lower);
                }
            }
        }
    }

    /// Computes the shortest-path closure (Floyd–Warshall).
    pub fn canonize(&mut self) {
        let dim = self.dim;
        for k in 0..dim {
            for i in 0..dim {
                let ik = self.get(i, k);
                if ik.is_infinite() {
                    continue;
                }
                for j in 0..dim {
                    let through = ik + self.get(k, j);
                    if through < self.get(i, j) {
                        self.set(i, j, through);
                    }
                }
            }
        }
    }

    /// A zone is satisfiable iff no clock is constrained to be less than itself.
    pub fn is_satisfiable(&self) -> bool {
        (0..self.dim).all(|i| self.get(i, i) >= DbmBound::ZERO)
    }

    /// Canonical value for deduplication; meaningful after [`Zone::canonize`].
    pub fn key(&self) -> Vec<DbmBound> {
        self.matrix.clone()
    }

    /// Restricts the zone to the clocks in `clocks`, renumbered from 0.
    pub fn project(&self, clocks: Range<usize>) -> Self {
        let indices: Vec<usize> = std::iter::once(0).chain(clocks.map(|x| x + 1)).collect();
        let dim = indices.len();
        let mut matrix = Vec::with_capacity(dim * dim);
        for &i in &indices {
            for &j in &indices {
                matrix.push(self.get(i, j));
            }
        }
        Self {
            dim,
            matrix,
            max_constant: self.max_constant,
        }
    }

    /// Places two zones side by side: the clocks of `first` keep their
    /// indices, the clocks of `second` are shifted after them. No relation
    /// between the two groups is assumed beyond the shared reference clock.
    pub fn embed(first: &Zone, second: &Zone) -> Zone {
        let n1 = first.num_clocks();
        let n2 = second.num_clocks();
        let mut zone = Zone::unbounded(n1 + n2, first.max_constant.max(second.max_constant));
        for i in 0..=n1 {
            for j in 0..=n1 {
                zone.set(i, j, first.get(i, j));
            }
        }
        for i in 1..=n2 {
            for j in 1..=n2 {
                zone.set(n1 + i, n1 + j, second.get(i, j));
            }
            zone.set(0, n1 + i, second.get(0, i));
            zone.set(n1 + i, 0, second.get(i, 0));
        }
        zone.canonize();
        zone
    }

    /// Checks whether a concrete valuation lies in the zone.
    pub fn contains(&self, valuation: &[f64]) -> bool {
        assert_eq!(valuation.len(), self.num_clocks());
        let value = |i: usize| if i == 0 { 0.0 } else { valuation[i - 1] };
        (0..self.dim).all(|i| (0..self.dim).all(|j| self.get(i, j).admits(value(i) - value(j))))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for x in 0..self.num_clocks() {
            let clock = Clock::new(x);
            let lower = self.lower(clock);
            let upper = self.upper(clock);
            let op = if lower.is_closed() { "<=" } else { "<" };
            parts.push(format!("{}{}{}{}", -lower.value(), op, clock, upper));
        }
        for i in 1..self.dim {
            for j in 1..self.dim {
                let b = self.get(i, j);
                if i != j && !b.is_infinite() {
                    parts.push(format!("x{}-x{}{}", i - 1, j - 1, b));
                }
            }
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl Abstraction for Zone {
    type Key = Vec<DbmBound>;
    type Delays = std::iter::Once<Zone>;

    fn initial(ta: &TimedAutomaton) -> Self {
        Zone::zero(ta.num_clocks(), ta.max_constant())
    }

    fn num_clocks(&self) -> usize {
        self.dim - 1
    }

    fn delays(&self) -> Self::Delays {
        let mut elapsed = self.clone();
        elapsed.elapse();
        std::iter::once(elapsed)
    }

    fn admits(&self, guard: &[Constraint]) -> Admission<Self> {
        let mut zone = self.clone();
        for constraint in guard {
            zone.constrain(constraint);
        }
        if zone.is_satisfiable() {
            Admission::Admitted(zone)
        } else {
            Admission::Exhausted
        }
    }

    fn reset(&mut self, clocks: &[Clock]) {
        for &x in clocks {
            Zone::reset(self, x);
        }
    }

    fn normalize(&mut self) {
        self.abstractize();
        self.canonize();
    }

    fn key(&self) -> Self::Key {
        Zone::key(self)
    }

    fn is_satisfiable(&self) -> bool {
        Zone::is_satisfiable(self)
    }

    fn project(&self, clocks: Range<usize>) -> Self {
        Zone::project(self, clocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_order() {
        assert!(DbmBound::lt(3) < DbmBound::le(3));
        assert!(DbmBound::le(3) < DbmBound::lt(4));
        assert!(DbmBound::le(1000) < DbmBound::INFINITY);
        assert_eq!(DbmBound::le(2) + DbmBound::lt(3), DbmBound::lt(5));
        assert_eq!(DbmBound::le(2) + DbmBound::le(-3), DbmBound::le(-1));
        assert_eq!(DbmBound::INFINITY + DbmBound::le(-3), DbmBound::INFINITY);
        assert!(DbmBound::le(1).admits(1.0));
        assert!(!DbmBound::lt(1).admits(1.0));
    }

    #[test]
    fn test_zero() {
        let zone = Zone::zero(2, 1);
        assert!(zone.is_satisfiable());
        assert!(zone.contains(&[0.0, 0.0]));
        assert!(!zone.contains(&[0.5, 0.5]));
    }

    #[test]
    fn test_elapse() {
        let mut zone = Zone::zero(2, 1);
        zone.elapse();
        assert!(zone.contains(&[3.5, 3.5]));
        assert!(!zone.contains(&[1.0, 0.0]));
    }

    #[test]
    fn test_strict_and_weak_guard() {
        let mut strict = Zone::zero(1, 1);
        strict.elapse();
        strict.constrain(&Constraint::lt(0, 1));
        assert_eq!(strict.upper(Clock::new(0)), DbmBound::lt(1));
        assert!(!strict.contains(&[1.0]));

        let mut weak = Zone::zero(1, 1);
        weak.elapse();
        weak.constrain(&Constraint::le(0, 1));
        assert_eq!(weak.upper(Clock::new(0)), DbmBound::le(1));
        assert!(weak.contains(&[1.0]));

        assert_ne!(strict.key(), weak.key());
    }

    #[test]
    fn test_unsatisfiable() {
        let mut zone = Zone::zero(1, 2);
        zone.elapse();
        zone.constrain(&Constraint::gt(0, 2));
        assert!(zone.is_satisfiable());
        zone.constrain(&Constraint::lt(0, 1));
        assert!(!zone.is_satisfiable());

        let mut zone = Zone::zero(1, 1);
        zone.elapse();
        zone.constrain(&Constraint::ge(0, 1));
        zone.constrain(&Constraint::lt(0, 1));
        assert!(!zone.is_satisfiable());
    }

    #[test]
    fn test_reset() {
        let mut zone = Zone::zero(2, 1);
        zone.elapse();
        zone.constrain(&Constraint::ge(0, 1));
        zone.reset(Clock::new(1));
        assert!(zone.contains(&[1.5, 0.0]));
        assert!(!zone.contains(&[1.5, 1.5]));
        assert!(!zone.contains(&[0.5, 0.0]));

        zone.elapse();
        // x0 - x1 >= 1 survives time elapse
        assert!(zone.contains(&[2.5, 1.5]));
        assert!(!zone.contains(&[2.5, 2.0]));
    }

    #[test]
    fn test_abstractize() {
        let build = |c: i64| {
            let mut zone = Zone::zero(1, 2);
            zone.elapse();
            zone.constrain(&Constraint::ge(0, c));
            zone.normalize();
            zone
        };
        let five = build(5);
        let seven = build(7);
        assert_eq!(five.key(), seven.key());
        assert_eq!(five.lower(Clock::new(0)), DbmBound::lt(-2));
        assert!(five.upper(Clock::new(0)).is_infinite());

        // Bounds within the max constant are untouched.
        let two = build(2);
        assert_eq!(two.lower(Clock::new(0)), DbmBound::le(-2));
        assert_ne!(two.key(), five.key());
    }

    #[test]
    fn test_project_and_embed() {
        let mut first = Zone::zero(2, 3);
        first.elapse();
        first.constrain(&Constraint::le(0, 3));
        first.reset(Clock::new(1));

        let mut second = Zone::zero(2, 3);
        second.elapse();
        second.constrain(&Constraint::gt(1, 1));

        let both = Zone::embed(&first, &second);
        assert_eq!(both.num_clocks(), 4);
        assert!(both.is_satisfiable());
        assert_eq!(both.project(0..2).key(), first.key());
        assert_eq!(both.project(2..4).key(), second.key());
        assert!(both.contains(&[2.0, 0.0, 7.0, 7.0]));
        assert!(!both.contains(&[2.0, 0.0, 0.5, 0.5]));
    }

    #[test]
    fn test_admits() {
        let zone = Zone::zero(1, 1);
        let elapsed: Vec<Zone> = zone.delays().collect();
        assert_eq!(elapsed.len(), 1);
        assert!(matches!(elapsed[0].admits(&[Constraint::gt(0, 1)]), Admission::Admitted(_)));
        assert!(matches!(zone.admits(&[Constraint::gt(0, 1)]), Admission::Exhausted));
    }

    #[test]
    fn test_display() {
        let mut zone = Zone::zero(1, 1);
        zone.elapse();
        zone.constrain(&Constraint::lt(0, 1));
        assert_eq!(zone.to_string(), "{0<=x0<1}");
    }
}
