//! Alur–Dill regions.
//!
//! A [`Region`] abstracts a clock valuation by the integer part of every clock
//! (exact, or strictly between two integers) together with the order of the
//! fractional parts of the non-integral clocks. Clocks above their max
//! constant collapse into a single "above max" class, which makes the set of
//! regions finite.
//!
//! # Examples
//!
//! Enumerating the time successors of the zero region of one clock with max
//! constant 1 visits `x=0`, `0<x<1`, `x=1` and `x>1`:
//!
//! ```
//! use timed_pattern::region::Region;
//!
//! let mut region = Region::zero(&[1]);
//! let mut chain = vec![region.to_string()];
//! while region.next_region() {
//!     chain.push(region.to_string());
//! }
//! assert_eq!(chain, ["x0=0", "0<x0<1 | {x0}", "x0=1", "x0>1"]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::rc::Rc;

use num_bigint::BigUint;

use crate::abstraction::{Abstraction, Admission};
use crate::automaton::TimedAutomaton;
use crate::types::{Clock, Constraint};

/// Integer part of a clock value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum IntegerPart {
    /// The clock equals `k`.
    Exact(i64),
    /// The clock lies in the open interval `(k, k + 1)`, or above the max
    /// constant when `k` is the max constant.
    Between(i64),
}

impl IntegerPart {
    /// Representative value of the class.
    pub fn midpoint(self) -> f64 {
        match self {
            IntegerPart::Exact(k) => k as f64,
            IntegerPart::Between(k) => k as f64 + 0.5,
        }
    }
}

/// Canonical value identifying a region.
pub type RegionKey = (Vec<IntegerPart>, Vec<Vec<usize>>);

/// A clock region.
///
/// # Invariants
///
/// - `frac_order` lists exactly the clocks in `Between(k)` with `k` below their max
///   constant, each once, grouped by equal fractional part
/// - groups are ordered by increasing fractional part
#[derive(Debug, Clone)]
pub struct Region {
    integer_parts: Vec<IntegerPart>,
    frac_order: Vec<Vec<usize>>,
    max_constants: Rc<[i64]>,
}

impl Region {
    /// The region of the all-zero valuation.
    pub fn zero(max_constants: &[i64]) -> Self {
        Self {
            integer_parts: vec![IntegerPart::Exact(0); max_constants.len()],
            frac_order: Vec::new(),
            max_constants: max_constants.into(),
        }
    }

    pub fn num_clocks(&self) -> usize {
        self.integer_parts.len()
    }

    pub fn integer_parts(&self) -> &[IntegerPart] {
        &self.integer_parts
    }

    /// Groups of clocks with equal fractional part, smallest first.
    pub fn frac_order(&self) -> &[Vec<usize>] {
        &self.frac_order
    }

    pub fn max_constants(&self) -> &[i64] {
        &self.max_constants
    }

    /// A region is its own immediate time successor iff no clock is integral.
    pub fn is_self_successor(&self) -> bool {
        self.integer_parts.iter().all(|p| matches!(p, IntegerPart::Between(_)))
    }

    /// Moves to the next region in time order.
    ///
    /// Returns `false` (leaving the region untouched) if every clock is
    /// already above its max constant.
    pub fn next_region(&mut self) -> bool {
        let mut self_successor = true;
        let mut fresh = Vec::new();
        for (x, part) in self.integer_parts.iter_mut().enumerate() {
            if let IntegerPart::Exact(k) = *part {
                *part = IntegerPart::Between(k);
                self_successor = false;
                if k < self.max_constants[x] {
                    fresh.push(x);
                }
            }
        }

        if self_successor {
            let Some(group) = self.frac_order.pop() else {
                return false;
            };
            for x in group {
                if let IntegerPart::Between(k) = self.integer_parts[x] {
                    self.integer_parts[x] = IntegerPart::Exact(k + 1);
                }
            }
        } else if !fresh.is_empty() {
            self.frac_order.insert(0, fresh);
        }
        true
    }

    /// Representative clock valuation: the midpoint of every integer class.
    pub fn valuation(&self) -> Vec<f64> {
        self.integer_parts.iter().map(|p| p.midpoint()).collect()
    }

    /// Sets the given clocks to zero.
    pub fn reset_clocks(&mut self, clocks: &[Clock]) {
        for &clock in clocks {
            let x = clock.index();
            self.integer_parts[x] = IntegerPart::Exact(0);
            for group in self.frac_order.iter_mut() {
                group.retain(|&y| y != x);
            }
        }
        self.frac_order.retain(|g| !g.is_empty());
    }

    pub fn key(&self) -> RegionKey {
        (self.integer_parts.clone(), self.frac_order.clone())
    }

    /// Restricts the region to the clocks in `clocks`, renumbered from 0.
    pub fn project(&self, clocks: Range<usize>) -> Self {
        let frac_order = self
            .frac_order
            .iter()
            .map(|g| g.iter().filter(|&&x| clocks.contains(&x)).map(|&x| x - clocks.start).collect::<Vec<_>>())
            .filter(|g| !g.is_empty())
            .collect();
        Self {
            integer_parts: self.integer_parts[clocks.clone()].to_vec(),
            frac_order,
            max_constants: Rc::from(&self.max_constants[clocks]),
        }
    }

    /// Lists every region over the given max constants.
    pub fn enumerate_all(max_constants: &[i64]) -> Vec<Region> {
        let shared: Rc<[i64]> = max_constants.into();
        let mut result = Vec::new();
        for parts in integer_classes(max_constants) {
            let fractional: Vec<usize> = parts
                .iter()
                .enumerate()
                .filter(|&(x, p)| matches!(p, IntegerPart::Between(k) if *k < max_constants[x]))
                .map(|(x, _)| x)
                .collect();
            for frac_order in ordered_partitions(&fractional) {
                result.push(Region {
                    integer_parts: parts.clone(),
                    frac_order,
                    max_constants: shared.clone(),
                });
            }
        }
        result
    }

    /// Counts the regions over the given max constants without enumerating them.
    ///
    /// Clock `x` has `c_x + 2` integral classes (`0..=c_x` and "above") and
    /// `c_x` open unit intervals; every choice with `j` fractional clocks
    /// admits `Fubini(j)` orderings of their fractional parts.
    pub fn space_size(max_constants: &[i64]) -> BigUint {
        // poly[j]: number of integer-part choices with exactly j fractional clocks
        let mut poly: Vec<BigUint> = vec![BigUint::from(1u32)];
        for &c in max_constants {
            let c = c.max(0) as u64;
            let mut next = vec![BigUint::from(0u32); poly.len() + 1];
            for (j, coef) in poly.iter().enumerate() {
                next[j] += coef * BigUint::from(c + 2);
                next[j + 1] += coef * BigUint::from(c);
            }
            poly = next;
        }
        let fubini = fubini_numbers(poly.len());
        poly.iter().zip(fubini.iter()).map(|(a, b)| a * b).sum()
    }
}

/// All combinations of per-clock integer classes.
fn integer_classes(max_constants: &[i64]) -> Vec<Vec<IntegerPart>> {
    let mut result = vec![Vec::new()];
    for &c in max_constants {
        let mut next = Vec::new();
        for prefix in &result {
            for k in 0..=c {
                for part in [IntegerPart::Exact(k), IntegerPart::Between(k)] {
                    let mut parts = prefix.clone();
                    parts.push(part);
                    next.push(parts);
                }
            }
        }
        result = next;
    }
    result
}

/// All ordered set partitions of `items`.
fn ordered_partitions(items: &[usize]) -> Vec<Vec<Vec<usize>>> {
    let Some((&first, rest)) = items.split_first() else {
        return vec![Vec::new()];
    };
    let mut result = Vec::new();
    for partition in ordered_partitions(rest) {
        for i in 0..partition.len() {
            let mut p = partition.clone();
            p[i].insert(0, first);
            result.push(p);
        }
        for i in 0..=partition.len() {
            let mut p = partition.clone();
            p.insert(i, vec![first]);
            result.push(p);
        }
    }
    result
}

/// Fubini numbers (ordered Bell numbers) `a(0), ..., a(n - 1)`.
fn fubini_numbers(n: usize) -> Vec<BigUint> {
    let mut a: Vec<BigUint> = Vec::with_capacity(n);
    for m in 0..n {
        if m == 0 {
            a.push(BigUint::from(1u32));
            continue;
        }
        // a(m) = sum_{k=1}^{m} C(m, k) a(m - k)
        let mut binom = BigUint::from(1u32);
        let mut total = BigUint::from(0u32);
        for k in 1..=m {
            binom = binom * BigUint::from((m - k + 1) as u64) / BigUint::from(k as u64);
            total += &binom * &a[m - k];
        }
        a.push(total);
    }
    a
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.integer_parts == other.integer_parts && self.frac_order == other.frac_order
    }
}

impl Eq for Region {}

impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.integer_parts.hash(state);
        self.frac_order.hash(state);
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .integer_parts
            .iter()
            .enumerate()
            .map(|(x, p)| match *p {
                IntegerPart::Exact(k) => format!("x{}={}", x, k),
                IntegerPart::Between(k) if k >= self.max_constants[x] => format!("x{}>{}", x, k),
                IntegerPart::Between(k) => format!("{}<x{}<{}", k, x, k + 1),
            })
            .collect();
        write!(f, "{}", parts.join(", "))?;
        if !self.frac_order.is_empty() {
            let groups: Vec<String> = self
                .frac_order
                .iter()
                .map(|g| {
                    let clocks: Vec<String> = g.iter().map(|x| format!("x{}", x)).collect();
                    format!("{{{}}}", clocks.join(", "))
                })
                .collect();
            write!(f, " | {}", groups.join(" < "))?;
        }
        Ok(())
    }
}

/// Time successors of a region, in increasing order.
///
/// The sequence starts at the region itself when it is its own successor,
/// and at its strict successor otherwise.
pub struct RegionDelays {
    current: Option<Region>,
}

impl Iterator for RegionDelays {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        let region = self.current.take()?;
        let mut successor = region.clone();
        if successor.next_region() {
            self.current = Some(successor);
        }
        Some(region)
    }
}

impl Abstraction for Region {
    type Key = RegionKey;
    type Delays = RegionDelays;

    fn initial(ta: &TimedAutomaton) -> Self {
        Region::zero(ta.max_constants())
    }

    fn num_clocks(&self) -> usize {
        self.integer_parts.len()
    }

    fn delays(&self) -> RegionDelays {
        let mut start = self.clone();
        if !self.is_self_successor() {
            start.next_region();
        }
        RegionDelays { current: Some(start) }
    }

    fn admits(&self, guard: &[Constraint]) -> Admission<Self> {
        use std::cmp::Ordering;

        let valuation = self.valuation();
        let mut pending = false;
        for constraint in guard {
            match constraint.compare(&valuation) {
                Ordering::Greater => return Admission::Exhausted,
                Ordering::Less => pending = true,
                Ordering::Equal => {}
            }
        }
        if pending {
            Admission::Pending
        } else {
            Admission::Admitted(self.clone())
        }
    }

    fn reset(&mut self, clocks: &[Clock]) {
        self.reset_clocks(clocks);
    }

    fn normalize(&mut self) {}

    fn key(&self) -> RegionKey {
        Region::key(self)
    }

    fn is_satisfiable(&self) -> bool {
        true
    }

    fn project(&self, clocks: Range<usize>) -> Self {
        Region::project(self, clocks)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use test_log::test;

    fn chain(max_constants: &[i64]) -> Vec<Region> {
        let mut region = Region::zero(max_constants);
        let mut result = vec![region.clone()];
        while region.next_region() {
            result.push(region.clone());
        }
        result
    }

    #[test]
    fn test_no_clocks() {
        let mut region = Region::zero(&[]);
        assert!(region.is_self_successor());
        assert!(!region.next_region());
        assert_eq!(region.delays().count(), 1);
    }

    #[test]
    fn test_single_clock_chain() {
        for c in 0..5 {
            let regions = chain(&[c]);
            assert_eq!(regions.len() as i64, 2 * c + 2);
            let keys: HashSet<_> = regions.iter().map(|r| r.key()).collect();
            assert_eq!(keys.len(), regions.len());
            for w in regions.windows(2) {
                assert!(w[0].valuation()[0] < w[1].valuation()[0]);
            }
        }
    }

    #[test]
    fn test_two_clock_chain() {
        let regions = chain(&[2, 1]);
        for r in &regions {
            println!("{}", r);
        }
        let shown: Vec<String> = regions.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            shown,
            [
                "x0=0, x1=0",
                "0<x0<1, 0<x1<1 | {x0, x1}",
                "x0=1, x1=1",
                "1<x0<2, x1>1 | {x0}",
                "x0=2, x1>1",
                "x0>2, x1>1",
            ]
        );

        // Every region on the chain is a genuine region of the space.
        let all: HashSet<Region> = Region::enumerate_all(&[2, 1]).into_iter().collect();
        assert!(regions.iter().all(|r| all.contains(r)));
    }

    #[test]
    fn test_chain_is_increasing() {
        let regions = chain(&[3, 2, 1]);
        for w in regions.windows(2) {
            let a = w[0].valuation();
            let b = w[1].valuation();
            assert!(a.iter().zip(&b).all(|(x, y)| x <= y));
            assert!(a != b || w[0].frac_order() != w[1].frac_order());
        }
        let last = regions.last().unwrap();
        assert!(last.is_self_successor());
        assert!(last.frac_order().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut region = Region::zero(&[2, 2, 2]);
        region.next_region();
        assert_eq!(region.frac_order(), &[vec![0, 1, 2]]);
        region.reset_clocks(&[Clock::new(1)]);
        assert_eq!(region.integer_parts()[1], IntegerPart::Exact(0));
        assert_eq!(region.frac_order(), &[vec![0, 2]]);
        region.reset_clocks(&[Clock::new(0), Clock::new(2)]);
        assert!(region.frac_order().is_empty());
        assert_eq!(region, Region::zero(&[2, 2, 2]));
    }

    #[test]
    fn test_project() {
        let mut region = Region::zero(&[1, 1, 2, 2]);
        region.next_region();
        region.reset_clocks(&[Clock::new(1)]);
        region.next_region();
        // x1 is now the smallest fractional part
        assert_eq!(region.frac_order(), &[vec![1], vec![0, 2, 3]]);

        let low = region.project(0..2);
        assert_eq!(low.num_clocks(), 2);
        assert_eq!(low.frac_order(), &[vec![1], vec![0]]);
        assert_eq!(low.max_constants(), &[1, 1]);

        let high = region.project(2..4);
        assert_eq!(high.frac_order(), &[vec![0, 1]]);
        assert_eq!(high.max_constants(), &[2, 2]);
    }

    #[test]
    fn test_admits() {
        let region = Region::zero(&[1]);
        let delays: Vec<Region> = region.delays().collect();
        assert_eq!(delays.len(), 3); // 0<x<1, x=1, x>1

        let guard = [Constraint::lt(0, 1)];
        assert!(matches!(delays[0].admits(&guard), Admission::Admitted(_)));
        assert!(matches!(delays[1].admits(&guard), Admission::Exhausted));

        let guard = [Constraint::ge(0, 1)];
        assert!(matches!(delays[0].admits(&guard), Admission::Pending));
        assert!(matches!(delays[1].admits(&guard), Admission::Admitted(_)));
    }

    #[test]
    fn test_enumerate_all_matches_space_size() {
        let cases: [(&[i64], u32); 7] =
            [(&[], 1), (&[1], 4), (&[3], 8), (&[1, 1], 18), (&[1, 2], 28), (&[2, 2], 44), (&[1, 1, 1], 94)];
        for (max_constants, expected) in cases {
            let all = Region::enumerate_all(max_constants);
            let distinct: HashSet<_> = all.iter().map(|r| r.key()).collect();
            assert_eq!(all.len(), distinct.len());
            assert_eq!(all.len() as u32, expected, "max constants {:?}", max_constants);
            assert_eq!(Region::space_size(max_constants), BigUint::from(expected));
        }
    }

    #[test]
    fn test_space_size_grows() {
        let small = Region::space_size(&[10, 10]);
        let large = Region::space_size(&[10, 10, 80]);
        println!("regions: {} -> {}", small, large);
        assert!(large > small);
    }

    #[test]
    fn test_fubini_numbers() {
        let a = fubini_numbers(6);
        let expected: Vec<BigUint> = [1u32, 1, 3, 13, 75, 541].iter().map(|&x| BigUint::from(x)).collect();
        assert_eq!(a, expected);
    }
}
