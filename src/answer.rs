//! Answer intervals reported by the matchers.
//!
//! A match is a set of `(t, t')` pairs of start and end times. It is
//! described by three intervals: one on `t`, one on `t'` and one on the
//! duration `t' - t`. Every interval end point carries its own closed flag.

use std::fmt;

use crate::types::Comparator;

/// One end point of an [`Interval`].
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Bound {
    pub value: f64,
    pub closed: bool,
}

impl Bound {
    pub const fn new(value: f64, closed: bool) -> Self {
        Self { value, closed }
    }

    pub const fn closed(value: f64) -> Self {
        Self::new(value, true)
    }

    pub const fn open(value: f64) -> Self {
        Self::new(value, false)
    }

    /// The open bound at `+inf`.
    pub const INFINITY: Self = Self::open(f64::INFINITY);
}

/// An interval of reals with independently open or closed end points.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Interval {
    pub lower: Bound,
    pub upper: Bound,
}

impl Interval {
    /// `[0, inf)`, the interval every duration starts from.
    pub const ANY: Self = Self::new(Bound::closed(0.0), Bound::INFINITY);

    pub const fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    pub const fn new_closed(lower: f64, upper: f64) -> Self {
        Self::new(Bound::closed(lower), Bound::closed(upper))
    }

    /// Intersects the interval with `{ v | v op value }`.
    ///
    /// ```
    /// use timed_pattern::answer::{Bound, Interval};
    /// use timed_pattern::types::Comparator;
    ///
    /// let mut i = Interval::ANY;
    /// i.constrain(Comparator::Lt, 3.0);
    /// i.constrain(Comparator::Le, 3.0);
    /// assert_eq!(i.upper, Bound::open(3.0));
    /// i.constrain(Comparator::Ge, 1.0);
    /// assert_eq!(i.lower, Bound::closed(1.0));
    /// ```
    pub fn constrain(&mut self, op: Comparator, value: f64) {
        let bound = Bound::new(value, op.is_closed());
        if op.is_upper() {
            self.tighten_upper(bound);
        } else {
            self.tighten_lower(bound);
        }
    }

    fn tighten_upper(&mut self, bound: Bound) {
        if self.upper.value > bound.value {
            self.upper = bound;
        } else if self.upper.value == bound.value {
            self.upper.closed &= bound.closed;
        }
    }

    fn tighten_lower(&mut self, bound: Bound) {
        if self.lower.value < bound.value {
            self.lower = bound;
        } else if self.lower.value == bound.value {
            self.lower.closed &= bound.closed;
        }
    }

    pub fn is_empty(&self) -> bool {
        if self.upper.value == self.lower.value {
            !(self.upper.closed && self.lower.closed)
        } else {
            self.upper.value < self.lower.value
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = value > self.lower.value || (value == self.lower.value && self.lower.closed);
        let below = value < self.upper.value || (value == self.upper.value && self.upper.closed);
        above && below
    }

    pub fn intersects(&self, other: &Interval) -> bool {
        let mut both = *self;
        both.tighten_lower(other.lower);
        both.tighten_upper(other.upper);
        !both.is_empty()
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, var: &str) -> fmt::Result {
        let rel = |b: Bound| if b.closed { "<=" } else { "<" };
        write!(
            f,
            "{} {} {} {} {}",
            self.lower.value,
            rel(self.lower),
            var,
            rel(self.upper),
            self.upper.value
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, "x")
    }
}

/// One match: the admissible start times, end times and durations.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Answer {
    pub begin: Interval,
    pub end: Interval,
    pub duration: Interval,
}

impl Answer {
    pub fn is_empty(&self) -> bool {
        self.begin.is_empty() || self.end.is_empty() || self.duration.is_empty()
    }

    /// Total order on answers, usable with [`slice::sort_by`].
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        let lhs = [self.begin, self.end, self.duration];
        let rhs = [other.begin, other.end, other.duration];
        lhs.iter()
            .zip(rhs.iter())
            .map(|(x, y)| {
                x.lower
                    .value
                    .total_cmp(&y.lower.value)
                    .then(x.lower.closed.cmp(&y.lower.closed))
                    .then(x.upper.value.total_cmp(&y.upper.value))
                    .then(x.upper.closed.cmp(&y.upper.closed))
            })
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.begin.write(f, "t")?;
        writeln!(f)?;
        self.end.write(f, "t'")?;
        writeln!(f)?;
        self.duration.write(f, "t' - t")
    }
}

/// Receives the answers of a matcher.
pub trait AnswerSink {
    fn push(&mut self, answer: Answer);

    /// Number of answers received so far.
    fn emitted(&self) -> usize;
}

impl AnswerSink for Vec<Answer> {
    fn push(&mut self, answer: Answer) {
        Vec::push(self, answer);
    }

    fn emitted(&self) -> usize {
        self.len()
    }
}

/// Count-only sink.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AnswerCounter(pub usize);

impl AnswerSink for AnswerCounter {
    fn push(&mut self, _answer: Answer) {
        self.0 += 1;
    }

    fn emitted(&self) -> usize {
        self.0
    }
}

/// Sorts answers into a canonical order, so that two answer sets can be
/// compared as multisets.
pub fn sort_answers(answers: &mut [Answer]) {
    answers.sort_by(Answer::total_cmp);
}
