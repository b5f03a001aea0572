//! Real intervals and finite unions of them.

mod bound;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Non-empty real interval. Infinite ends are always open.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "IntervalRecord", into = "IntervalRecord")]
pub struct Interval {
    lower: f64,
    upper: f64,
    lower_open: bool,
    upper_open: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct IntervalRecord {
    #[serde(with = "bound")]
    lower: f64,
    #[serde(with = "bound")]
    upper: f64,
    #[serde(default)]
    lower_open: bool,
    #[serde(default)]
    upper_open: bool,
}

impl TryFrom<IntervalRecord> for Interval {
    type Error = String;

    fn try_from(record: IntervalRecord) -> Result<Self, Self::Error> {
        Interval::new(
            record.lower,
            record.upper,
            record.lower_open,
            record.upper_open,
        )
        .ok_or_else(|| {
            format!(
                "interval with bounds {} and {} is empty",
                record.lower, record.upper
            )
        })
    }
}

impl From<Interval> for IntervalRecord {
    fn from(interval: Interval) -> Self {
        Self {
            lower: interval.lower,
            upper: interval.upper,
            lower_open: interval.lower_open,
            upper_open: interval.upper_open,
        }
    }
}

impl Interval {
    /// `None` when the bounds describe an empty set or are NaN.
    pub fn new(lower: f64, upper: f64, lower_open: bool, upper_open: bool) -> Option<Self> {
        if lower.is_nan() || upper.is_nan() || lower == f64::INFINITY || upper == f64::NEG_INFINITY
        {
            return None;
        }
        let lower_open = lower_open || lower.is_infinite();
        let upper_open = upper_open || upper.is_infinite();
        match lower.partial_cmp(&upper) {
            Some(Ordering::Less) => {}
            Some(Ordering::Equal) if !lower_open && !upper_open => {}
            _ => return None,
        }
        Some(Self {
            lower,
            upper,
            lower_open,
            upper_open,
        })
    }

    pub fn closed(lower: f64, upper: f64) -> Option<Self> {
        Self::new(lower, upper, false, false)
    }

    pub fn open(lower: f64, upper: f64) -> Option<Self> {
        Self::new(lower, upper, true, true)
    }

    pub fn point(value: f64) -> Option<Self> {
        Self::closed(value, value)
    }

    /// `[lower, +inf)`
    pub fn at_least(lower: f64) -> Option<Self> {
        Self::new(lower, f64::INFINITY, false, true)
    }

    pub fn real_line() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            lower_open: true,
            upper_open: true,
        }
    }

    pub fn non_negative() -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
            lower_open: false,
            upper_open: true,
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn lower_open(&self) -> bool {
        self.lower_open
    }

    pub fn upper_open(&self) -> bool {
        self.upper_open
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    pub fn midpoint(&self) -> Option<f64> {
        self.is_bounded().then(|| 0.5 * (self.lower + self.upper))
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = if self.lower_open {
            value > self.lower
        } else {
            value >= self.lower
        };
        let below = if self.upper_open {
            value < self.upper
        } else {
            value <= self.upper
        };
        above && below
    }

    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let (lower, lower_open) = tighter_lower(self, other);
        let (upper, upper_open) = tighter_upper(self, other);
        Self::new(lower, upper, lower_open, upper_open)
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        let lower_ok = self.lower > other.lower
            || (self.lower == other.lower && (self.lower_open || !other.lower_open));
        let upper_ok = self.upper < other.upper
            || (self.upper == other.upper && (self.upper_open || !other.upper_open));
        lower_ok && upper_ok
    }

    /// Whether `self ∪ next` is a single interval, given `self.lower <= next.lower`.
    fn joins(&self, next: &Self) -> bool {
        next.lower < self.upper
            || (next.lower == self.upper && !(self.upper_open && next.lower_open))
    }

    fn hull(&self, other: &Self) -> Self {
        let (lower, lower_open) = looser_lower(self, other);
        let (upper, upper_open) = looser_upper(self, other);
        Self {
            lower,
            upper,
            lower_open,
            upper_open,
        }
    }

    fn lower_ordering(&self, other: &Self) -> Ordering {
        self.lower
            .total_cmp(&other.lower)
            .then(self.lower_open.cmp(&other.lower_open))
    }
}

fn tighter_lower(a: &Interval, b: &Interval) -> (f64, bool) {
    match a.lower.total_cmp(&b.lower) {
        Ordering::Greater => (a.lower, a.lower_open),
        Ordering::Less => (b.lower, b.lower_open),
        Ordering::Equal => (a.lower, a.lower_open || b.lower_open),
    }
}

fn tighter_upper(a: &Interval, b: &Interval) -> (f64, bool) {
    match a.upper.total_cmp(&b.upper) {
        Ordering::Less => (a.upper, a.upper_open),
        Ordering::Greater => (b.upper, b.upper_open),
        Ordering::Equal => (a.upper, a.upper_open || b.upper_open),
    }
}

fn looser_lower(a: &Interval, b: &Interval) -> (f64, bool) {
    match a.lower.total_cmp(&b.lower) {
        Ordering::Less => (a.lower, a.lower_open),
        Ordering::Greater => (b.lower, b.lower_open),
        Ordering::Equal => (a.lower, a.lower_open && b.lower_open),
    }
}

fn looser_upper(a: &Interval, b: &Interval) -> (f64, bool) {
    match a.upper.total_cmp(&b.upper) {
        Ordering::Greater => (a.upper, a.upper_open),
        Ordering::Less => (b.upper, b.upper_open),
        Ordering::Equal => (a.upper, a.upper_open && b.upper_open),
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_point() {
            return write!(f, "{{{}}}", self.lower);
        }
        let open = if self.lower_open { '(' } else { '[' };
        let close = if self.upper_open { ')' } else { ']' };
        write!(f, "{open}{}, {}{close}", self.lower, self.upper)
    }
}

/// Finite union of disjoint intervals.
///
/// Always normalized: pieces are sorted by lower bound and any two pieces
/// whose union is connected are merged. Structural equality is therefore set
/// equality.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct Region {
    intervals: Vec<Interval>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn real_line() -> Self {
        Interval::real_line().into()
    }

    pub fn non_negative() -> Self {
        Interval::non_negative().into()
    }

    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut sorted: Vec<Interval> = intervals.into_iter().collect();
        sorted.sort_by(Interval::lower_ordering);

        let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
        for interval in sorted {
            if let Some(last) = merged.last_mut() {
                if last.joins(&interval) {
                    *last = last.hull(&interval);
                    continue;
                }
            }
            merged.push(interval);
        }
        Self { intervals: merged }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.intervals.iter().any(|interval| interval.contains(value))
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::from_intervals(self.intervals.iter().chain(other.intervals.iter()).copied())
    }

    pub fn intersect_interval(&self, interval: &Interval) -> Self {
        Self::from_intervals(
            self.intervals
                .iter()
                .filter_map(|piece| piece.intersect(interval)),
        )
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self::from_intervals(other.intervals.iter().flat_map(|interval| {
            self.intervals
                .iter()
                .filter_map(move |piece| piece.intersect(interval))
        }))
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.intervals
            .iter()
            .all(|piece| other.intervals.iter().any(|outer| piece.is_subset_of(outer)))
    }

    /// Smallest interval containing every piece; `None` for the empty region.
    pub fn hull(&self) -> Option<Interval> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(first.hull(last))
    }

    /// Total length; infinite when any piece is unbounded.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(Interval::width).sum()
    }
}

impl From<Interval> for Region {
    fn from(interval: Interval) -> Self {
        Self {
            intervals: vec![interval],
        }
    }
}

impl From<Vec<Interval>> for Region {
    fn from(intervals: Vec<Interval>) -> Self {
        Self::from_intervals(intervals)
    }
}

impl From<Region> for Vec<Interval> {
    fn from(region: Region) -> Self {
        region.intervals
    }
}

impl FromIterator<Interval> for Region {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::from_intervals(iter)
    }
}

impl<'a> IntoIterator for &'a Region {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.intervals.is_empty() {
            return f.write_str("EmptySet");
        }
        for (index, interval) in self.intervals.iter().enumerate() {
            if index > 0 {
                f.write_str(" U ")?;
            }
            write!(f, "{interval}")?;
        }
        Ok(())
    }
}
