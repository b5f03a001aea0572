use super::{InequalitySolver, Relation, SolverOutput};
use crate::domain::{BootstrapError, BootstrapResult};
use crate::numerics::sturm::{cauchy_bound, midpoint};
use crate::numerics::{
    IsolatedRoot, Polynomial, RationalFunction, RootIsolator, SturmSequence, rational,
    rational_from_f64,
};
use crate::region::Interval;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;
use tracing::debug;

const DEFAULT_MAX_ITERATIONS: usize = 2000;

/// Exact sign-chart solver.
///
/// Critical points are the distinct real roots of the numerator and of the
/// denominator, searched for in a rational range just wider than the
/// requested window. Each root is bracketed to `precision`; the sign of the
/// expression is then read off at one rational sample point per gap. Closed
/// ends are reported on the outer side of their bracket and rounded outward
/// to `f64`, so the result always contains the exact solution set.
#[derive(Debug, Clone)]
pub struct SturmSolver {
    precision: BigRational,
    max_iterations: usize,
}

#[derive(Debug, Clone)]
struct CriticalPoint {
    root: IsolatedRoot,
    pole: bool,
    lower: f64,
    upper: f64,
    center: f64,
}

impl SturmSolver {
    pub fn new(precision: f64) -> BootstrapResult<Self> {
        if !precision.is_finite() || precision <= 0.0 {
            return Err(BootstrapError::input_validation(
                "INPUT.ROOT_PRECISION",
                format!("root precision must be a positive finite number, got {precision}"),
            ));
        }
        Ok(Self {
            precision: rational_from_f64(precision)?,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn sign_chart(
        &self,
        numerator: &Polynomial,
        denominator: &Polynomial,
        relation: Relation,
        window: &Interval,
    ) -> BootstrapResult<Vec<Interval>> {
        let critical = if numerator.is_zero() {
            denominator.clone()
        } else {
            numerator * denominator
        };
        let sequence = SturmSequence::new(&critical.square_free_part());
        let (lower, upper) = search_range(sequence.polynomial(), window)?;

        let mut isolator =
            RootIsolator::new(self.precision.clone()).with_max_iterations(self.max_iterations);
        let roots = isolator.isolate_in(&sequence, &lower, &upper);
        let stats = isolator.stats();
        debug!(
            window = %window,
            roots = roots.len(),
            sturm_evaluations = stats.sturm_evaluations,
            sign_evaluations = stats.sign_evaluations,
            bisection_steps = stats.bisection_steps,
            unconverged = stats.unconverged_roots,
            "isolated critical points"
        );

        let poles = (!denominator.is_constant())
            .then(|| SturmSequence::new(&denominator.square_free_part()));

        let points = roots
            .into_iter()
            .map(|root| {
                let pole = match &poles {
                    None => false,
                    Some(_) if root.is_exact() => denominator.evaluate(&root.lower).is_zero(),
                    Some(poles) => poles.count_roots(&root.lower, &root.upper) > 0,
                };
                Ok(CriticalPoint {
                    lower: round_down(&root.lower)?,
                    upper: round_up(&root.upper)?,
                    center: to_f64(&root.midpoint())?,
                    root,
                    pole,
                })
            })
            .collect::<BootstrapResult<Vec<_>>>()?;

        let gap_holds = |sample: &BigRational| {
            let value = numerator.evaluate(sample) * denominator.evaluate(sample);
            match relation {
                Relation::NonNegative => value >= BigRational::zero(),
                Relation::Positive => value > BigRational::zero(),
            }
        };
        let included = |point: &CriticalPoint| !point.pole && relation == Relation::NonNegative;

        let gaps: Vec<bool> = match (points.first(), points.last()) {
            (Some(first), Some(last)) => {
                let mut gaps = Vec::with_capacity(points.len() + 1);
                gaps.push(gap_holds(&sample_below(&sequence, &first.root)));
                for pair in points.windows(2) {
                    gaps.push(gap_holds(&sample_between(&sequence, &pair[0].root, &pair[1].root)));
                }
                gaps.push(gap_holds(&sample_above(&sequence, &last.root)));
                gaps
            }
            _ => vec![gap_holds(&sample_without_roots(&lower, &upper))],
        };

        let mut pieces = Vec::new();
        for (index, holds) in gaps.iter().enumerate() {
            if !holds {
                continue;
            }
            let (lower, lower_open) = match index.checked_sub(1).map(|left| &points[left]) {
                None => (f64::NEG_INFINITY, true),
                Some(point) if included(point) => (point.lower, false),
                Some(point) => (point.center, true),
            };
            let (upper, upper_open) = match points.get(index) {
                None => (f64::INFINITY, true),
                Some(point) if included(point) => (point.upper, false),
                Some(point) => (point.center, true),
            };
            pieces.extend(Interval::new(lower, upper, lower_open, upper_open));
        }

        for (index, point) in points.iter().enumerate() {
            if included(point) && !gaps[index] && !gaps[index + 1] {
                pieces.extend(Interval::closed(point.lower, point.upper));
            }
        }

        Ok(pieces
            .into_iter()
            .filter_map(|piece| piece.intersect(window))
            .collect())
    }
}

impl InequalitySolver for SturmSolver {
    fn solve_polynomial_within(
        &self,
        polynomial: &Polynomial,
        relation: Relation,
        window: &Interval,
    ) -> BootstrapResult<SolverOutput> {
        let pieces = self.sign_chart(polynomial, &Polynomial::one(), relation, window)?;
        Ok(SolverOutput::from_pieces(pieces))
    }

    fn solve_rational_within(
        &self,
        numerator: &Polynomial,
        denominator: &Polynomial,
        relation: Relation,
        window: &Interval,
    ) -> BootstrapResult<SolverOutput> {
        if denominator.is_zero() {
            return Err(BootstrapError::computation(
                "RUN.ZERO_DENOMINATOR",
                format!("rational inequality '{numerator} / 0 {} 0' is undefined", relation.as_str()),
            ));
        }
        let (numerator, denominator) =
            RationalFunction::new(numerator.clone(), denominator.clone())?.into_parts();
        let pieces = self.sign_chart(&numerator, &denominator, relation, window)?;
        Ok(SolverOutput::from_pieces(pieces))
    }
}

/// Rational range `(lower, upper]` covering `window` with a margin of one,
/// clipped to the Cauchy bound.
fn search_range(
    polynomial: &Polynomial,
    window: &Interval,
) -> BootstrapResult<(BigRational, BigRational)> {
    let bound = cauchy_bound(polynomial);
    let mut lower = -bound.clone();
    if window.lower().is_finite() {
        lower = lower.max(rational_from_f64(window.lower())? - rational(1));
    }
    let mut upper = bound;
    if window.upper().is_finite() {
        upper = upper.min(rational_from_f64(window.upper())? + rational(1));
    }
    Ok((lower, upper))
}

/// A rational below the first isolated root with no root in between.
fn sample_below(sequence: &SturmSequence, first: &IsolatedRoot) -> BigRational {
    if !first.is_exact() {
        // Only a pruned neighbour can sit on the lower end.
        if sequence.sign_at(&first.lower) != Ordering::Equal {
            return first.lower.clone();
        }
        return first_gap_above(sequence, &first.lower, &first.upper);
    }
    let root = &first.lower;
    let mut candidate = root - rational(1);
    loop {
        if sequence.sign_at(&candidate) != Ordering::Equal
            && sequence.count_roots(&candidate, root) == 1
        {
            return candidate;
        }
        candidate = midpoint(&candidate, root);
    }
}

/// A rational above the last isolated root with no root in between.
fn sample_above(sequence: &SturmSequence, last: &IsolatedRoot) -> BigRational {
    if last.is_exact() {
        first_gap_above(sequence, &last.upper, &(&last.upper + rational(1)))
    } else {
        last.upper.clone()
    }
}

fn sample_without_roots(lower: &BigRational, upper: &BigRational) -> BigRational {
    if lower < upper {
        return midpoint(lower, upper);
    }
    // The window lies entirely beyond the Cauchy bound on one side.
    if *lower > BigRational::zero() {
        lower.clone()
    } else {
        upper.clone()
    }
}

/// A rational strictly between two consecutive isolated roots.
fn sample_between(
    sequence: &SturmSequence,
    left: &IsolatedRoot,
    right: &IsolatedRoot,
) -> BigRational {
    // The upper end of an inexact bracket is never itself a root.
    if left.is_exact() {
        first_gap_above(sequence, &left.upper, &right.upper)
    } else {
        left.upper.clone()
    }
}

/// Halves `(anchor, high]` toward `anchor` until it holds no root.
fn first_gap_above(sequence: &SturmSequence, anchor: &BigRational, high: &BigRational) -> BigRational {
    let mut candidate = midpoint(anchor, high);
    while sequence.count_roots(anchor, &candidate) > 0 {
        candidate = midpoint(anchor, &candidate);
    }
    candidate
}

fn to_f64(value: &BigRational) -> BootstrapResult<f64> {
    value
        .to_f64()
        .filter(|converted| converted.is_finite())
        .ok_or_else(|| {
            BootstrapError::computation(
                "RUN.ROOT_CONVERSION",
                format!("root bracket end {value} is outside the f64 range"),
            )
        })
}

/// Largest `f64` not above `value`.
fn round_down(value: &BigRational) -> BootstrapResult<f64> {
    let nearest = to_f64(value)?;
    Ok(if rational_from_f64(nearest)? > *value {
        nearest.next_down()
    } else {
        nearest
    })
}

/// Smallest `f64` not below `value`.
fn round_up(value: &BigRational) -> BootstrapResult<f64> {
    let nearest = to_f64(value)?;
    Ok(if rational_from_f64(nearest)? < *value {
        nearest.next_up()
    } else {
        nearest
    })
}
