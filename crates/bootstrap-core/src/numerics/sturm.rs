//! Real root isolation for univariate polynomials.
//!
//! Roots are counted with a Sturm sequence of the square-free part and
//! separated by bisection of the Cauchy range; nodes outside a requested
//! window are skipped. Each isolating bracket `(lower, upper]` holds
//! exactly one distinct root; an exact rational root found on a bisection
//! point is reported as `lower == upper`. Once a bracket is isolated it is
//! narrowed on the sign of the polynomial alone.

use super::polynomial::{Polynomial, ratio};
use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::One;
use std::cmp::Ordering;

/// Bracket around one distinct real root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedRoot {
    pub lower: BigRational,
    pub upper: BigRational,
    /// False when refinement hit the iteration cap before reaching the
    /// requested width.
    pub converged: bool,
}

impl IsolatedRoot {
    fn exact(value: BigRational) -> Self {
        Self {
            lower: value.clone(),
            upper: value,
            converged: true,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.lower == self.upper
    }

    pub fn midpoint(&self) -> BigRational {
        midpoint(&self.lower, &self.upper)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsolationStats {
    pub sturm_evaluations: usize,
    pub sign_evaluations: usize,
    pub bisection_steps: usize,
    pub unconverged_roots: usize,
}

/// Positive integer multiple of a polynomial. Signs are read with integer
/// Horner steps, so no rational normalization happens per evaluation.
#[derive(Debug, Clone)]
struct ScaledPolynomial {
    coefficients: Vec<BigInt>,
}

impl ScaledPolynomial {
    fn new(polynomial: &Polynomial) -> Self {
        let common = polynomial
            .coefficients()
            .iter()
            .fold(BigInt::one(), |common, coefficient| {
                let cofactor = BigRational::new(common.clone(), coefficient.denom().clone());
                common * cofactor.denom()
            });
        let common = BigRational::from_integer(common);
        Self {
            coefficients: polynomial
                .coefficients()
                .iter()
                .map(|coefficient| (coefficient * &common).to_integer())
                .collect(),
        }
    }

    /// Sign of `den^n * p(num / den)`, which is the sign of `p` since the
    /// denominator of a `BigRational` is positive.
    fn sign_at(&self, x: &BigRational) -> Ordering {
        let Some((leading, rest)) = self.coefficients.split_last() else {
            return Ordering::Equal;
        };
        let (numer, denom) = (x.numer(), x.denom());
        let mut value = leading.clone();
        let mut power = BigInt::one();
        for coefficient in rest.iter().rev() {
            power *= denom;
            value = value * numer + coefficient * &power;
        }
        match value.sign() {
            Sign::Minus => Ordering::Less,
            Sign::NoSign => Ordering::Equal,
            Sign::Plus => Ordering::Greater,
        }
    }
}

/// Sturm chain of a square-free polynomial.
#[derive(Debug, Clone)]
pub struct SturmSequence {
    chain: Vec<Polynomial>,
    scaled: Vec<ScaledPolynomial>,
}

impl SturmSequence {
    pub fn new(square_free: &Polynomial) -> Self {
        let mut chain = vec![square_free.clone()];
        let derivative = square_free.derivative();
        if !derivative.is_zero() {
            chain.push(derivative);
        }

        while chain.len() >= 2 {
            let len = chain.len();
            let Some(degree) = chain[len - 1].degree() else {
                break;
            };
            let (_, remainder) = chain[len - 2].long_division(&chain[len - 1], degree);
            if remainder.is_zero() {
                break;
            }
            chain.push(-remainder);
        }

        let scaled = chain.iter().map(ScaledPolynomial::new).collect();
        Self { chain, scaled }
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.chain[0]
    }

    /// Sign of the first chain member at `x`.
    pub fn sign_at(&self, x: &BigRational) -> Ordering {
        self.scaled[0].sign_at(x)
    }

    /// Sign changes along the chain at `x`, zeros skipped.
    pub fn variations(&self, x: &BigRational) -> usize {
        let mut variations = 0;
        let mut previous: Option<Ordering> = None;
        for member in &self.scaled {
            let sign = member.sign_at(x);
            if sign == Ordering::Equal {
                continue;
            }
            if previous.is_some_and(|last| last != sign) {
                variations += 1;
            }
            previous = Some(sign);
        }
        variations
    }

    /// Distinct roots in the half-open interval `(a, b]`.
    pub fn count_roots(&self, a: &BigRational, b: &BigRational) -> usize {
        self.variations(a).saturating_sub(self.variations(b))
    }
}

pub struct RootIsolator {
    precision: BigRational,
    max_iterations: usize,
    stats: IsolationStats,
}

impl RootIsolator {
    pub fn new(precision: BigRational) -> Self {
        Self {
            precision,
            max_iterations: 2000,
            stats: IsolationStats::default(),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn stats(&self) -> &IsolationStats {
        &self.stats
    }

    /// Distinct real roots in increasing order.
    pub fn isolate(&mut self, polynomial: &Polynomial) -> Vec<IsolatedRoot> {
        let square_free = polynomial.square_free_part();
        let sequence = SturmSequence::new(&square_free);
        let bound = cauchy_bound(&square_free);
        self.isolate_in(&sequence, &-bound.clone(), &bound)
    }

    /// Roots found while bisecting the Cauchy range, skipping every node that
    /// misses `(lower, upper]`. All roots in `(lower, upper]` are reported,
    /// possibly with a few neighbours, and every bracket is the one
    /// [`Self::isolate`] would report for the same root.
    pub fn isolate_in(
        &mut self,
        sequence: &SturmSequence,
        lower: &BigRational,
        upper: &BigRational,
    ) -> Vec<IsolatedRoot> {
        let mut roots = Vec::new();
        if sequence.polynomial().is_constant() || lower >= upper {
            return roots;
        }
        let bound = cauchy_bound(sequence.polynomial());
        let range = (lower, upper);
        self.isolate_between(sequence, -bound.clone(), bound, range, &mut roots);
        roots
    }

    fn isolate_between(
        &mut self,
        sequence: &SturmSequence,
        left: BigRational,
        right: BigRational,
        range: (&BigRational, &BigRational),
        roots: &mut Vec<IsolatedRoot>,
    ) {
        if &left >= range.1 || &right <= range.0 {
            return;
        }
        self.stats.sturm_evaluations += 2;
        match sequence.count_roots(&left, &right) {
            0 => {}
            1 => roots.push(self.refine(sequence, left, right)),
            _ => {
                self.stats.bisection_steps += 1;
                let mid = midpoint(&left, &right);
                self.isolate_between(sequence, left, mid.clone(), range, roots);
                self.isolate_between(sequence, mid, right, range, roots);
            }
        }
    }

    /// Shrinks a bracket `(left, right]` holding exactly one root. The root
    /// is simple, so the polynomial keeps the sign it has at `right` on the
    /// part of the bracket above the root and the opposite sign below it.
    fn refine(
        &mut self,
        sequence: &SturmSequence,
        mut left: BigRational,
        mut right: BigRational,
    ) -> IsolatedRoot {
        self.stats.sign_evaluations += 1;
        let right_sign = sequence.sign_at(&right);
        if right_sign == Ordering::Equal {
            return IsolatedRoot::exact(right);
        }

        let mut iterations = 0;
        while &right - &left > self.precision {
            if iterations >= self.max_iterations {
                self.stats.unconverged_roots += 1;
                return IsolatedRoot {
                    lower: left,
                    upper: right,
                    converged: false,
                };
            }
            iterations += 1;
            self.stats.bisection_steps += 1;
            self.stats.sign_evaluations += 1;

            let mid = midpoint(&left, &right);
            match sequence.sign_at(&mid) {
                Ordering::Equal => return IsolatedRoot::exact(mid),
                sign if sign == right_sign => right = mid,
                _ => left = mid,
            }
        }

        IsolatedRoot {
            lower: left,
            upper: right,
            converged: true,
        }
    }
}

/// Integer Cauchy bound: every real root lies strictly inside
/// `(-bound, bound)`.
pub fn cauchy_bound(polynomial: &Polynomial) -> BigRational {
    polynomial.root_bound().ceil()
}

pub fn midpoint(a: &BigRational, b: &BigRational) -> BigRational {
    (a + b) * ratio(1, 2)
}
