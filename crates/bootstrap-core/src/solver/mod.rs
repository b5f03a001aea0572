//! Sign conditions on one-variable polynomials and rational functions.

mod sign_chart;

pub use sign_chart::SturmSolver;

use crate::domain::BootstrapResult;
use crate::numerics::Polynomial;
use crate::region::{Interval, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Relation {
    /// `expr >= 0`
    #[default]
    NonNegative,
    /// `expr > 0`
    Positive,
}

impl Relation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonNegative => ">=",
            Self::Positive => ">",
        }
    }
}

/// The shapes a solver may hand back. A connected solution can come back as a
/// single interval, a disconnected one as a plain list or as a region.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutput {
    Interval(Interval),
    Intervals(Vec<Interval>),
    Union(Region),
}

impl SolverOutput {
    pub fn into_region(self) -> Region {
        match self {
            Self::Interval(interval) => interval.into(),
            Self::Intervals(intervals) => Region::from_intervals(intervals),
            Self::Union(region) => region,
        }
    }

    /// Shape a list of pieces the way a solver reports it.
    pub fn from_pieces(pieces: Vec<Interval>) -> Self {
        match pieces.len() {
            0 => Self::Intervals(pieces),
            1 => Self::Interval(pieces[0]),
            _ => Self::Union(Region::from_intervals(pieces)),
        }
    }
}

impl From<SolverOutput> for Region {
    fn from(output: SolverOutput) -> Self {
        output.into_region()
    }
}

pub trait InequalitySolver {
    /// Solution set of `polynomial relation 0` inside `window`.
    fn solve_polynomial_within(
        &self,
        polynomial: &Polynomial,
        relation: Relation,
        window: &Interval,
    ) -> BootstrapResult<SolverOutput>;

    /// Solution set of `numerator / denominator relation 0` inside `window`.
    fn solve_rational_within(
        &self,
        numerator: &Polynomial,
        denominator: &Polynomial,
        relation: Relation,
        window: &Interval,
    ) -> BootstrapResult<SolverOutput>;

    fn solve_polynomial(
        &self,
        polynomial: &Polynomial,
        relation: Relation,
    ) -> BootstrapResult<SolverOutput> {
        self.solve_polynomial_within(polynomial, relation, &Interval::real_line())
    }

    fn solve_rational(
        &self,
        numerator: &Polynomial,
        denominator: &Polynomial,
        relation: Relation,
    ) -> BootstrapResult<SolverOutput> {
        self.solve_rational_within(numerator, denominator, relation, &Interval::real_line())
    }
}
