//! Exact single-variable algebra behind the refinement rounds: polynomials and
//! rational functions over `BigRational`, fraction-free determinants, Sturm
//! root isolation, and a floating-point positivity probe.

pub mod matrix;
pub mod polynomial;
pub mod probe;
pub mod rational;
pub mod sturm;

pub use matrix::{DeterminantError, SymbolicMatrix, bareiss_determinant};
pub use polynomial::{Polynomial, PolynomialError, ratio, rational, rational_from_f64};
pub use probe::{
    DenseMomentMatrix, PositivityProbe, ProbeError, evaluate_moment_matrix,
    leading_principal_minors, probe_positivity,
};
pub use rational::RationalFunction;
pub use sturm::{IsolatedRoot, IsolationStats, RootIsolator, SturmSequence};

use crate::domain::BootstrapError;

impl From<PolynomialError> for BootstrapError {
    fn from(error: PolynomialError) -> Self {
        BootstrapError::computation("RUN.ALGEBRA", error.to_string())
    }
}

impl From<DeterminantError> for BootstrapError {
    fn from(error: DeterminantError) -> Self {
        match error {
            DeterminantError::NonPolynomialEntry { .. } => {
                BootstrapError::computation("RUN.NON_POLYNOMIAL_DETERMINANT", error.to_string())
            }
            DeterminantError::Algebra(error) => error.into(),
        }
    }
}

impl From<ProbeError> for BootstrapError {
    fn from(error: ProbeError) -> Self {
        BootstrapError::computation("RUN.POSITIVITY_PROBE", error.to_string())
    }
}
