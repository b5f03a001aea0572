//! Moment providers: the `<x^s>` sequences whose Hankel submatrices must be
//! positive semidefinite at an eigenvalue.

pub mod coulomb;
pub mod harmonic;

pub use coulomb::{CoulombMoments, CoulombParameters, CoulombVariable};
pub use harmonic::HarmonicMoments;

use crate::domain::{BootstrapError, BootstrapResult};
use crate::numerics::{RationalFunction, SymbolicMatrix, rational_from_f64};
use num_rational::BigRational;
use serde::{Deserialize, Serialize};

pub trait MomentProvider {
    fn name(&self) -> &'static str;

    /// Largest submatrix order the memoized moments cover.
    fn max_order(&self) -> usize;

    /// `moment[0..=2 * (max_order - 1)]`.
    fn moments(&self) -> &[RationalFunction];

    /// Hankel submatrix of order `order`: `element[i][j] = moment[i + j]`.
    fn submatrix(&self, order: usize) -> BootstrapResult<SymbolicMatrix> {
        if order == 0 || order > self.max_order() {
            return Err(BootstrapError::input_validation(
                "INPUT.SUBMATRIX_ORDER",
                format!(
                    "{} provider covers submatrix orders 1..={}, requested {order}",
                    self.name(),
                    self.max_order()
                ),
            ));
        }
        Ok(SymbolicMatrix::hankel(self.moments(), order))
    }

    /// First `count` exact eigenvalues, in the provider's energy variable.
    fn reference_energies(&self, count: usize) -> Vec<f64>;

    /// Parameter tag used in checkpoint and plot file names.
    fn checkpoint_key(&self) -> String;
}

/// Potential section of a job file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PotentialSpec {
    Harmonic {
        k: f64,
    },
    #[serde(rename_all = "camelCase")]
    Coulomb {
        k: f64,
        #[serde(default = "default_angular_quantum_number")]
        l: u32,
        #[serde(default = "default_true")]
        angular_momentum: bool,
        #[serde(default)]
        variable: CoulombVariable,
        #[serde(default)]
        allow_degenerate: bool,
    },
}

fn default_angular_quantum_number() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl PotentialSpec {
    pub fn build(&self, max_order: usize) -> BootstrapResult<Box<dyn MomentProvider>> {
        let provider: Box<dyn MomentProvider> = match *self {
            Self::Harmonic { k } => Box::new(HarmonicMoments::new(k, max_order)?),
            Self::Coulomb {
                k,
                l,
                angular_momentum,
                variable,
                allow_degenerate,
            } => Box::new(CoulombMoments::new(
                CoulombParameters {
                    k,
                    l,
                    angular_momentum,
                    variable,
                    allow_degenerate,
                },
                max_order,
            )?),
        };
        Ok(provider)
    }
}

/// Exact rational value of a positive, finite coupling constant.
pub(crate) fn coupling_constant(name: &str, k: f64) -> BootstrapResult<BigRational> {
    if !k.is_finite() || k <= 0.0 {
        return Err(BootstrapError::input_validation(
            "INPUT.COUPLING",
            format!("{name} coupling k must be a positive finite number, got {k}"),
        ));
    }
    Ok(rational_from_f64(k)?)
}

pub(crate) fn check_max_order(name: &str, max_order: usize) -> BootstrapResult<()> {
    if max_order == 0 {
        return Err(BootstrapError::input_validation(
            "INPUT.SUBMATRIX_ORDER",
            format!("{name} provider needs a maximum submatrix order of at least 1"),
        ));
    }
    Ok(())
}

pub(crate) fn moment_count(max_order: usize) -> usize {
    2 * (max_order - 1) + 1
}
