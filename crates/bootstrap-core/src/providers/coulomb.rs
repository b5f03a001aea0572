//! Radial moments of `H = P_r^2 / 2 + l(l+1) / (2 r^2) - k / r`.
//!
//! With `t = -1/E` the recursion reads
//! `r[s] = k(2s+1)/(2s+2) r[s-1] t + (s(s-1)/8 - s l(l+1)/(2s+2)) r[s-2] t`,
//! `r[0] = 1` and `r[1] = (3/4) k t - l(l+1) / (2k)`. Solving in `E' = t`
//! keeps every moment polynomial; solving in `E` itself gives rational
//! moments.

use super::{MomentProvider, check_max_order, coupling_constant, moment_count};
use crate::domain::{BootstrapError, BootstrapResult};
use crate::numerics::{Polynomial, RationalFunction, ratio, rational};
use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Energy variable the moments are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoulombVariable {
    /// `E' = -1/E`; eigenvalues sit at `2n^2 / k^2`.
    #[default]
    Inverse,
    /// `E`; eigenvalues sit at `-k^2 / (2n^2)`.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoulombParameters {
    pub k: f64,
    pub l: u32,
    /// Include the `l(l+1) / 2r^2` term.
    pub angular_momentum: bool,
    pub variable: CoulombVariable,
    /// Build even when `l = 0` or the angular term is off.
    pub allow_degenerate: bool,
}

impl Default for CoulombParameters {
    fn default() -> Self {
        Self {
            k: 1.0,
            l: 1,
            angular_momentum: true,
            variable: CoulombVariable::Inverse,
            allow_degenerate: false,
        }
    }
}

impl CoulombParameters {
    pub fn is_degenerate(&self) -> bool {
        !self.angular_momentum || self.l == 0
    }
}

#[derive(Debug, Clone)]
pub struct CoulombMoments {
    parameters: CoulombParameters,
    max_order: usize,
    moments: Vec<RationalFunction>,
}

impl CoulombMoments {
    pub fn new(parameters: CoulombParameters, max_order: usize) -> BootstrapResult<Self> {
        check_max_order("coulomb", max_order)?;
        let coupling = coupling_constant("coulomb", parameters.k)?;

        if parameters.is_degenerate() {
            if !parameters.allow_degenerate {
                return Err(BootstrapError::input_validation(
                    "INPUT.COULOMB_DEGENERATE",
                    format!(
                        "coulomb bootstrap does not converge for l = {} (angular term {}); \
                         set allowDegenerate to run it anyway",
                        parameters.l,
                        if parameters.angular_momentum { "on" } else { "off" }
                    ),
                ));
            }
            warn!(
                l = parameters.l,
                angular_momentum = parameters.angular_momentum,
                "running a degenerate coulomb configuration; intervals are not expected to narrow"
            );
        }

        let moments = coulomb_moments(&coupling, &parameters, moment_count(max_order))?;
        debug!(
            k = parameters.k,
            l = parameters.l,
            variable = ?parameters.variable,
            max_order,
            moments = moments.len(),
            "built coulomb moments"
        );
        Ok(Self {
            parameters,
            max_order,
            moments,
        })
    }

    pub fn parameters(&self) -> &CoulombParameters {
        &self.parameters
    }
}

fn coulomb_moments(
    k: &BigRational,
    parameters: &CoulombParameters,
    count: usize,
) -> BootstrapResult<Vec<RationalFunction>> {
    let t = match parameters.variable {
        CoulombVariable::Inverse => RationalFunction::variable(),
        CoulombVariable::Direct => {
            RationalFunction::new(Polynomial::constant(rational(-1)), Polynomial::variable())?
        }
    };
    let angular = if parameters.angular_momentum {
        let l = i64::from(parameters.l);
        rational(l * (l + 1))
    } else {
        rational(0)
    };

    let mut moments: Vec<RationalFunction> = Vec::with_capacity(count);
    for s in 0..count {
        let moment = match s {
            0 => RationalFunction::one(),
            1 => {
                let kinetic = t.scale(&(ratio(3, 4) * k));
                let centrifugal = RationalFunction::constant(&angular * ratio(1, 2) / k);
                &kinetic - &centrifugal
            }
            _ => {
                let order = s as i64;
                let previous = (&moments[s - 1] * &t).scale(&(k * ratio(2 * order + 1, 2 * order + 2)));
                let weight = ratio(order * (order - 1), 8) - &angular * ratio(order, 2 * order + 2);
                let second = (&moments[s - 2] * &t).scale(&weight);
                &previous + &second
            }
        };
        moments.push(moment);
    }
    Ok(moments)
}

impl MomentProvider for CoulombMoments {
    fn name(&self) -> &'static str {
        "coulomb"
    }

    fn max_order(&self) -> usize {
        self.max_order
    }

    fn moments(&self) -> &[RationalFunction] {
        &self.moments
    }

    /// Levels start at `n = l + 1`.
    fn reference_energies(&self, count: usize) -> Vec<f64> {
        let k = self.parameters.k;
        let first = if self.parameters.angular_momentum {
            self.parameters.l as usize + 1
        } else {
            1
        };
        (first..first + count)
            .map(|n| {
                let n = n as f64;
                match self.parameters.variable {
                    CoulombVariable::Inverse => 2.0 * n * n / (k * k),
                    CoulombVariable::Direct => -(k * k) / (2.0 * n * n),
                }
            })
            .collect()
    }

    fn checkpoint_key(&self) -> String {
        let mut key = format!("k{:.2}_l{}", self.parameters.k, self.parameters.l);
        if !self.parameters.angular_momentum {
            key.push_str("_radial");
        }
        if self.parameters.variable == CoulombVariable::Direct {
            key.push_str("_direct");
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::{CoulombMoments, CoulombParameters, CoulombVariable};
    use crate::domain::BootstrapErrorCategory;
    use crate::numerics::{Polynomial, RationalFunction, ratio, rational};
    use crate::providers::MomentProvider;

    fn hydrogen(max_order: usize) -> CoulombMoments {
        CoulombMoments::new(CoulombParameters::default(), max_order).expect("provider")
    }

    #[test]
    fn inverse_variable_moments_are_polynomials() {
        let provider = hydrogen(4);
        assert!(provider.moments().iter().all(RationalFunction::is_polynomial));

        // r1 = 3/4 E' - 1 for k = 1, l = 1
        assert_eq!(
            provider.moments()[1],
            RationalFunction::from_polynomial(Polynomial::from_coefficients(vec![
                rational(-1),
                ratio(3, 4),
            ]))
        );
    }

    #[test]
    fn second_moment_follows_the_recursion() {
        let provider = hydrogen(2);
        // r2 = 5/6 r1 E' + (1/4 - 2/3) E' = 5/8 E'^2 - 5/4 E'
        assert_eq!(
            provider.moments()[2],
            RationalFunction::from_polynomial(Polynomial::from_coefficients(vec![
                rational(0),
                ratio(-5, 4),
                ratio(5, 8),
            ]))
        );
    }

    #[test]
    fn direct_variable_moments_are_rational() {
        let provider = CoulombMoments::new(
            CoulombParameters {
                variable: CoulombVariable::Direct,
                ..CoulombParameters::default()
            },
            3,
        )
        .expect("provider");

        // r1 = -3/(4E) - 1 = (-E - 3/4) / E
        let expected = RationalFunction::new(
            Polynomial::from_coefficients(vec![ratio(-3, 4), rational(-1)]),
            Polynomial::variable(),
        )
        .expect("non-zero denominator");
        assert_eq!(provider.moments()[1], expected);
        assert!(!provider.moments()[2].is_polynomial());
        assert_eq!(provider.checkpoint_key(), "k1.00_l1_direct");
    }

    #[test]
    fn zero_angular_momentum_is_rejected_unless_allowed() {
        let degenerate = CoulombParameters {
            l: 0,
            ..CoulombParameters::default()
        };
        let error = CoulombMoments::new(degenerate, 3).expect_err("l = 0 should be rejected");
        assert_eq!(error.placeholder(), "INPUT.COULOMB_DEGENERATE");
        assert_eq!(error.category(), BootstrapErrorCategory::InputValidationError);

        let radial = CoulombParameters {
            angular_momentum: false,
            ..CoulombParameters::default()
        };
        assert!(CoulombMoments::new(radial, 3).is_err());

        let allowed = CoulombParameters {
            l: 0,
            allow_degenerate: true,
            ..CoulombParameters::default()
        };
        let provider = CoulombMoments::new(allowed, 3).expect("degenerate run allowed");
        // r1 = 3/4 E' without the centrifugal term
        assert_eq!(
            provider.moments()[1],
            RationalFunction::from_polynomial(Polynomial::from_coefficients(vec![
                rational(0),
                ratio(3, 4),
            ]))
        );
    }

    #[test]
    fn reference_energies_start_above_the_angular_quantum_number() {
        let provider = hydrogen(2);
        assert_eq!(provider.reference_energies(3), vec![8.0, 18.0, 32.0]);

        let direct = CoulombMoments::new(
            CoulombParameters {
                variable: CoulombVariable::Direct,
                ..CoulombParameters::default()
            },
            2,
        )
        .expect("provider");
        assert_eq!(direct.reference_energies(1), vec![-0.125]);
    }
}
