//! Moments of `H = P^2 / 2 + k x^2`.
//!
//! Stationarity of `[H, x^s P]` and `[H, x^(s-1)]` gives
//! `<x^s> = ((s-1)/s) (E/k) <x^(s-2)> + ((s-1)(s-2)(s-3)/(8s)) / k <x^(s-4)>`
//! with `<x^0> = 1`, vanishing odd moments and `<x^2> = E / (2k)`.

use super::{MomentProvider, check_max_order, coupling_constant, moment_count};
use crate::domain::BootstrapResult;
use crate::numerics::{Polynomial, RationalFunction, ratio};
use num_rational::BigRational;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HarmonicMoments {
    k: f64,
    max_order: usize,
    moments: Vec<RationalFunction>,
}

impl HarmonicMoments {
    pub fn new(k: f64, max_order: usize) -> BootstrapResult<Self> {
        check_max_order("harmonic", max_order)?;
        let coupling = coupling_constant("harmonic", k)?;
        let moments = harmonic_moments(&coupling, moment_count(max_order))
            .into_iter()
            .map(RationalFunction::from_polynomial)
            .collect::<Vec<_>>();
        debug!(k, max_order, moments = moments.len(), "built harmonic moments");
        Ok(Self {
            k,
            max_order,
            moments,
        })
    }

    pub fn k(&self) -> f64 {
        self.k
    }
}

fn harmonic_moments(k: &BigRational, count: usize) -> Vec<Polynomial> {
    let inverse_k = k.recip();
    let energy_over_k = Polynomial::variable().scale(&inverse_k);
    let mut moments: Vec<Polynomial> = Vec::with_capacity(count);

    for s in 0..count {
        let moment = match s {
            0 => Polynomial::one(),
            _ if s % 2 == 1 => Polynomial::zero(),
            2 => energy_over_k.scale(&ratio(1, 2)),
            _ => {
                let order = s as i64;
                let leading = (&energy_over_k * &moments[s - 2]).scale(&ratio(order - 1, order));
                let tail = moments[s - 4].scale(
                    &(ratio((order - 1) * (order - 2) * (order - 3), 8 * order) * &inverse_k),
                );
                &leading + &tail
            }
        };
        moments.push(moment);
    }

    moments
}

impl MomentProvider for HarmonicMoments {
    fn name(&self) -> &'static str {
        "harmonic"
    }

    fn max_order(&self) -> usize {
        self.max_order
    }

    fn moments(&self) -> &[RationalFunction] {
        &self.moments
    }

    /// `sqrt(2k) (n + 1/2)`
    fn reference_energies(&self, count: usize) -> Vec<f64> {
        let frequency = (2.0 * self.k).sqrt();
        (0..count)
            .map(|n| frequency * (n as f64 + 0.5))
            .collect()
    }

    fn checkpoint_key(&self) -> String {
        format!("k{:.2}", self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::HarmonicMoments;
    use crate::numerics::{Polynomial, ratio, rational};
    use crate::providers::MomentProvider;

    fn polynomial(provider: &HarmonicMoments, index: usize) -> Polynomial {
        provider.moments()[index]
            .as_polynomial()
            .cloned()
            .expect("harmonic moments are polynomials")
    }

    #[test]
    fn second_moment_is_half_the_energy_for_unit_coupling() {
        let provider = HarmonicMoments::new(1.0, 3).expect("provider");
        assert_eq!(
            polynomial(&provider, 2),
            Polynomial::from_coefficients(vec![rational(0), ratio(1, 2)])
        );
    }

    #[test]
    fn odd_moments_vanish() {
        let provider = HarmonicMoments::new(2.5, 5).expect("provider");
        for index in (1..provider.moments().len()).step_by(2) {
            assert!(provider.moments()[index].is_zero(), "moment {index}");
        }
    }

    #[test]
    fn fourth_and_sixth_moments_follow_the_recursion() {
        let provider = HarmonicMoments::new(1.0, 4).expect("provider");
        // X4 = 3/8 E^2 + 3/16
        assert_eq!(
            polynomial(&provider, 4),
            Polynomial::from_coefficients(vec![ratio(3, 16), rational(0), ratio(3, 8)])
        );
        // X6 = 5/6 E X4 + 5/4 X2 = 5/16 E^3 + 25/32 E
        assert_eq!(
            polynomial(&provider, 6),
            Polynomial::from_coefficients(vec![
                rational(0),
                ratio(25, 32),
                rational(0),
                ratio(5, 16),
            ])
        );
    }

    #[test]
    fn coupling_scales_the_second_moment() {
        let provider = HarmonicMoments::new(0.5, 2).expect("provider");
        // E / (2k) = E
        assert_eq!(polynomial(&provider, 2), Polynomial::variable());
    }

    #[test]
    fn reference_energies_are_evenly_spaced() {
        let provider = HarmonicMoments::new(1.0, 2).expect("provider");
        let energies = provider.reference_energies(3);
        let root_two = std::f64::consts::SQRT_2;
        assert_eq!(energies.len(), 3);
        assert!((energies[0] - 0.5 * root_two).abs() < 1.0e-12);
        assert!((energies[2] - 2.5 * root_two).abs() < 1.0e-12);
    }
}
