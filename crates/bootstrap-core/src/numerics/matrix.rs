use super::polynomial::{Polynomial, PolynomialError};
use super::rational::RationalFunction;

/// Square matrix of rational-function entries, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicMatrix {
    order: usize,
    entries: Vec<RationalFunction>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeterminantError {
    #[error("entry ({row}, {col}) is not a polynomial in the energy variable: {entry}")]
    NonPolynomialEntry {
        row: usize,
        col: usize,
        entry: String,
    },
    #[error(transparent)]
    Algebra(#[from] PolynomialError),
}

impl SymbolicMatrix {
    pub fn from_fn(order: usize, mut entry: impl FnMut(usize, usize) -> RationalFunction) -> Self {
        let mut entries = Vec::with_capacity(order * order);
        for row in 0..order {
            for col in 0..order {
                entries.push(entry(row, col));
            }
        }
        Self { order, entries }
    }

    /// `element[i][j] = sequence[i + j]`; `sequence` must hold at least `2 * order - 1` values.
    pub fn hankel(sequence: &[RationalFunction], order: usize) -> Self {
        Self::from_fn(order, |row, col| sequence[row + col].clone())
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn get(&self, row: usize, col: usize) -> &RationalFunction {
        &self.entries[row * self.order + col]
    }

    pub fn is_polynomial(&self) -> bool {
        self.entries.iter().all(RationalFunction::is_polynomial)
    }

    /// Determinant of a matrix whose entries are all polynomials.
    pub fn determinant_polynomial(&self) -> Result<Polynomial, DeterminantError> {
        let mut rows = Vec::with_capacity(self.order);
        for row in 0..self.order {
            let mut values = Vec::with_capacity(self.order);
            for col in 0..self.order {
                let entry = self.get(row, col);
                let polynomial =
                    entry
                        .as_polynomial()
                        .ok_or_else(|| DeterminantError::NonPolynomialEntry {
                            row,
                            col,
                            entry: entry.to_string(),
                        })?;
                values.push(polynomial.clone());
            }
            rows.push(values);
        }
        Ok(bareiss_determinant(rows)?)
    }

    /// Determinant in lowest terms. Entries are brought over their least
    /// common denominator `L`, so `det(M) = det(L * M) / L^order`.
    pub fn determinant_rational(&self) -> Result<RationalFunction, DeterminantError> {
        let common = self
            .entries
            .iter()
            .fold(Polynomial::one(), |lcm, entry| lcm.lcm(entry.denominator()));

        let mut rows = Vec::with_capacity(self.order);
        for row in 0..self.order {
            let mut values = Vec::with_capacity(self.order);
            for col in 0..self.order {
                let entry = self.get(row, col);
                let cofactor = common.exact_div(entry.denominator())?;
                values.push(entry.numerator() * &cofactor);
            }
            rows.push(values);
        }

        let numerator = bareiss_determinant(rows)?;
        Ok(RationalFunction::new(numerator, common.pow(self.order))?)
    }
}

/// Fraction-free Gaussian elimination. Every intermediate division by the
/// previous pivot is exact, so coefficients stay polynomial throughout.
pub fn bareiss_determinant(mut array: Vec<Vec<Polynomial>>) -> Result<Polynomial, PolynomialError> {
    let nord = array.len();
    if nord == 0 {
        return Ok(Polynomial::one());
    }

    let mut negate = false;
    let mut previous_pivot = Polynomial::one();

    for k in 0..nord {
        if array[k][k].is_zero() {
            let pivot_row = ((k + 1)..nord).find(|&row| !array[row][k].is_zero());
            let Some(pivot_row) = pivot_row else {
                return Ok(Polynomial::zero());
            };
            array.swap(k, pivot_row);
            negate = !negate;
        }

        if k + 1 >= nord {
            continue;
        }

        for i in (k + 1)..nord {
            for j in (k + 1)..nord {
                let cross = &(&array[i][j] * &array[k][k]) - &(&array[i][k] * &array[k][j]);
                array[i][j] = cross.exact_div(&previous_pivot)?;
            }
        }
        previous_pivot = array[k][k].clone();
    }

    let determinant = array[nord - 1][nord - 1].clone();
    Ok(if negate { -determinant } else { determinant })
}

#[cfg(test)]
mod tests {
    use super::{SymbolicMatrix, bareiss_determinant, DeterminantError};
    use crate::numerics::polynomial::{Polynomial, ratio, rational};
    use crate::numerics::rational::RationalFunction;

    fn constants(rows: &[&[i64]]) -> Vec<Vec<Polynomial>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|value| Polynomial::constant(rational(*value)))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn computes_two_by_two_determinant() {
        let value = bareiss_determinant(constants(&[&[1, 2], &[3, 4]])).expect("valid matrix");
        assert_eq!(value, Polynomial::constant(rational(-2)));
    }

    #[test]
    fn row_swap_path_preserves_sign_convention() {
        let value = bareiss_determinant(constants(&[&[0, 2], &[3, 4]])).expect("valid matrix");
        assert_eq!(value, Polynomial::constant(rational(-6)));

        let value = bareiss_determinant(constants(&[&[0, 1, 2], &[1, 0, 3], &[4, -3, 8]]))
            .expect("valid matrix");
        assert_eq!(value, Polynomial::constant(rational(-2)));
    }

    #[test]
    fn singular_matrix_returns_zero() {
        let value = bareiss_determinant(constants(&[&[1, 2], &[2, 4]])).expect("valid matrix");
        assert!(value.is_zero());
        assert_eq!(bareiss_determinant(Vec::new()), Ok(Polynomial::one()));
    }

    #[test]
    fn polynomial_hankel_determinant_matches_expansion() {
        let half_energy =
            RationalFunction::from_polynomial(Polynomial::from_coefficients(vec![rational(0), ratio(1, 2)]));
        let sequence = vec![
            RationalFunction::one(),
            RationalFunction::zero(),
            half_energy,
        ];
        let matrix = SymbolicMatrix::hankel(&sequence, 2);
        let determinant = matrix.determinant_polynomial().expect("polynomial entries");
        assert_eq!(
            determinant,
            Polynomial::from_coefficients(vec![rational(0), ratio(1, 2)])
        );
    }

    #[test]
    fn polynomial_mode_rejects_rational_entries() {
        let inverse = RationalFunction::variable().recip().expect("invertible");
        let matrix = SymbolicMatrix::hankel(&[RationalFunction::one(), inverse.clone(), inverse], 2);
        let error = matrix
            .determinant_polynomial()
            .expect_err("rational entry should be rejected");
        assert!(matches!(
            error,
            DeterminantError::NonPolynomialEntry { row: 0, col: 1, .. }
        ));
    }

    #[test]
    fn rational_determinant_clears_denominators() {
        // [[1, 1/E], [1/E, 2/E^2]] has determinant 1/E^2.
        let inverse = RationalFunction::variable().recip().expect("invertible");
        let two_over_square = (&inverse * &inverse).scale(&rational(2));
        let matrix =
            SymbolicMatrix::hankel(&[RationalFunction::one(), inverse.clone(), two_over_square], 2);

        let determinant = matrix.determinant_rational().expect("rational determinant");
        assert_eq!(determinant.numerator(), &Polynomial::one());
        assert_eq!(determinant.denominator(), &Polynomial::variable().pow(2));
    }
}
