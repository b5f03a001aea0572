use super::rational::RationalFunction;
use faer::Mat;

pub type DenseMomentMatrix = Mat<f64>;

const SINGULAR_PIVOT_EPSILON: f64 = 1.0e-300;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProbeError {
    #[error("moment matrix of order {order} needs {required} moments, got {available}")]
    NotEnoughMoments {
        order: usize,
        required: usize,
        available: usize,
    },
    #[error("moment {index} is not finite at energy {energy}")]
    NonFiniteMoment { index: usize, energy: f64 },
}

/// Numeric Hankel moment matrix at a fixed energy.
pub fn evaluate_moment_matrix(
    moments: &[RationalFunction],
    order: usize,
    energy: f64,
) -> Result<DenseMomentMatrix, ProbeError> {
    let required = (2 * order).saturating_sub(1);
    if moments.len() < required {
        return Err(ProbeError::NotEnoughMoments {
            order,
            required,
            available: moments.len(),
        });
    }

    let values = moments[..required]
        .iter()
        .enumerate()
        .map(|(index, moment)| {
            let value = moment.evaluate_f64(energy);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ProbeError::NonFiniteMoment { index, energy })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut matrix = DenseMomentMatrix::zeros(order, order);
    for row in 0..order {
        for col in 0..order {
            matrix[(row, col)] = values[row + col];
        }
    }
    Ok(matrix)
}

/// Leading principal minors `det(M[..k, ..k])` for `k = 1..=n`, from one
/// elimination pass. Minors after a vanishing pivot are reported as zero.
pub fn leading_principal_minors(matrix: &DenseMomentMatrix) -> Vec<f64> {
    let dimension = matrix.nrows().min(matrix.ncols());
    let mut minors = Vec::with_capacity(dimension);
    let mut work = matrix.clone();
    let mut running = 1.0f64;

    for k in 0..dimension {
        // Gaussian elimination without pivoting keeps each leading block
        // intact, so the running product of pivots is the k-th minor.
        let pivot = work[(k, k)];
        running *= pivot;
        minors.push(running);
        if pivot.abs() <= SINGULAR_PIVOT_EPSILON {
            minors.extend(std::iter::repeat_n(0.0, dimension - k - 1));
            break;
        }
        for row in (k + 1)..dimension {
            let factor = work[(row, k)] / pivot;
            for col in (k + 1)..dimension {
                let updated = work[(row, col)] - factor * work[(k, col)];
                work[(row, col)] = updated;
            }
        }
    }

    minors
}

/// Positivity snapshot of the moment matrix at one energy.
#[derive(Debug, Clone, PartialEq)]
pub struct PositivityProbe {
    pub energy: f64,
    pub minors: Vec<f64>,
}

impl PositivityProbe {
    pub fn smallest_minor(&self) -> Option<f64> {
        self.minors.iter().copied().reduce(f64::min)
    }

    pub fn is_admissible(&self, tolerance: f64) -> bool {
        self.minors.iter().all(|minor| *minor >= -tolerance)
    }
}

pub fn probe_positivity(
    moments: &[RationalFunction],
    order: usize,
    energy: f64,
) -> Result<PositivityProbe, ProbeError> {
    let matrix = evaluate_moment_matrix(moments, order, energy)?;
    Ok(PositivityProbe {
        energy,
        minors: leading_principal_minors(&matrix),
    })
}
