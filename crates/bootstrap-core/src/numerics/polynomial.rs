use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

/// Name used when polynomials are rendered for logs.
pub const ENERGY_SYMBOL: &str = "E";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolynomialError {
    #[error("division by the zero polynomial")]
    DivisionByZero,
    #[error("exact division left a remainder of degree {remainder_degree}")]
    InexactDivision { remainder_degree: usize },
    #[error("value {value} has no exact rational representation")]
    NonFiniteValue { value: f64 },
}

/// Dense univariate polynomial with exact rational coefficients.
///
/// Coefficients are stored lowest degree first and never carry trailing
/// zeros, so the zero polynomial has no coefficients at all and structural
/// equality is mathematical equality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    coefficients: Vec<BigRational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::from_coefficients(vec![value])
    }

    /// The energy variable itself.
    pub fn variable() -> Self {
        Self::monomial(BigRational::one(), 1)
    }

    pub fn monomial(coefficient: BigRational, degree: usize) -> Self {
        let mut coefficients = vec![BigRational::zero(); degree + 1];
        coefficients[degree] = coefficient;
        Self::from_coefficients(coefficients)
    }

    pub fn from_coefficients(mut coefficients: Vec<BigRational>) -> Self {
        while coefficients.last().is_some_and(Zero::is_zero) {
            coefficients.pop();
        }
        Self { coefficients }
    }

    pub fn from_integers(coefficients: &[i64]) -> Self {
        Self::from_coefficients(coefficients.iter().map(|value| rational(*value)).collect())
    }

    pub fn coefficients(&self) -> &[BigRational] {
        &self.coefficients
    }

    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.coefficients.len() <= 1
    }

    pub fn leading_coefficient(&self) -> Option<&BigRational> {
        self.coefficients.last()
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        Self::from_coefficients(self.coefficients.iter().map(|c| c * factor).collect())
    }

    pub fn evaluate(&self, x: &BigRational) -> BigRational {
        let mut value = BigRational::zero();
        for coefficient in self.coefficients.iter().rev() {
            value = value * x + coefficient;
        }
        value
    }

    pub fn evaluate_f64(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |value, coefficient| {
            value * x + coefficient.to_f64().unwrap_or(f64::NAN)
        })
    }

    /// Sign of the polynomial at `x`, relative to zero.
    pub fn sign_at(&self, x: &BigRational) -> Ordering {
        self.evaluate(x).cmp(&BigRational::zero())
    }

    pub fn derivative(&self) -> Self {
        Self::from_coefficients(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(power, coefficient)| coefficient * rational(power as i64))
                .collect(),
        )
    }

    pub fn pow(&self, exponent: usize) -> Self {
        let mut result = Self::one();
        for _ in 0..exponent {
            result = &result * self;
        }
        result
    }

    /// Scales so the leading coefficient is one; the zero polynomial stays zero.
    pub fn monic(&self) -> Self {
        match self.leading_coefficient() {
            Some(leading) if !leading.is_one() => self.scale(&leading.recip()),
            _ => self.clone(),
        }
    }

    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), PolynomialError> {
        let Some(divisor_degree) = divisor.degree() else {
            return Err(PolynomialError::DivisionByZero);
        };
        Ok(self.long_division(divisor, divisor_degree))
    }

    /// Long division by a divisor of the given (existing) degree.
    pub(crate) fn long_division(&self, divisor: &Self, divisor_degree: usize) -> (Self, Self) {
        let divisor_leading = &divisor.coefficients[divisor_degree];

        let mut remainder = self.coefficients.clone();
        let quotient_len = remainder.len().saturating_sub(divisor_degree);
        let mut quotient = vec![BigRational::zero(); quotient_len];

        for shift in (0..quotient_len).rev() {
            let top = &remainder[shift + divisor_degree];
            if top.is_zero() {
                continue;
            }
            let factor = top / divisor_leading;
            for (offset, coefficient) in divisor.coefficients.iter().enumerate() {
                remainder[shift + offset] -= &factor * coefficient;
            }
            quotient[shift] = factor;
        }

        (
            Self::from_coefficients(quotient),
            Self::from_coefficients(remainder),
        )
    }

    /// Quotient by a factor of `self`. Dividing by zero leaves `self` as is.
    pub(crate) fn divide_out(&self, factor: &Self) -> Self {
        match factor.degree() {
            Some(degree) => self.long_division(factor, degree).0,
            None => self.clone(),
        }
    }

    /// Division that must leave no remainder.
    pub fn exact_div(&self, divisor: &Self) -> Result<Self, PolynomialError> {
        let (quotient, remainder) = self.div_rem(divisor)?;
        match remainder.degree() {
            None => Ok(quotient),
            Some(remainder_degree) => Err(PolynomialError::InexactDivision { remainder_degree }),
        }
    }

    /// Monic greatest common divisor; zero only when both inputs are zero.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while let Some(degree) = b.degree() {
            let (_, remainder) = a.long_division(&b, degree);
            a = b;
            b = remainder.monic();
        }
        a.monic()
    }

    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        (self * other).divide_out(&self.gcd(other)).monic()
    }

    /// Product of the distinct irreducible factors: same roots, each simple.
    pub fn square_free_part(&self) -> Self {
        if self.is_constant() {
            return self.clone();
        }
        self.divide_out(&self.gcd(&self.derivative()))
    }

    /// Cauchy bound: every real root lies strictly inside `(-bound, bound)`.
    pub fn root_bound(&self) -> BigRational {
        let Some(leading) = self.leading_coefficient() else {
            return BigRational::one();
        };
        let largest_ratio = self
            .coefficients
            .iter()
            .rev()
            .skip(1)
            .map(|coefficient| (coefficient / leading).abs())
            .max()
            .unwrap_or_else(BigRational::zero);
        BigRational::one() + largest_ratio
    }
}

pub fn rational(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

pub fn ratio(numerator: i64, denominator: i64) -> BigRational {
    BigRational::new(BigInt::from(numerator), BigInt::from(denominator))
}

/// Exact rational value of a finite float.
pub fn rational_from_f64(value: f64) -> Result<BigRational, PolynomialError> {
    BigRational::from_float(value).ok_or(PolynomialError::NonFiniteValue { value })
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let zero = BigRational::zero();
        Polynomial::from_coefficients(
            (0..len)
                .map(|index| {
                    let lhs = self.coefficients.get(index).unwrap_or(&zero);
                    let rhs = rhs.coefficients.get(index).unwrap_or(&zero);
                    lhs + rhs
                })
                .collect(),
        )
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut product =
            vec![BigRational::zero(); self.coefficients.len() + rhs.coefficients.len() - 1];
        for (i, lhs) in self.coefficients.iter().enumerate() {
            if lhs.is_zero() {
                continue;
            }
            for (j, rhs) in rhs.coefficients.iter().enumerate() {
                product[i + j] += lhs * rhs;
            }
        }
        Polynomial::from_coefficients(product)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            coefficients: self.coefficients.iter().map(|c| -c).collect(),
        }
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -&self
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut first = true;
        for (power, coefficient) in self.coefficients.iter().enumerate().rev() {
            if coefficient.is_zero() {
                continue;
            }
            let magnitude = coefficient.abs();
            if first {
                if coefficient.is_negative() {
                    f.write_str("-")?;
                }
            } else if coefficient.is_negative() {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            first = false;
            match power {
                0 => write!(f, "{magnitude}")?,
                _ => {
                    if !magnitude.is_one() {
                        write!(f, "{magnitude}*")?;
                    }
                    f.write_str(ENERGY_SYMBOL)?;
                    if power > 1 {
                        write!(f, "^{power}")?;
                    }
                }
            }
        }
        Ok(())
    }
}
