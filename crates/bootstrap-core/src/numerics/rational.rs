use super::polynomial::{Polynomial, PolynomialError};
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

/// Quotient of two polynomials in the energy variable, kept in lowest terms
/// with a monic denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl RationalFunction {
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> Result<Self, PolynomialError> {
        if denominator.is_zero() {
            return Err(PolynomialError::DivisionByZero);
        }
        Ok(Self::reduced(numerator, denominator))
    }

    pub fn zero() -> Self {
        Self::from_polynomial(Polynomial::zero())
    }

    pub fn one() -> Self {
        Self::from_polynomial(Polynomial::one())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::from_polynomial(Polynomial::constant(value))
    }

    pub fn variable() -> Self {
        Self::from_polynomial(Polynomial::variable())
    }

    pub fn from_polynomial(numerator: Polynomial) -> Self {
        Self {
            numerator,
            denominator: Polynomial::one(),
        }
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    pub fn into_parts(self) -> (Polynomial, Polynomial) {
        (self.numerator, self.denominator)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// True when the reduced denominator is the constant one.
    pub fn is_polynomial(&self) -> bool {
        self.denominator.is_constant()
    }

    pub fn as_polynomial(&self) -> Option<&Polynomial> {
        self.is_polynomial().then_some(&self.numerator)
    }

    pub fn recip(&self) -> Result<Self, PolynomialError> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        Self::reduced(self.numerator.scale(factor), self.denominator.clone())
    }

    pub fn evaluate_f64(&self, x: f64) -> f64 {
        self.numerator.evaluate_f64(x) / self.denominator.evaluate_f64(x)
    }

    pub fn evaluate(&self, x: &BigRational) -> Option<BigRational> {
        let denominator = self.denominator.evaluate(x);
        if denominator.is_zero() {
            return None;
        }
        Some(self.numerator.evaluate(x) / denominator)
    }

    fn reduced(numerator: Polynomial, denominator: Polynomial) -> Self {
        if numerator.is_zero() {
            return Self::zero();
        }
        let gcd = numerator.gcd(&denominator);
        let mut numerator = numerator.divide_out(&gcd);
        let mut denominator = denominator.divide_out(&gcd);
        if let Some(leading) = denominator.leading_coefficient().cloned() {
            if !leading.is_one() {
                let inverse = leading.recip();
                numerator = numerator.scale(&inverse);
                denominator = denominator.scale(&inverse);
            }
        }
        Self {
            numerator,
            denominator,
        }
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(value: Polynomial) -> Self {
        Self::from_polynomial(value)
    }
}

impl Add<&RationalFunction> for &RationalFunction {
    type Output = RationalFunction;

    fn add(self, rhs: &RationalFunction) -> RationalFunction {
        if self.denominator == rhs.denominator {
            return RationalFunction::reduced(
                &self.numerator + &rhs.numerator,
                self.denominator.clone(),
            );
        }
        RationalFunction::reduced(
            &(&self.numerator * &rhs.denominator) + &(&rhs.numerator * &self.denominator),
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Sub<&RationalFunction> for &RationalFunction {
    type Output = RationalFunction;

    fn sub(self, rhs: &RationalFunction) -> RationalFunction {
        self + &(-rhs)
    }
}

impl Mul<&RationalFunction> for &RationalFunction {
    type Output = RationalFunction;

    fn mul(self, rhs: &RationalFunction) -> RationalFunction {
        RationalFunction::reduced(
            &self.numerator * &rhs.numerator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Neg for &RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        RationalFunction {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

impl Display for RationalFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_polynomial() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "({}) / ({})", self.numerator, self.denominator)
        }
    }
}
