pub mod errors;

pub use errors::{BootstrapError, BootstrapErrorCategory, BootstrapResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// How each round's candidate region is intersected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum IntersectionMode {
    /// Against the previous round's surviving region.
    #[default]
    Chained,
    /// Against the fixed initial region, so one round's solve cannot constrain the next.
    Independent,
}

impl IntersectionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chained => "chained",
            Self::Independent => "independent",
        }
    }
}

impl Display for IntersectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl TryFrom<String> for IntersectionMode {
    type Error = BootstrapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IntersectionMode> for String {
    fn from(value: IntersectionMode) -> Self {
        value.as_str().to_string()
    }
}

impl std::str::FromStr for IntersectionMode {
    type Err = BootstrapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "chained" => Ok(Self::Chained),
            "independent" => Ok(Self::Independent),
            other => Err(BootstrapError::input_validation(
                "INPUT.INTERSECTION_MODE",
                format!("unknown intersection mode '{other}', expected 'chained' or 'independent'"),
            )),
        }
    }
}

/// Which algebraic form the round determinant is solved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum SolveMode {
    #[default]
    Polynomial,
    Rational,
}

impl SolveMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polynomial => "polynomial",
            Self::Rational => "rational",
        }
    }
}

impl Display for SolveMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl TryFrom<String> for SolveMode {
    type Error = BootstrapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SolveMode> for String {
    fn from(value: SolveMode) -> Self {
        value.as_str().to_string()
    }
}

impl std::str::FromStr for SolveMode {
    type Err = BootstrapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "polynomial" => Ok(Self::Polynomial),
            "rational" => Ok(Self::Rational),
            other => Err(BootstrapError::input_validation(
                "INPUT.SOLVE_MODE",
                format!("unknown solving mode '{other}', expected 'polynomial' or 'rational'"),
            )),
        }
    }
}
