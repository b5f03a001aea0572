//! JSON has no infinity, so unbounded interval ends are written as the
//! strings `"inf"` and `"-inf"`.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub(super) const POSITIVE_INFINITY: &str = "inf";
pub(super) const NEGATIVE_INFINITY: &str = "-inf";

pub(super) fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_nan() {
        return Err(S::Error::custom("interval bound must not be NaN"));
    }
    if *value == f64::INFINITY {
        serializer.serialize_str(POSITIVE_INFINITY)
    } else if *value == f64::NEG_INFINITY {
        serializer.serialize_str(NEGATIVE_INFINITY)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f64),
    Text(String),
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawBound::deserialize(deserializer)? {
        RawBound::Number(value) => Ok(value),
        RawBound::Text(text) => match text.trim() {
            POSITIVE_INFINITY | "+inf" | "oo" => Ok(f64::INFINITY),
            NEGATIVE_INFINITY | "-oo" => Ok(f64::NEG_INFINITY),
            other => Err(D::Error::custom(format!(
                "invalid interval bound '{other}', expected a number, 'inf' or '-inf'"
            ))),
        },
    }
}
