//! Commitment function of the login circuit.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EncodingError;

/// Value submitted in place of a secret. Serialized as a decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Commitment(BigUint);

impl Commitment {
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }
}

/// `commitment(x) = x + 1`.
pub fn commitment(value: &BigUint) -> Commitment {
    Commitment(value + 1u32)
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Commitment {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodingError::InvalidDecimal(s.to_string()));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Commitment)
            .ok_or_else(|| EncodingError::InvalidDecimal(s.to_string()))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
