//! Password to secret encoding.
//!
//! Each UTF-16 code unit of the password is written as its decimal value and
//! the digit runs are concatenated into a single integer. The run boundaries
//! are not recorded, so different passwords can encode to the same secret
//! (`"\u{1}\u{17}"` and `"\u{c}\u{3}"` both give `123`). Registered
//! commitments depend on this exact encoding, so the weakness is kept.

use std::fmt;

use num_bigint::BigUint;

use crate::commitment::{commitment, Commitment};
use crate::error::EncodingError;

/// Longest password accepted by the login circuit, in UTF-16 code units.
pub const MAX_PASSWORD_LEN: usize = 10;

/// Numeric secret derived from a password. Never leaves the client.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(BigUint);

impl Secret {
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// The next link of the hash chain, `secret + 1`.
    pub fn successor(&self) -> BigUint {
        &self.0 + 1u32
    }

    pub fn commitment(&self) -> Commitment {
        commitment(&self.0)
    }

    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Length of a password as the encoder and the login form count it.
pub fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

/// Encode a password into its secret.
pub fn password_to_secret(password: &str) -> Result<Secret, EncodingError> {
    let len = password_len(password);
    if len > MAX_PASSWORD_LEN {
        return Err(EncodingError::TooLong {
            max: MAX_PASSWORD_LEN,
            actual: len,
        });
    }

    let digits: String = password
        .encode_utf16()
        .map(|unit| unit.to_string())
        .collect();

    // An empty digit string is invalid input, never an implicit zero.
    if digits.is_empty() {
        return Err(EncodingError::Empty);
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .map(Secret)
        .ok_or(EncodingError::NotNumeric(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret123_concatenates_ascii_codes() {
        let secret = password_to_secret("secret123").unwrap();
        // s=115 e=101 c=99 r=114 e=101 t=116 1=49 2=50 3=51
        assert_eq!(secret.to_decimal(), "11510199114101116495051");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        for password in ["a", "Zz9", "\u{0}\u{ff}", "0123456789", "p@ss w0rd"] {
            let first = password_to_secret(password).unwrap();
            let second = password_to_secret(password).unwrap();
            assert_eq!(first, second, "password {:?}", password);
        }
    }

    #[test]
    fn test_empty_password_is_rejected() {
        assert_eq!(password_to_secret(""), Err(EncodingError::Empty));
    }

    #[test]
    fn test_password_longer_than_ten_is_rejected() {
        let err = password_to_secret("abcdefghijk").unwrap_err();
        assert_eq!(err, EncodingError::TooLong { max: 10, actual: 11 });
        assert!(password_to_secret("abcdefghij").is_ok());
    }

    #[test]
    fn test_nul_character_keeps_leading_zero_digit() {
        // "\0a" -> "0" ++ "97" -> 97
        let secret = password_to_secret("\u{0}a").unwrap();
        assert_eq!(secret.to_decimal(), "97");
    }

    #[test]
    fn test_digit_run_boundaries_can_collide() {
        let a = password_to_secret("\u{1}\u{17}").unwrap();
        let b = password_to_secret("\u{c}\u{3}").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_decimal(), "123");
    }

    #[test]
    fn test_length_counts_utf16_units() {
        assert_eq!(password_len("abc"), 3);
        assert_eq!(password_len("é"), 1);
        // Outside the BMP: two code units, two digit runs.
        assert_eq!(password_len("😀"), 2);
        let secret = password_to_secret("😀").unwrap();
        assert_eq!(secret.to_decimal(), "5535756832");
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = password_to_secret("hunter2").unwrap();
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains(&secret.to_decimal()));
    }
}
