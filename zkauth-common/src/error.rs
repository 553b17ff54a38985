use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("password is empty")]
    Empty,

    #[error("password is {actual} characters long, at most {max} are allowed")]
    TooLong { max: usize, actual: usize },

    #[error("password digits do not form a decimal integer: {0}")]
    NotNumeric(String),

    #[error("invalid decimal integer: {0:?}")]
    InvalidDecimal(String),
}
