//! Shared protocol primitives for zkauth.
//!
//! A login is registered with a commitment derived from the user's password.
//! To authorize a transfer the user later proves knowledge of the password and
//! of its successor in a one-step hash chain:
//!
//! ```text
//! secret    = encode(password)            // concatenated character codes
//! C1        = commitment(secret)          // secret + 1
//! C2        = commitment(secret + 1)      // secret + 2
//!
//! statement = { password: secret, passwordHash: C1, passwordPlusOneHash: C2 }
//! ```
//!
//! The commitment relation is the one the deployed circuit checks. It is a
//! placeholder for a one-way function and must stay in lockstep with the
//! circuit, so it is not strengthened here.

pub mod commitment;
pub mod encoding;
pub mod error;
pub mod statement;

pub use commitment::{commitment, Commitment};
pub use encoding::{password_to_secret, password_len, Secret, MAX_PASSWORD_LEN};
pub use error::EncodingError;
pub use statement::{HashChainPair, ProofStatement};
