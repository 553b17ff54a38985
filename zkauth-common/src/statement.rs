//! Hash-chain statement consumed by the login circuit.

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;
use crate::encoding::Secret;

/// `(S, commitment(S), commitment(S + 1))` for a single encoded password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashChainPair {
    pub secret: Secret,
    pub commitment: Commitment,
    pub next_commitment: Commitment,
}

impl HashChainPair {
    pub fn from_secret(secret: Secret) -> Self {
        let commitment = secret.commitment();
        let next_commitment = crate::commitment::commitment(&secret.successor());
        Self {
            secret,
            commitment,
            next_commitment,
        }
    }

    /// Circuit input with every value rendered as a decimal string.
    pub fn statement(&self) -> ProofStatement {
        ProofStatement {
            password: self.secret.to_decimal(),
            password_hash: self.commitment.to_decimal(),
            password_plus_one_hash: self.next_commitment.to_decimal(),
        }
    }
}

/// Named inputs of the login circuit.
///
/// `password` is the private witness; the two hashes are public signals.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStatement {
    pub password: String,
    pub password_hash: String,
    pub password_plus_one_hash: String,
}

impl std::fmt::Debug for ProofStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofStatement")
            .field("password", &"<redacted>")
            .field("password_hash", &self.password_hash)
            .field("password_plus_one_hash", &self.password_plus_one_hash)
            .finish()
    }
}
