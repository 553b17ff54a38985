//! zkauth-prover
//!
//! The login circuit is proven outside this process. Callers hand a
//! [`ProofStatement`] and the circuit artifacts to a [`ProofEngine`] and get
//! back an opaque proof plus its public signals.
//!
//! - [`SnarkjsProver`] runs `snarkjs groth16 fullprove`.
//! - [`FixedProver`] returns a fixed proof, for tests and offline runs.

mod error;
mod fixed;
mod snarkjs;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkauth_common::ProofStatement;

pub use error::ProverError;
pub use fixed::FixedProver;
pub use snarkjs::SnarkjsProver;

/// Circuit program and proving key for the login circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitArtifacts {
    /// Compiled witness generator (`zkauth.wasm`).
    pub program: PathBuf,
    /// Groth16 proving key (`zkauth.zkey`).
    pub proving_key: PathBuf,
}

impl Default for CircuitArtifacts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("zkauth.wasm"),
            proving_key: PathBuf::from("zkauth.zkey"),
        }
    }
}

/// Proof and public signals as produced by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOutput {
    /// Opaque proof object, forwarded to the backend untouched.
    pub proof: serde_json::Value,
    /// Public signals as decimal strings.
    pub public_signals: Vec<String>,
}

/// Capability that proves knowledge of the secret behind a statement.
#[async_trait]
pub trait ProofEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn prove_knowledge(
        &self,
        statement: &ProofStatement,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput, ProverError>;
}
