use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use zkauth_common::ProofStatement;

use crate::{CircuitArtifacts, ProofEngine, ProofOutput, ProverError};

/// Deterministic engine that never touches the circuit.
///
/// Returns the configured proof and reports the two hashes of the statement
/// as public signals, in circuit order. Can be set up to reject instead.
pub struct FixedProver {
    proof: serde_json::Value,
    reject_with: Option<String>,
    calls: AtomicUsize,
}

impl FixedProver {
    pub fn new(proof: serde_json::Value) -> Self {
        Self {
            proof,
            reject_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// An engine that rejects every statement with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            proof: serde_json::Value::Null,
            reject_with: Some(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of prove requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FixedProver {
    fn default() -> Self {
        Self::new(json!({
            "pi_a": ["1", "2", "1"],
            "pi_b": [["1", "0"], ["0", "1"], ["1", "0"]],
            "pi_c": ["3", "4", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }))
    }
}

#[async_trait]
impl ProofEngine for FixedProver {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn prove_knowledge(
        &self,
        statement: &ProofStatement,
        _artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput, ProverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.reject_with {
            return Err(ProverError::Rejected(reason.clone()));
        }

        Ok(ProofOutput {
            proof: self.proof.clone(),
            public_signals: vec![
                statement.password_hash.clone(),
                statement.password_plus_one_hash.clone(),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkauth_common::{password_to_secret, HashChainPair};

    fn statement() -> ProofStatement {
        HashChainPair::from_secret(password_to_secret("abc").unwrap()).statement()
    }

    #[tokio::test]
    async fn test_returns_statement_hashes_as_signals() {
        let prover = FixedProver::default();
        let out = prover
            .prove_knowledge(&statement(), &CircuitArtifacts::default())
            .await
            .unwrap();
        assert_eq!(out.public_signals, vec!["979900", "979901"]);
        assert_eq!(out.proof["protocol"], "groth16");
        assert_eq!(prover.calls(), 1);
    }

    #[tokio::test]
    async fn test_rejecting_engine_counts_calls() {
        let prover = FixedProver::rejecting("constraint not satisfied");
        let err = prover
            .prove_knowledge(&statement(), &CircuitArtifacts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProverError::Rejected(ref m) if m == "constraint not satisfied"));
        assert_eq!(prover.calls(), 1);
    }
}
