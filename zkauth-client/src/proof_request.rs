//! Turns a validated password into a login proof.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use zkauth_common::{password_to_secret, HashChainPair};
use zkauth_prover::{CircuitArtifacts, ProofEngine, ProofOutput, ProverError};

use crate::error::{Stage, ZkAuthError};

/// Builds the hash-chain statement for a password and has the engine prove it.
#[derive(Clone)]
pub struct ProofRequestBuilder {
    engine: Arc<dyn ProofEngine>,
    artifacts: CircuitArtifacts,
    timeout: Duration,
}

impl ProofRequestBuilder {
    pub fn new(engine: Arc<dyn ProofEngine>, artifacts: CircuitArtifacts, timeout: Duration) -> Self {
        Self {
            engine,
            artifacts,
            timeout,
        }
    }

    pub fn artifacts(&self) -> &CircuitArtifacts {
        &self.artifacts
    }

    /// Prove knowledge of `S` with `commitment(S)` and `commitment(S + 1)`.
    ///
    /// The engine gets at most `timeout`; an empty proof or missing public
    /// signals count as engine failure.
    pub async fn build(&self, password: &str) -> Result<ProofOutput, ZkAuthError> {
        let pair = HashChainPair::from_secret(password_to_secret(password)?);
        let statement = pair.statement();
        debug!(
            engine = self.engine.name(),
            password_hash = %statement.password_hash,
            "requesting proof"
        );

        let output = tokio::time::timeout(
            self.timeout,
            self.engine.prove_knowledge(&statement, &self.artifacts),
        )
        .await
        .map_err(|_| ZkAuthError::Timeout {
            stage: Stage::ProofGeneration,
            secs: self.timeout.as_secs(),
        })??;

        if output.proof.is_null() {
            return Err(ProverError::InvalidOutput("engine returned no proof".into()).into());
        }
        if output.public_signals.is_empty() {
            return Err(ProverError::InvalidOutput("engine returned no public signals".into()).into());
        }

        info!(
            engine = self.engine.name(),
            signals = output.public_signals.len(),
            "proof created"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use zkauth_common::ProofStatement;
    use zkauth_prover::FixedProver;

    struct SlowProver;

    #[async_trait]
    impl ProofEngine for SlowProver {
        fn name(&self) -> &str {
            "slow"
        }

        async fn prove_knowledge(
            &self,
            _statement: &ProofStatement,
            _artifacts: &CircuitArtifacts,
        ) -> Result<ProofOutput, ProverError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ProverError::Unavailable("unreachable".into()))
        }
    }

    fn builder(engine: Arc<dyn ProofEngine>) -> ProofRequestBuilder {
        ProofRequestBuilder::new(engine, CircuitArtifacts::default(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_statement_carries_both_hashes() {
        let out = builder(Arc::new(FixedProver::default()))
            .build("secret123")
            .await
            .unwrap();
        assert_eq!(
            out.public_signals,
            vec!["11510199114101116495052", "11510199114101116495053"]
        );
    }

    #[tokio::test]
    async fn test_engine_rejection_propagates() {
        let err = builder(Arc::new(FixedProver::rejecting("Assert Failed")))
            .build("secret123")
            .await
            .unwrap_err();
        assert!(matches!(err, ZkAuthError::ProofEngine(ProverError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_null_proof_is_invalid() {
        let err = builder(Arc::new(FixedProver::new(json!(null))))
            .build("secret123")
            .await
            .unwrap_err();
        assert!(matches!(err, ZkAuthError::ProofEngine(ProverError::InvalidOutput(_))));
    }

    #[tokio::test]
    async fn test_empty_password_never_reaches_engine() {
        let engine = Arc::new(FixedProver::default());
        let err = builder(engine.clone()).build("").await.unwrap_err();
        assert!(matches!(err, ZkAuthError::Validation(_)));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_engine_times_out() {
        let err = builder(Arc::new(SlowProver)).build("abc").await.unwrap_err();
        assert!(matches!(
            err,
            ZkAuthError::Timeout {
                stage: Stage::ProofGeneration,
                secs: 5
            }
        ));
    }
}
