use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use zkauth_common::ProofStatement;

use crate::{CircuitArtifacts, ProofEngine, ProofOutput, ProverError};

const INPUT_FILE: &str = "input.json";
const PROOF_FILE: &str = "proof.json";
const PUBLIC_FILE: &str = "public.json";

/// Generates groth16 proofs by shelling out to the snarkjs CLI.
///
/// 1. Writes the statement to `input.json` in a scratch directory
/// 2. Runs `snarkjs groth16 fullprove input.json <wasm> <zkey> proof.json public.json`
/// 3. Reads the proof and public signals back
pub struct SnarkjsProver {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl SnarkjsProver {
    /// Use `program` as the snarkjs executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before `groth16 fullprove`, e.g. `npx snarkjs`.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn ensure_artifact(path: &Path) -> Result<(), ProverError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(ProverError::MissingArtifact(path.to_path_buf()))
        }
    }
}

impl Default for SnarkjsProver {
    fn default() -> Self {
        Self::new("snarkjs")
    }
}

#[async_trait]
impl ProofEngine for SnarkjsProver {
    fn name(&self) -> &str {
        "snarkjs"
    }

    async fn prove_knowledge(
        &self,
        statement: &ProofStatement,
        artifacts: &CircuitArtifacts,
    ) -> Result<ProofOutput, ProverError> {
        Self::ensure_artifact(&artifacts.program)?;
        Self::ensure_artifact(&artifacts.proving_key)?;

        let scratch = tempfile::tempdir()?;
        let input_path = scratch.path().join(INPUT_FILE);
        let proof_path = scratch.path().join(PROOF_FILE);
        let public_path = scratch.path().join(PUBLIC_FILE);

        tokio::fs::write(&input_path, serde_json::to_vec(statement)?).await?;

        debug!(
            program = %self.program.display(),
            wasm = %artifacts.program.display(),
            zkey = %artifacts.proving_key.display(),
            "running groth16 fullprove"
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg("groth16")
            .arg("fullprove")
            .arg(&input_path)
            .arg(&artifacts.program)
            .arg(&artifacts.proving_key)
            .arg(&proof_path)
            .arg(&public_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ProverError::Unavailable(
                    format!("cannot run {}: {}", self.program.display(), e),
                ),
                _ => ProverError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ProverError::Rejected(format!(
                "groth16 fullprove exited with {}: {}",
                output.status, detail
            )));
        }

        let proof_bytes = tokio::fs::read(&proof_path)
            .await
            .map_err(|e| ProverError::InvalidOutput(format!("missing {}: {}", PROOF_FILE, e)))?;
        let public_bytes = tokio::fs::read(&public_path)
            .await
            .map_err(|e| ProverError::InvalidOutput(format!("missing {}: {}", PUBLIC_FILE, e)))?;

        let proof: serde_json::Value = serde_json::from_slice(&proof_bytes)
            .map_err(|e| ProverError::InvalidOutput(format!("{}: {}", PROOF_FILE, e)))?;
        let public_signals: Vec<String> = serde_json::from_slice(&public_bytes)
            .map_err(|e| ProverError::InvalidOutput(format!("{}: {}", PUBLIC_FILE, e)))?;

        info!(signals = public_signals.len(), "groth16 proof generated");

        Ok(ProofOutput {
            proof,
            public_signals,
        })
    }
}
