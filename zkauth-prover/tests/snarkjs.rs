//! Tests for the snarkjs adapter.
//!
//! A small shell script stands in for snarkjs. It is run through `sh` so the
//! test never executes a file it has just written.

#![cfg(unix)]

use std::path::{Path, PathBuf};

use zkauth_common::{password_to_secret, HashChainPair, ProofStatement};
use zkauth_prover::{CircuitArtifacts, ProofEngine, ProverError, SnarkjsProver};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fake `snarkjs groth16 fullprove in wasm zkey proof public`.
///
/// Echoes the statement hashes back as public signals so the test can check
/// that the input file was written correctly.
const FAKE_SNARKJS: &str = r#"
[ "$1" = "groth16" ] || exit 64
[ "$2" = "fullprove" ] || exit 64
hash=$(sed -n 's/.*"passwordHash":"\([0-9]*\)".*/\1/p' "$3")
next=$(sed -n 's/.*"passwordPlusOneHash":"\([0-9]*\)".*/\1/p' "$3")
printf '{"protocol":"groth16","curve":"bn128","pi_a":["1","2","1"]}' > "$6"
printf '["%s","%s"]' "$hash" "$next" > "$7"
"#;

const FAILING_SNARKJS: &str = r#"
echo "Error: Assert Failed. Error in template ZkAuth_1 line: 12" >&2
exit 1
"#;

fn statement() -> ProofStatement {
    HashChainPair::from_secret(password_to_secret("secret123").unwrap()).statement()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn artifacts_in(dir: &Path) -> CircuitArtifacts {
    CircuitArtifacts {
        program: write(dir, "zkauth.wasm", "wasm"),
        proving_key: write(dir, "zkauth.zkey", "zkey"),
    }
}

fn prover_running(script: &Path) -> SnarkjsProver {
    SnarkjsProver::new("sh").with_leading_args([script.as_os_str().to_owned()])
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn fullprove_output_is_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "snarkjs.sh", FAKE_SNARKJS);
    let artifacts = artifacts_in(dir.path());

    let out = prover_running(&script)
        .prove_knowledge(&statement(), &artifacts)
        .await
        .unwrap();

    assert_eq!(out.proof["protocol"], "groth16");
    assert_eq!(
        out.public_signals,
        vec!["11510199114101116495052", "11510199114101116495053"]
    );
}

#[tokio::test]
async fn non_zero_exit_is_a_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "snarkjs.sh", FAILING_SNARKJS);
    let artifacts = artifacts_in(dir.path());

    let err = prover_running(&script)
        .prove_knowledge(&statement(), &artifacts)
        .await
        .unwrap_err();

    match err {
        ProverError::Rejected(message) => assert!(message.contains("Assert Failed")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_binary_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = artifacts_in(dir.path());

    let err = SnarkjsProver::new(dir.path().join("no-such-snarkjs"))
        .prove_knowledge(&statement(), &artifacts)
        .await
        .unwrap_err();

    assert!(matches!(err, ProverError::Unavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_artifacts_are_reported_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = CircuitArtifacts {
        program: dir.path().join("absent.wasm"),
        proving_key: dir.path().join("absent.zkey"),
    };

    let err = SnarkjsProver::new(dir.path().join("no-such-snarkjs"))
        .prove_knowledge(&statement(), &artifacts)
        .await
        .unwrap_err();

    match err {
        ProverError::MissingArtifact(path) => assert!(path.ends_with("absent.wasm")),
        other => panic!("expected missing artifact, got {other:?}"),
    }
}

#[tokio::test]
async fn script_without_outputs_is_invalid_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = write(dir.path(), "snarkjs.sh", "exit 0\n");
    let artifacts = artifacts_in(dir.path());

    let err = prover_running(&script)
        .prove_knowledge(&statement(), &artifacts)
        .await
        .unwrap_err();

    assert!(matches!(err, ProverError::InvalidOutput(_)), "got {err:?}");
}
