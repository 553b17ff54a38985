//! Client configuration.
//!
//! Every deployment-specific value (backend, contracts, explorer, network and
//! circuit artifacts) lives here and is handed to [`crate::ZkAuthClient`] at
//! construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use zkauth_prover::CircuitArtifacts;

use crate::error::ZkAuthError;

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for the zkauth client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkAuthConfig {
    /// Base URL of the zkauth backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Underlying ERC20 token moved by transfers.
    #[serde(default = "default_token_address")]
    pub token_address: String,

    /// zkauth contract holding registered commitments.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,

    /// Block explorer root, without trailing path.
    #[serde(default = "default_explorer_base_url")]
    pub explorer_base_url: String,

    /// Hex chain id the wallet is switched to.
    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    /// Login circuit artifacts for the proof engine.
    #[serde(default)]
    pub circuit: CircuitArtifacts,

    /// Timeout for each backend request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for a single proof generation.
    #[serde(default = "default_proof_timeout")]
    pub proof_timeout_secs: u64,

    /// Token details offered to the wallet.
    #[serde(default)]
    pub token: TokenMetadata,

    /// EIP-1193 JSON-RPC endpoint of a wallet, if any.
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
}

fn default_backend_url() -> String {
    "https://zkauth.lookonly.ru".to_string()
}

fn default_token_address() -> String {
    "0x4E9450B3Bc25Ab02447594903f5e3fFD01893D12".to_string()
}

fn default_contract_address() -> String {
    "0xC9068cCE3bAc43984cd0c329D0e8EF96D893B25e".to_string()
}

fn default_explorer_base_url() -> String {
    "https://goerli.etherscan.io".to_string()
}

fn default_chain_id() -> String {
    // Goerli
    "0x5".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_proof_timeout() -> u64 {
    300
}

impl Default for ZkAuthConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            token_address: default_token_address(),
            contract_address: default_contract_address(),
            explorer_base_url: default_explorer_base_url(),
            chain_id: default_chain_id(),
            circuit: CircuitArtifacts::default(),
            request_timeout_secs: default_request_timeout(),
            proof_timeout_secs: default_proof_timeout(),
            token: TokenMetadata::default(),
            wallet_rpc_url: None,
        }
    }
}

impl ZkAuthConfig {
    /// Load configuration from `ZKAUTH_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, fallback: String| lookup(key).unwrap_or(fallback);
        let secs = |key: &str, fallback: u64| -> Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a number of seconds, got {:?}", key, raw)),
                None => Ok(fallback),
            }
        };

        let config = Self {
            backend_url: string("ZKAUTH_BACKEND_URL", defaults.backend_url),
            token_address: string("ZKAUTH_TOKEN_ADDRESS", defaults.token_address),
            contract_address: string("ZKAUTH_CONTRACT_ADDRESS", defaults.contract_address),
            explorer_base_url: string("ZKAUTH_EXPLORER_URL", defaults.explorer_base_url),
            chain_id: string("ZKAUTH_CHAIN_ID", defaults.chain_id),
            circuit: CircuitArtifacts {
                program: lookup("ZKAUTH_CIRCUIT_WASM")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.circuit.program),
                proving_key: lookup("ZKAUTH_CIRCUIT_ZKEY")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.circuit.proving_key),
            },
            request_timeout_secs: secs("ZKAUTH_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            proof_timeout_secs: secs("ZKAUTH_PROOF_TIMEOUT_SECS", defaults.proof_timeout_secs)?,
            token: TokenMetadata {
                symbol: string("ZKAUTH_TOKEN_SYMBOL", defaults.token.symbol),
                ..defaults.token
            },
            wallet_rpc_url: lookup("ZKAUTH_WALLET_RPC_URL").or(defaults.wallet_rpc_url),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that URLs parse and timeouts are usable.
    pub fn validate(&self) -> Result<(), ZkAuthError> {
        self.backend_url()?;
        Url::parse(&self.explorer_base_url).map_err(|e| {
            ZkAuthError::Config(format!("explorer url {:?}: {}", self.explorer_base_url, e))
        })?;
        if let Some(wallet) = &self.wallet_rpc_url {
            Url::parse(wallet)
                .map_err(|e| ZkAuthError::Config(format!("wallet rpc url {:?}: {}", wallet, e)))?;
        }
        if !self.chain_id.starts_with("0x") {
            return Err(ZkAuthError::Config(format!(
                "chain id must be hex, got {:?}",
                self.chain_id
            )));
        }
        if self.request_timeout_secs == 0 || self.proof_timeout_secs == 0 {
            return Err(ZkAuthError::Config("timeouts must be positive".into()));
        }
        Ok(())
    }

    pub fn backend_url(&self) -> Result<Url, ZkAuthError> {
        Url::parse(&self.backend_url)
            .map_err(|e| ZkAuthError::Config(format!("backend url {:?}: {}", self.backend_url, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn proof_timeout(&self) -> Duration {
        Duration::from_secs(self.proof_timeout_secs)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN METADATA
// ═══════════════════════════════════════════════════════════════════════════════

/// ERC20 details for `wallet_watchAsset`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default = "default_token_symbol")]
    pub symbol: String,
    #[serde(default = "default_token_decimals")]
    pub decimals: u8,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_token_symbol() -> String {
    "ZKT".to_string()
}

fn default_token_decimals() -> u8 {
    18
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            symbol: default_token_symbol(),
            decimals: default_token_decimals(),
            image: None,
        }
    }
}
