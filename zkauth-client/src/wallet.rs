//! Optional wallet integration.
//!
//! Switching the active network and registering the token are conveniences:
//! callers log failures and carry on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::TokenMetadata;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no wallet configured")]
    NotConfigured,

    #[error("wallet request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON-RPC error object returned by the wallet.
    #[error("wallet rejected {method}: {message} (code {code})")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn is_available(&self) -> bool;

    /// `wallet_switchEthereumChain` to the hex `chain_id`.
    async fn switch_network(&self, chain_id: &str) -> Result<(), WalletError>;

    /// `wallet_watchAsset` for the ERC20 at `address`.
    async fn watch_asset(&self, address: &str, token: &TokenMetadata) -> Result<(), WalletError>;
}

/// Used when no wallet endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoWallet;

#[async_trait]
impl WalletProvider for NoWallet {
    fn is_available(&self) -> bool {
        false
    }

    async fn switch_network(&self, _chain_id: &str) -> Result<(), WalletError> {
        Err(WalletError::NotConfigured)
    }

    async fn watch_asset(&self, _address: &str, _token: &TokenMetadata) -> Result<(), WalletError> {
        Err(WalletError::NotConfigured)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EIP-1193 OVER JSON-RPC
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Wallet reached through an HTTP JSON-RPC endpoint.
pub struct JsonRpcWallet {
    endpoint: Url,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, WalletError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<(), WalletError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, endpoint = %self.endpoint, "wallet request");

        let response: RpcResponse = self
            .http_client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match response.error {
            Some(err) => Err(WalletError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    fn is_available(&self) -> bool {
        true
    }

    async fn switch_network(&self, chain_id: &str) -> Result<(), WalletError> {
        self.call("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await
    }

    async fn watch_asset(&self, address: &str, token: &TokenMetadata) -> Result<(), WalletError> {
        self.call("wallet_watchAsset", watch_asset_params(address, token))
            .await
    }
}

fn watch_asset_params(address: &str, token: &TokenMetadata) -> Value {
    json!({
        "type": "ERC20",
        "options": {
            "address": address,
            "symbol": token.symbol,
            "decimals": token.decimals,
            "image": token.image,
        }
    })
}
