//! Display helpers: bounded messages and block-explorer links.

use crate::config::ZkAuthConfig;

/// Longest message or tx reference shown to the user, in characters.
pub const DISPLAY_LIMIT: usize = 100;

/// First [`DISPLAY_LIMIT`] characters of `text`.
pub fn truncate_for_display(text: &str) -> &str {
    match text.char_indices().nth(DISPLAY_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Explorer URLs for the configured deployment.
#[derive(Clone, Debug)]
pub struct ExplorerLinks {
    base: String,
    token_address: String,
    contract_address: String,
}

impl ExplorerLinks {
    pub fn new(config: &ZkAuthConfig) -> Self {
        Self {
            base: config.explorer_base_url.trim_end_matches('/').to_string(),
            token_address: config.token_address.clone(),
            contract_address: config.contract_address.clone(),
        }
    }

    pub fn tx(&self, tx_ref: &str) -> String {
        format!("{}/tx/{}", self.base, tx_ref)
    }

    pub fn token(&self) -> String {
        format!("{}/token/{}", self.base, self.token_address)
    }

    pub fn contract(&self) -> String {
        format!("{}/address/{}", self.base, self.contract_address)
    }
}
