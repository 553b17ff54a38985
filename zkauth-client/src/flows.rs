//! Registration and transfer flows.
//!
//! Each flow runs its steps strictly in order, reports progress through the
//! shared [`Session`] and settles it exactly once. Nothing is retried.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;
use zkauth_common::password_to_secret;
use zkauth_prover::ProofEngine;

use crate::backend::{AuthBackend, HttpBackend, LoginRequest, RegisterRequest};
use crate::config::ZkAuthConfig;
use crate::credentials::Credentials;
use crate::display::ExplorerLinks;
use crate::error::{Stage, ZkAuthError};
use crate::proof_request::ProofRequestBuilder;
use crate::session::{BackendOutcome, FlowKind, FlowTicket, Session, SessionEvent, SessionState};
use crate::wallet::{JsonRpcWallet, NoWallet, WalletProvider};

pub const REGISTERING_MESSAGE: &str = "Registering... Please wait.";
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "Registration successful!";
pub const CREATING_PROOF_MESSAGE: &str = "Creating proof... Please wait.";
pub const TRANSFER_SUCCESS_MESSAGE: &str = "Transfer successful!";

/// Orchestrates registration and proof-authorized transfers against one
/// deployment.
#[derive(Clone)]
pub struct ZkAuthClient {
    config: ZkAuthConfig,
    backend: Arc<dyn AuthBackend>,
    prover: ProofRequestBuilder,
    wallet: Arc<dyn WalletProvider>,
    session: Arc<Session>,
    explorer: ExplorerLinks,
}

impl ZkAuthClient {
    pub fn new(
        config: ZkAuthConfig,
        backend: Arc<dyn AuthBackend>,
        engine: Arc<dyn ProofEngine>,
    ) -> Self {
        let prover = ProofRequestBuilder::new(engine, config.circuit.clone(), config.proof_timeout());
        let explorer = ExplorerLinks::new(&config);
        Self {
            config,
            backend,
            prover,
            wallet: Arc::new(NoWallet),
            session: Arc::new(Session::new()),
            explorer,
        }
    }

    /// Client talking HTTP to the configured backend, with a JSON-RPC wallet
    /// when `wallet_rpc_url` is set.
    pub fn connect(config: ZkAuthConfig, engine: Arc<dyn ProofEngine>) -> Result<Self, ZkAuthError> {
        config.validate()?;
        let backend = Arc::new(HttpBackend::from_config(&config)?);
        let wallet: Option<Arc<dyn WalletProvider>> = match &config.wallet_rpc_url {
            Some(raw) => {
                let endpoint = Url::parse(raw)
                    .map_err(|e| ZkAuthError::Config(format!("wallet rpc url {:?}: {}", raw, e)))?;
                let wallet = JsonRpcWallet::new(endpoint, config.request_timeout())
                    .map_err(|e| ZkAuthError::Config(e.to_string()))?;
                Some(Arc::new(wallet))
            }
            None => None,
        };

        let client = Self::new(config, backend, engine);
        Ok(match wallet {
            Some(wallet) => client.with_wallet(wallet),
            None => client,
        })
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = wallet;
        self
    }

    pub fn config(&self) -> &ZkAuthConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn AuthBackend> {
        &self.backend
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn explorer(&self) -> &ExplorerLinks {
        &self.explorer
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FLOWS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Register the commitment of `credentials.password` under
    /// `credentials.login`. Returns the registration transaction reference.
    pub async fn register(&self, credentials: &Credentials) -> Result<String, ZkAuthError> {
        let ticket = self.session.begin(FlowKind::Registration);
        info!(login = %credentials.login, generation = ticket.generation, "registration started");

        let result = self.run_registration(ticket, credentials).await;
        self.settle(ticket, &result, REGISTRATION_SUCCESS_MESSAGE);
        result
    }

    async fn run_registration(
        &self,
        ticket: FlowTicket,
        credentials: &Credentials,
    ) -> Result<String, ZkAuthError> {
        credentials.validate_login()?;

        let registered = self
            .within(
                Stage::RegistrationCheck,
                self.backend.is_user_registered(&credentials.login),
            )
            .await?;
        if registered {
            return Err(ZkAuthError::AlreadyRegistered {
                login: credentials.login.clone(),
            });
        }

        let secret = password_to_secret(credentials.password())?;
        let request = RegisterRequest {
            login: credentials.login.clone(),
            hashed_password: secret.commitment(),
        };

        self.session.apply(SessionEvent::Progress {
            generation: ticket.generation,
            message: REGISTERING_MESSAGE.to_string(),
        });

        self.within(Stage::Registration, self.backend.register(&request))
            .await
    }

    /// Prove knowledge of the registered password and have the backend move
    /// tokens to `credentials.recipient`. Returns the transfer transaction
    /// reference.
    pub async fn transfer(&self, credentials: &Credentials) -> Result<String, ZkAuthError> {
        let ticket = self.session.begin(FlowKind::Transfer);
        info!(login = %credentials.login, generation = ticket.generation, "transfer started");

        let result = self.run_transfer(ticket, credentials).await;
        self.settle(ticket, &result, TRANSFER_SUCCESS_MESSAGE);
        result
    }

    async fn run_transfer(
        &self,
        ticket: FlowTicket,
        credentials: &Credentials,
    ) -> Result<String, ZkAuthError> {
        credentials.validate_transfer()?;

        self.session.apply(SessionEvent::Progress {
            generation: ticket.generation,
            message: CREATING_PROOF_MESSAGE.to_string(),
        });

        let proof = self.prover.build(credentials.password()).await?;

        self.session.apply(SessionEvent::ProofReady {
            generation: ticket.generation,
        });

        let request = LoginRequest {
            login: credentials.login.clone(),
            proof: proof.proof,
            public_signals: proof.public_signals,
            recipient: credentials.recipient.clone(),
        };
        self.within(Stage::Transfer, self.backend.login(&request))
            .await
    }

    /// Ask the wallet to switch to the configured chain and track the token.
    /// Failures are logged only.
    pub async fn prepare_wallet(&self) {
        if !self.wallet.is_available() {
            debug!("no wallet configured, skipping network switch");
            return;
        }

        if let Err(e) = self.wallet.switch_network(&self.config.chain_id).await {
            warn!(chain_id = %self.config.chain_id, error = %e, "failed to switch wallet network");
        }

        if let Err(e) = self
            .wallet
            .watch_asset(&self.config.token_address, &self.config.token)
            .await
        {
            warn!(token = %self.config.token_address, error = %e, "failed to register token with wallet");
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    async fn within<T, F>(&self, stage: Stage, request: F) -> Result<T, ZkAuthError>
    where
        F: Future<Output = Result<T, ZkAuthError>>,
    {
        let limit = self.config.request_timeout();
        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => Err(ZkAuthError::Timeout {
                stage,
                secs: limit.as_secs(),
            }),
        }
    }

    fn settle(&self, ticket: FlowTicket, result: &Result<String, ZkAuthError>, success: &str) {
        let generation = ticket.generation;
        let event = match result {
            Ok(tx_ref) => {
                info!(generation, flow = ?ticket.flow, tx = %tx_ref, "flow succeeded");
                SessionEvent::BackendResponded {
                    generation,
                    outcome: BackendOutcome::Success {
                        message: success.to_string(),
                        tx_ref: tx_ref.clone(),
                    },
                }
            }
            Err(e) if e.is_backend_response() => {
                warn!(generation, flow = ?ticket.flow, error = %e, "backend rejected request");
                SessionEvent::BackendResponded {
                    generation,
                    outcome: BackendOutcome::Error {
                        message: e.user_message(),
                    },
                }
            }
            Err(e) => {
                warn!(generation, flow = ?ticket.flow, error = %e, "flow failed");
                SessionEvent::Failed {
                    generation,
                    message: e.user_message(),
                }
            }
        };

        if !self.session.apply(event) {
            debug!(generation, "flow superseded, feedback discarded");
        }
    }
}
