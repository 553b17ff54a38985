//! zkauth-client
//!
//! Client-side orchestration for zkauth: register a password commitment for a
//! login, then later prove knowledge of that password to have the backend
//! transfer tokens, without the password ever leaving the client.
//!
//! ```text
//! Credentials ──► Registration Flow ──► POST /register { login, hashedPassword }
//!             └─► Transfer Flow ──► ProofRequestBuilder ──► ProofEngine
//!                                └─► POST /login { login, proof, publicSignals, recepient }
//! ```
//!
//! Both flows report progress through a [`Session`] observable over a
//! `tokio::sync::watch` channel.

pub mod backend;
pub mod config;
pub mod credentials;
pub mod display;
pub mod error;
pub mod flows;
pub mod proof_request;
pub mod session;
pub mod wallet;

pub use backend::{AuthBackend, HttpBackend, LoginRequest, RegisterRequest};
pub use config::{TokenMetadata, ZkAuthConfig};
pub use credentials::Credentials;
pub use display::{truncate_for_display, ExplorerLinks, DISPLAY_LIMIT};
pub use error::{extract_error_message, Stage, ZkAuthError};
pub use flows::ZkAuthClient;
pub use proof_request::ProofRequestBuilder;
pub use session::{Phase, Session, SessionEvent, SessionState};
pub use wallet::{JsonRpcWallet, NoWallet, WalletError, WalletProvider};
