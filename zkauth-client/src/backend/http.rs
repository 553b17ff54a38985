use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{AuthBackend, LoginRequest, RegisterRequest, RegistrationStatus, ServerResponse};
use crate::config::ZkAuthConfig;
use crate::error::{interpret_failure, Stage, ZkAuthError};

const REGISTRATION_FAILED: &str = "Registration failed.";
const LOGIN_FAILED: &str = "login failed.";
const STATUS_UNAVAILABLE: &str = "Registration status unavailable.";

/// zkauth backend over HTTP/JSON.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: Url,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ZkAuthError> {
        if base_url.cannot_be_a_base() {
            return Err(ZkAuthError::Config(format!(
                "backend url {} cannot carry paths",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ZkAuthError::Config(format!("http client: {}", e)))?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    pub fn from_config(config: &ZkAuthConfig) -> Result<Self, ZkAuthError> {
        Self::new(config.backend_url()?, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ZkAuthError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ZkAuthError::Config(format!("backend url {} cannot carry paths", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request_error(&self, stage: Stage, err: reqwest::Error) -> ZkAuthError {
        if err.is_timeout() {
            ZkAuthError::Timeout {
                stage,
                secs: self.timeout.as_secs(),
            }
        } else {
            ZkAuthError::Transport {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // HTTP HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        stage: Stage,
        fallback: &str,
    ) -> Result<T, ZkAuthError> {
        debug!(%url, "GET");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(stage, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(stage, e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "backend request failed");
            return Err(interpret_failure(Some(status.as_u16()), &body, fallback));
        }

        serde_json::from_str(&body).map_err(|_| interpret_failure(Some(status.as_u16()), &body, fallback))
    }

    async fn post_for_tx<R: Serialize + ?Sized>(
        &self,
        url: Url,
        payload: &R,
        stage: Stage,
        fallback: &str,
    ) -> Result<String, ZkAuthError> {
        debug!(%url, "POST");
        let response = self
            .http_client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.request_error(stage, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(stage, e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "backend request failed");
            return Err(interpret_failure(Some(status.as_u16()), &body, fallback));
        }

        let reply: ServerResponse = serde_json::from_str(&body)
            .map_err(|_| interpret_failure(Some(status.as_u16()), &body, fallback))?;

        match reply {
            ServerResponse { tx: Some(tx), .. } if !tx.is_empty() => Ok(tx),
            ServerResponse { error: Some(message), .. } if !message.is_empty() => {
                Err(ZkAuthError::Backend { message })
            }
            _ => Err(ZkAuthError::Backend {
                message: fallback.to_string(),
            }),
        }
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn is_user_registered(&self, login: &str) -> Result<bool, ZkAuthError> {
        let url = self.endpoint(&["isUserRegistered", login])?;
        let status: RegistrationStatus = self
            .get_json(url, Stage::RegistrationCheck, STATUS_UNAVAILABLE)
            .await?;
        Ok(status.is_user_registered)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, ZkAuthError> {
        let url = self.endpoint(&["register"])?;
        self.post_for_tx(url, request, Stage::Registration, REGISTRATION_FAILED)
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<String, ZkAuthError> {
        let url = self.endpoint(&["login"])?;
        self.post_for_tx(url, request, Stage::Transfer, LOGIN_FAILED)
            .await
    }
}
