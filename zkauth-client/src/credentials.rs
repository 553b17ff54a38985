//! User input held for the duration of a flow.

use std::fmt;

use zeroize::Zeroizing;
use zkauth_common::{password_len, MAX_PASSWORD_LEN};

use crate::error::{ZkAuthError, MISSING_FIELDS};

/// Length of an EVM address including the `0x` prefix.
pub const RECIPIENT_LEN: usize = 42;

/// Login, password and transfer recipient. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    password: Zeroizing<String>,
    pub recipient: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: Zeroizing::new(password.into()),
            recipient: String::new(),
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Login and password are present and the password fits the circuit.
    pub fn validate_login(&self) -> Result<(), ZkAuthError> {
        if self.login.is_empty() || self.password.is_empty() {
            return Err(ZkAuthError::Validation(MISSING_FIELDS.to_string()));
        }
        if password_len(&self.password) > MAX_PASSWORD_LEN {
            return Err(ZkAuthError::Validation(format!(
                "Password must be at most {} characters.",
                MAX_PASSWORD_LEN
            )));
        }
        Ok(())
    }

    /// Everything a transfer needs, including an address-shaped recipient.
    pub fn validate_transfer(&self) -> Result<(), ZkAuthError> {
        self.validate_login()?;
        let len = self.recipient.encode_utf16().count();
        if len != RECIPIENT_LEN {
            return Err(ZkAuthError::Validation(format!(
                "Recipient must be a {}-character address, got {} characters.",
                RECIPIENT_LEN, len
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}
