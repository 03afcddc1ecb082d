//! CredentialProvider port - registry credentials, resolved once at start.
//!
//! A provider that cannot produce credentials is not fatal: the caller logs a
//! warning and continues without them.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use super::ClientError;

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` means the provider is configured but has nothing to offer.
    async fn credentials(&self) -> Result<Option<Credentials>, ClientError>;
}
