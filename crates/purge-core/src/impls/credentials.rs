//! Credential providers for the Nexus client.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::ports::{ClientError, CredentialProvider, Credentials};

/// Credentials known up front (configuration or environment).
pub struct StaticCredentials(Option<Credentials>);

impl StaticCredentials {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self(credentials)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Option<Credentials>, ClientError> {
        Ok(self.0.clone())
    }
}

/// Reads `{"username": .., "password": ..}` from a JSON file.
///
/// The file is typically a mounted secret.
pub struct FileCredentialProvider {
    path: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn credentials(&self) -> Result<Option<Credentials>, ClientError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::NotFound(format!(
                    "credentials file {}",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(ClientError::Transport(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };
        let credentials: Credentials = serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Some(credentials))
    }
}
