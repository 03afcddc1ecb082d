//! File-backed catalog store.
//!
//! A record lives at `<root>/<namespace>/<name>.json` as a JSON object of
//! `product name -> entry text`. Writes go to a temporary sibling file that
//! is then renamed over the record, so a reader never sees a partial write.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::ports::{CatalogLocation, CatalogRecord, CatalogStore, ClientError};

pub struct FileCatalogStore {
    root: PathBuf,
}

impl FileCatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, location: &CatalogLocation) -> PathBuf {
        self.root
            .join(&location.namespace)
            .join(format!("{}.json", location.name))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> ClientError {
    ClientError::Transport(format!("{}: {err}", path.display()))
}

#[async_trait]
impl CatalogStore for FileCatalogStore {
    async fn read(&self, location: &CatalogLocation) -> Result<CatalogRecord, ClientError> {
        let path = self.path_of(location);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::NotFound(format!("catalog {location}")));
            }
            Err(e) => return Err(io_error(&path, e)),
        };
        serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {e}", path.display())))
    }

    async fn write(
        &self,
        location: &CatalogLocation,
        record: &CatalogRecord,
    ) -> Result<(), ClientError> {
        let path = self.path_of(location);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, e))?;
        }

        let text = serde_json::to_string_pretty(record)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(path = %path.display(), products = record.len(), "wrote catalog");
        Ok(())
    }
}
