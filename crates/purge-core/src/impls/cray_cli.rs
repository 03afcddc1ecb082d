//! `cray` CLI adapter.
//!
//! Implements `ObjectStore` and `ImageIndex` by running the `cray` command
//! line tool as a subprocess:
//!
//! | operation              | command                                         |
//! |------------------------|-------------------------------------------------|
//! | delete object          | `cray artifacts delete <bucket> <key>`          |
//! | find storage keys      | `cray artifacts list <bucket> --format json`    |
//! | delete index entry     | `cray ims images\|recipes delete <id>`          |
//!
//! The tool reports a missing target only through its output text, so that
//! check lives in one place: [`is_not_found`].

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::ports::{ClientError, DeleteStatus, ImageIndex, IndexKind, ObjectStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraySettings {
    pub bin: PathBuf,
    pub boot_image_bucket: String,
    pub recipe_bucket: String,
    pub timeout: Duration,
}

impl Default for CraySettings {
    fn default() -> Self {
        Self {
            bin: PathBuf::from("cray"),
            boot_image_bucket: "boot-images".to_string(),
            recipe_bucket: "ims".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct CrayCli {
    settings: CraySettings,
}

/// Status phrases the tool prints for an HTTP 404.
const NOT_FOUND_PHRASES: [&str; 2] = ["not found", "404 client error"];

/// Whether the tool's output says the target does not exist.
///
/// Only whole phrases count: ids, keys and URLs echoed in the output may
/// contain the digits `404` on any failure.
pub fn is_not_found(output: &str) -> bool {
    let output = output.to_ascii_lowercase();
    NOT_FOUND_PHRASES.iter().any(|phrase| output.contains(phrase))
}

/// Whether `key` lies under `id`, as a whole path segment.
fn key_belongs_to(key: &str, id: &str) -> bool {
    key.split('/').any(|segment| segment == id)
}

#[derive(Debug, Deserialize)]
struct ArtifactListing {
    #[serde(default)]
    artifacts: Vec<ListedArtifact>,
}

#[derive(Debug, Deserialize)]
struct ListedArtifact {
    #[serde(rename = "Key")]
    key: String,
}

impl CrayCli {
    pub fn new(settings: CraySettings) -> Self {
        Self { settings }
    }

    fn bucket(&self, kind: IndexKind) -> &str {
        match kind {
            IndexKind::BootImage => &self.settings.boot_image_bucket,
            IndexKind::Recipe => &self.settings.recipe_bucket,
        }
    }

    /// Run the tool and return its stdout. A non-zero exit becomes
    /// `ClientError::NotFound` when the output says so, `Command` otherwise.
    async fn run(&self, args: &[&str]) -> Result<String, ClientError> {
        let command = format!("{} {}", self.settings.bin.display(), args.join(" "));
        tracing::debug!(%command, "running");

        let mut cmd = Command::new(&self.settings.bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.settings.timeout, cmd.output())
            .await
            .map_err(|_| ClientError::Command {
                command: command.clone(),
                output: format!("timed out after {:?}", self.settings.timeout),
            })?
            .map_err(|e| ClientError::Command {
                command: command.clone(),
                output: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let combined = format!("{stdout}{}", String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();
        tracing::debug!(%command, output = %combined, "command failed");
        if is_not_found(&combined) {
            Err(ClientError::NotFound(command))
        } else {
            Err(ClientError::Command {
                command,
                output: combined,
            })
        }
    }

    async fn delete(&self, args: &[&str]) -> Result<DeleteStatus, ClientError> {
        match self.run(args).await {
            Ok(_) => Ok(DeleteStatus::Deleted),
            Err(ClientError::NotFound(_)) => Ok(DeleteStatus::NotFound),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ObjectStore for CrayCli {
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<DeleteStatus, ClientError> {
        self.delete(&["artifacts", "delete", bucket, key]).await
    }
}

#[async_trait]
impl ImageIndex for CrayCli {
    async fn find_storage_keys(
        &self,
        kind: IndexKind,
        id: &str,
    ) -> Result<Vec<String>, ClientError> {
        let stdout = self
            .run(&["artifacts", "list", self.bucket(kind), "--format", "json"])
            .await?;
        let listing: ArtifactListing = serde_json::from_str(&stdout)
            .map_err(|e| ClientError::InvalidResponse(format!("artifact listing: {e}")))?;
        Ok(listing
            .artifacts
            .into_iter()
            .map(|a| a.key)
            .filter(|key| key_belongs_to(key, id))
            .collect())
    }

    async fn delete_storage_object(
        &self,
        kind: IndexKind,
        key: &str,
    ) -> Result<DeleteStatus, ClientError> {
        self.delete_object(self.bucket(kind), key).await
    }

    async fn delete_index_entry(
        &self,
        kind: IndexKind,
        id: &str,
    ) -> Result<DeleteStatus, ClientError> {
        let collection = match kind {
            IndexKind::BootImage => "images",
            IndexKind::Recipe => "recipes",
        };
        self.delete(&["ims", collection, "delete", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("Error: Object not found", true)]
    #[case::upper("NOT FOUND", true)]
    #[case::status_line("404 Client Error: Not Found for url: https://api-gw/apis/ims/v3/images/x", true)]
    #[case::client_error_only("Error: 404 Client Error for url", true)]
    #[case::digits_in_id(
        "Error: 500 Server Error: Internal Server Error for url: https://api-gw/apis/ims/v3/images/3f404c1e-aa",
        false
    )]
    #[case::digits_in_key("Error: 503 Server Error for sat-2.0.404.tgz", false)]
    #[case::denied("Error: access denied", false)]
    #[case::empty("", false)]
    fn classifies_not_found_output(#[case] output: &str, #[case] expected: bool) {
        assert_eq!(is_not_found(output), expected);
    }

    #[rstest]
    #[case::direct_child("img-1/rootfs", true)]
    #[case::nested("boot/img-1/kernel", true)]
    #[case::longer_id("img-10/rootfs", false)]
    #[case::id_as_prefix_of_name("img-1.bak/rootfs", false)]
    fn storage_keys_match_whole_segments(#[case] key: &str, #[case] expected: bool) {
        assert_eq!(key_belongs_to(key, "img-1"), expected);
    }

    #[tokio::test]
    async fn missing_binary_is_a_command_error() {
        let cli = CrayCli::new(CraySettings {
            bin: PathBuf::from("/nonexistent/cray"),
            ..CraySettings::default()
        });
        let err = cli.delete_object("sat", "x.tgz").await.unwrap_err();
        assert!(matches!(err, ClientError::Command { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn drives_the_tool_and_classifies_results() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = dir.path().join("cray");
        {
            let mut f = std::fs::File::create(&script).unwrap();
            write!(
                f,
                r#"#!/bin/sh
echo "$*" >> "{log}"
case "$*" in
  "artifacts delete sat gone.tgz") echo "Error: Object not found" >&2; exit 1 ;;
  "artifacts delete sat locked.tgz") echo "Error: access denied" >&2; exit 2 ;;
  "artifacts delete "*) exit 0 ;;
  "artifacts list boot-images --format json")
    echo '{{"artifacts":[{{"Key":"img-1/rootfs"}},{{"Key":"img-1/kernel"}},{{"Key":"img-10/rootfs"}},{{"Key":"img-2/rootfs"}}]}}' ;;
  "ims images delete img-1") exit 0 ;;
  "ims images delete 3f404c1e-aa")
    echo "Error: 500 Server Error: Internal Server Error for url: https://api-gw/apis/ims/v3/images/3f404c1e-aa" >&2; exit 1 ;;
  "ims recipes delete rec-1") echo "404 Client Error" >&2; exit 1 ;;
  *) echo "unexpected: $*" >&2; exit 3 ;;
esac
"#,
                log = log.display()
            )
            .unwrap();
            f.sync_all().unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cli = CrayCli::new(CraySettings {
            bin: script,
            ..CraySettings::default()
        });

        assert_eq!(cli.delete_object("sat", "x.tgz").await, Ok(DeleteStatus::Deleted));
        assert_eq!(cli.delete_object("sat", "gone.tgz").await, Ok(DeleteStatus::NotFound));
        let err = cli.delete_object("sat", "locked.tgz").await.unwrap_err();
        assert!(err.to_string().contains("access denied"));

        let keys = cli.find_storage_keys(IndexKind::BootImage, "img-1").await.unwrap();
        assert_eq!(keys, vec!["img-1/rootfs", "img-1/kernel"]);
        assert_eq!(
            cli.delete_storage_object(IndexKind::BootImage, "img-1/rootfs").await,
            Ok(DeleteStatus::Deleted)
        );
        assert_eq!(
            cli.delete_index_entry(IndexKind::BootImage, "img-1").await,
            Ok(DeleteStatus::Deleted)
        );
        assert_eq!(
            cli.delete_index_entry(IndexKind::Recipe, "rec-1").await,
            Ok(DeleteStatus::NotFound)
        );
        let err = cli
            .delete_index_entry(IndexKind::BootImage, "3f404c1e-aa")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Command { .. }));

        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(
            calls.lines().collect::<Vec<_>>(),
            vec![
                "artifacts delete sat x.tgz",
                "artifacts delete sat gone.tgz",
                "artifacts delete sat locked.tgz",
                "artifacts list boot-images --format json",
                "artifacts delete boot-images img-1/rootfs",
                "ims images delete img-1",
                "ims recipes delete rec-1",
                "ims images delete 3f404c1e-aa",
            ]
        );
    }
}
