//! Nexus HTTP client.
//!
//! Implements two ports against one Nexus installation:
//! - `ContainerRegistry` through the Docker registry v2 API on the docker
//!   endpoint (resolve the tag to a digest, then delete the manifest by digest)
//! - `PackageRepository` through the Nexus REST API (`/service/rest/v1`)
//!
//! HTTP 404 is reported as `DeleteStatus::NotFound`; every other non-success
//! status is a `ClientError::Status`.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{
    ClientError, ContainerRegistry, Credentials, DeleteStatus, PackageRepository,
    RepositoryComponent,
};

/// Every manifest form the registry may hold for a tag. The registry answers
/// 404 when the stored form is not acceptable.
const MANIFEST_TYPES: &str = "application/vnd.docker.distribution.manifest.v2+json, \
application/vnd.docker.distribution.manifest.list.v2+json, \
application/vnd.oci.image.manifest.v1+json, \
application/vnd.oci.image.index.v1+json";
const DIGEST_HEADER: &str = "Docker-Content-Digest";
const REST_PREFIX: &str = "/service/rest/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NexusSettings {
    /// Base URL of the Nexus REST API.
    pub url: String,
    /// Base URL of the Docker registry endpoint.
    pub docker_url: String,
    pub timeout: Duration,
}

pub struct NexusClient {
    url: String,
    docker_url: String,
    credentials: Option<Credentials>,
    http: reqwest::Client,
}

impl NexusClient {
    pub fn new(settings: &NexusSettings, credentials: Option<Credentials>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            url: settings.url.trim_end_matches('/').to_string(),
            docker_url: settings.docker_url.trim_end_matches('/').to_string(),
            credentials,
            http,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        builder.send().await.map_err(transport)
    }

    async fn delete(&self, url: &str) -> Result<DeleteStatus, ClientError> {
        tracing::debug!(url, "DELETE");
        let resp = self.send(self.request(Method::DELETE, url)).await?;
        classify(resp).await
    }
}

#[async_trait]
impl ContainerRegistry for NexusClient {
    async fn delete_image(&self, name: &str, tag: &str) -> Result<DeleteStatus, ClientError> {
        let url = format!("{}/v2/{name}/manifests/{tag}", self.docker_url);
        let resp = self
            .send(
                self.request(Method::GET, &url)
                    .header(reqwest::header::ACCEPT, MANIFEST_TYPES),
            )
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteStatus::NotFound);
        }
        let resp = ensure_success(resp).await?;
        let digest = resp
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ClientError::InvalidResponse(format!("no {DIGEST_HEADER} header for {name}:{tag}"))
            })?
            .to_string();

        tracing::debug!(image = %format!("{name}:{tag}"), %digest, "resolved image digest");
        self.delete(&format!("{}/v2/{name}/manifests/{digest}", self.docker_url))
            .await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentPage {
    items: Vec<RawComponent>,
    continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    id: String,
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[async_trait]
impl PackageRepository for NexusClient {
    async fn list_components(
        &self,
        repository: &str,
    ) -> Result<Vec<RepositoryComponent>, ClientError> {
        let url = format!("{}{REST_PREFIX}/components", self.url);
        let mut components = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut builder = self
                .request(Method::GET, &url)
                .query(&[("repository", repository)]);
            if let Some(t) = &token {
                builder = builder.query(&[("continuationToken", t.as_str())]);
            }
            let resp = ensure_success(self.send(builder).await?).await?;
            let page: ComponentPage = resp
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

            components.extend(page.items.into_iter().map(|c| RepositoryComponent {
                id: c.id,
                name: c.name,
                version: c.version.unwrap_or_default(),
            }));
            match page.continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(components)
    }

    async fn delete_component(&self, id: &str) -> Result<DeleteStatus, ClientError> {
        self.delete(&format!("{}{REST_PREFIX}/components/{id}", self.url))
            .await
    }

    async fn delete_repository(&self, name: &str) -> Result<DeleteStatus, ClientError> {
        self.delete(&format!("{}{REST_PREFIX}/repositories/{name}", self.url))
            .await
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

async fn classify(resp: Response) -> Result<DeleteStatus, ClientError> {
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(DeleteStatus::NotFound);
    }
    ensure_success(resp).await?;
    Ok(DeleteStatus::Deleted)
}

async fn ensure_success(resp: Response) -> Result<Response, ClientError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(ClientError::Status { status, message })
    }
}
