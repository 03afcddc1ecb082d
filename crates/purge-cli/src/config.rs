//! Layered configuration: defaults, TOML file, `PURGE__` environment, flags.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use purge_core::ports::Credentials;

pub const DEFAULT_CONFIG_FILE: &str = "product-purge.toml";
pub const ENV_PREFIX: &str = "PURGE__";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PurgeConfig {
    pub catalog: CatalogConfig,
    pub nexus: NexusConfig,
    pub cray: CrayConfig,
    pub manifests: ManifestsConfig,
    pub index: IndexConfig,
    pub http: HttpConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub name: String,
    pub namespace: String,
    /// Directory holding `<namespace>/<name>.json`.
    pub dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            name: String::from("cray-product-catalog"),
            namespace: String::from("services"),
            dir: PathBuf::from("/etc/product-purge/catalog"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    pub url: String,
    pub docker_url: String,
    pub charts_repository: String,
    /// JSON file with `username` and `password`; wins over the inline pair.
    pub credentials_file: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            url: String::from("https://packages.local"),
            docker_url: String::from("https://registry.local"),
            charts_repository: String::from("charts"),
            credentials_file: None,
            username: None,
            password: None,
        }
    }
}

impl NexusConfig {
    pub fn inline_credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some(Credentials::new(u, p)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrayConfig {
    pub bin: PathBuf,
}

impl Default for CrayConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::from("cray"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestsConfig {
    pub bucket: String,
    pub prefix: String,
}

impl Default for ManifestsConfig {
    fn default() -> Self {
        Self {
            bucket: String::from("config-data"),
            prefix: String::from("config-data/"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub boot_image_bucket: String,
    pub recipe_bucket: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            boot_image_bucket: String::from("boot-images"),
            recipe_bucket: String::from("ims"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Applies to HTTP requests and to each `cray` invocation.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl PurgeConfig {
    /// Defaults, then the TOML file (`path` or `product-purge.toml`), then
    /// the environment. A missing file is skipped.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(PurgeConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    #[cfg(test)]
    fn load(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path).extract().map_err(Box::new)
    }
}
