//! Typed view over the merged configuration.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest `rows` value the catalog search endpoint accepts.
pub const CATALOG_MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcqConfig {
    pub catalog: CatalogSettings,
    pub index: IndexSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    /// 1..=[`CATALOG_MAX_PAGE_SIZE`].
    pub page_size: usize,
    pub accept_invalid_certs: bool,
    /// Suffix of catalog-derived acquisition ids.
    pub source_tag: String,
    /// Env var NAMES holding the catalog login.
    pub credentials_env: CredentialEnvNames,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialEnvNames {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub base_url: String,
    pub aoi_index: String,
    pub acquisition_index: String,
    /// Mapping type for partial updates on servers that still need one.
    pub acquisition_doc_type: Option<String>,
    pub product_index: String,
    pub page_size: usize,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://scihub.copernicus.eu/apihub".to_string(),
            page_size: CATALOG_MAX_PAGE_SIZE,
            accept_invalid_certs: false,
            source_tag: "esa_scihub".to_string(),
            credentials_env: CredentialEnvNames::default(),
        }
    }
}

impl Default for CredentialEnvNames {
    fn default() -> Self {
        Self {
            username: "SCIHUB_USERNAME".to_string(),
            password: "SCIHUB_PASSWORD".to_string(),
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            aoi_index: "grq_*_area_of_interest".to_string(),
            acquisition_index: "grq_*_acquisition-s1-iw_slc".to_string(),
            acquisition_doc_type: None,
            product_index: "grq_*_s1-gunw".to_string(),
            page_size: 1000,
            accept_invalid_certs: false,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl AcqConfig {
    /// Deserialize and validate. Unset keys take their defaults.
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: AcqConfig = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: config does not match the expected shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=CATALOG_MAX_PAGE_SIZE).contains(&self.catalog.page_size) {
            bail!(
                "CONFIG_INVALID: /catalog/page_size must be in 1..={CATALOG_MAX_PAGE_SIZE}, got {}",
                self.catalog.page_size
            );
        }
        if self.index.page_size == 0 {
            bail!("CONFIG_INVALID: /index/page_size must be > 0");
        }
        if self.http.timeout_secs == 0 {
            bail!("CONFIG_INVALID: /http/timeout_secs must be > 0");
        }
        for (ptr, url) in [
            ("/catalog/base_url", &self.catalog.base_url),
            ("/index/base_url", &self.index.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("CONFIG_INVALID: {ptr} must be an http(s) URL, got '{url}'");
            }
        }
        Ok(())
    }
}
