//! Command handlers for the `acq` binary.
//!
//! Shared setup (config loading, client construction) lives here; each
//! subcommand has its own module.

pub mod check_acquisitions;
pub mod check_ipf;
pub mod deprecate;
pub mod gunw_counts;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use acq_catalog::{CatalogClient, Credentials};
use acq_config::{
    load_layered_yaml, report_unused_keys, resolve_secrets_for_command, AcqConfig, CommandKind,
    ResolvedSecrets, UnusedKeyPolicy,
};
use acq_index::IndexClient;
use acq_reconcile::{EngineOptions, IdentityScheme};
use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

/// Exit status for a run that completed but found outstanding work.
pub const EXIT_INCOMPLETE: u8 = 2;

/// Per-run index name overrides (take precedence over config).
#[derive(Args, Debug, Clone, Default)]
pub struct IndexOverrides {
    /// AOI index (pattern allowed)
    #[arg(long = "aoi-index")]
    pub aoi_index: Option<String>,

    /// Acquisition index (pattern allowed)
    #[arg(long = "acq-index")]
    pub acq_index: Option<String>,
}

impl IndexOverrides {
    pub fn apply(&self, settings: &mut AcqConfig) {
        if let Some(i) = &self.aoi_index {
            settings.index.aoi_index = i.clone();
        }
        if let Some(i) = &self.acq_index {
            settings.index.acquisition_index = i.clone();
        }
    }
}

/// Loaded, checked configuration for one command.
pub struct CommandContext {
    pub settings: AcqConfig,
    pub secrets: ResolvedSecrets,
}

impl CommandContext {
    /// Load `paths` (defaults only when empty), report unused keys and
    /// resolve secrets for `command`.
    pub fn load(paths: &[PathBuf], command: CommandKind, strict: bool) -> Result<Self> {
        let loaded = load_layered_yaml(paths).context("loading config")?;

        let policy = if strict {
            UnusedKeyPolicy::Fail
        } else {
            UnusedKeyPolicy::Warn
        };
        let report = report_unused_keys(command, &loaded.config_json, policy)?;
        for key in &report.unused_leaf_pointers {
            warn!(command = command.as_str(), key = %key, "config key not used by this command");
        }

        let settings = loaded.settings()?;
        let secrets = resolve_secrets_for_command(&loaded.config_json, command)?;
        info!(
            command = command.as_str(),
            config_hash = %loaded.config_hash,
            layers = paths.len(),
            "config loaded"
        );

        Ok(Self { settings, secrets })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.http.timeout_secs)
    }

    pub fn index_client(&self) -> Result<IndexClient> {
        let options = acq_index::ClientOptions {
            timeout: self.timeout(),
            accept_invalid_certs: self.settings.index.accept_invalid_certs,
        };
        IndexClient::new(self.settings.index.base_url.clone(), &options)
            .context("building index client")
    }

    pub fn catalog_client(&self) -> Result<CatalogClient> {
        let options = acq_catalog::ClientOptions {
            timeout: self.timeout(),
            accept_invalid_certs: self.settings.catalog.accept_invalid_certs,
        };
        let credentials = self
            .secrets
            .catalog_login()
            .map(|(u, p)| Credentials::new(u, p));
        if credentials.is_none() {
            warn!("no catalog credentials configured; querying anonymously");
        }
        CatalogClient::new_with_base_url(self.settings.catalog.base_url.clone(), credentials, &options)
            .context("building catalog client")
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            aoi_index: self.settings.index.aoi_index.clone(),
            acquisition_index: self.settings.index.acquisition_index.clone(),
            catalog_page_size: self.settings.catalog.page_size,
            index_page_size: self.settings.index.page_size,
            identity: IdentityScheme::new(self.settings.catalog.source_tag.clone()),
        }
    }
}

pub fn exit_for(complete: bool) -> ExitCode {
    if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INCOMPLETE)
    }
}
