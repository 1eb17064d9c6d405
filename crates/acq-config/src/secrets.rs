//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only env var NAMES (`catalog.credentials_env.*`).
//! - Callers resolve once at startup via [`resolve_secrets_for_command`] and
//!   pass the result into client constructors.
//! - `Debug` redacts values; errors name the variable, never its value.
//!
//! Catalog credentials are all-or-nothing: `check-acquisitions` runs
//! anonymously when neither variable is set and fails when only one is.
//! The other commands resolve nothing.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::{AcqConfig, CommandKind};

#[derive(Clone, Default)]
pub struct ResolvedSecrets {
    pub catalog_username: Option<String>,
    pub catalog_password: Option<String>,
}

impl ResolvedSecrets {
    /// `(username, password)` when both are present.
    pub fn catalog_login(&self) -> Option<(&str, &str)> {
        match (&self.catalog_username, &self.catalog_password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "catalog_username",
                &self.catalog_username.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "catalog_password",
                &self.catalog_password.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Unset or blank counts as absent.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

pub fn resolve_secrets_for_command(
    config_json: &Value,
    command: CommandKind,
) -> Result<ResolvedSecrets> {
    if command != CommandKind::CheckAcquisitions {
        return Ok(ResolvedSecrets::default());
    }

    let names = AcqConfig::from_json(config_json)?.catalog.credentials_env;
    let username = resolve_env(&names.username);
    let password = resolve_env(&names.password);

    match (&username, &password) {
        (Some(_), None) => bail!(
            "SECRETS_INCOMPLETE command={}: env var '{}' is set but '{}' (catalog password) is not",
            command.as_str(),
            names.username,
            names.password,
        ),
        (None, Some(_)) => bail!(
            "SECRETS_INCOMPLETE command={}: env var '{}' is set but '{}' (catalog username) is not",
            command.as_str(),
            names.password,
            names.username,
        ),
        _ => {}
    }

    Ok(ResolvedSecrets {
        catalog_username: username,
        catalog_password: password,
    })
}
