use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use acq_config::CommandKind;
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use super::CommandContext;

const DEPRECATED_TAG: &str = "deprecated";

/// Ids from `path`: one per line, trimmed, blanks and `#` comments skipped.
pub fn read_ids(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read id file: {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn deprecation_doc() -> Value {
    json!({ "metadata": { "tags": DEPRECATED_TAG } })
}

pub fn run(
    config_paths: &[PathBuf],
    strict: bool,
    file: &Path,
    acq_index: Option<&str>,
    dry_run: bool,
) -> Result<ExitCode> {
    let ctx = CommandContext::load(config_paths, CommandKind::Deprecate, strict)?;
    let index = acq_index.unwrap_or(&ctx.settings.index.acquisition_index);
    if index.contains('*') {
        bail!(
            "deprecate needs a concrete acquisition index, got pattern '{index}'; \
             pass --acq-index or set /index/acquisition_index"
        );
    }
    let doc_type = ctx.settings.index.acquisition_doc_type.as_deref();

    let ids = read_ids(file)?;
    info!(count = ids.len(), index, dry_run, "deprecating acquisitions");

    if dry_run {
        for id in &ids {
            println!("would_deprecate={id}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let client = ctx.index_client()?;
    let doc = deprecation_doc();
    for (stamped, id) in ids.iter().enumerate() {
        client
            .update_doc(index, doc_type, id, &doc)
            .with_context(|| {
                format!("deprecating '{id}' failed after {stamped} of {} stamped", ids.len())
            })?;
        println!("deprecated={id}");
    }
    println!("stamped={}", ids.len());
    Ok(ExitCode::SUCCESS)
}
