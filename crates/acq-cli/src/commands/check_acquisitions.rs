use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use acq_config::CommandKind;
use acq_reconcile::{AcquisitionRecord, ReconciliationEngine, ReconciliationResult};
use anyhow::{Context, Result};

use super::{exit_for, CommandContext, IndexOverrides};

pub fn run(
    config_paths: &[PathBuf],
    strict: bool,
    aoi: &str,
    track: u32,
    indexes: &IndexOverrides,
    json: bool,
) -> Result<ExitCode> {
    let mut ctx = CommandContext::load(config_paths, CommandKind::CheckAcquisitions, strict)?;
    indexes.apply(&mut ctx.settings);

    let engine = ReconciliationEngine::new(
        ctx.catalog_client()?,
        ctx.index_client()?,
        ctx.engine_options(),
    );
    let result = engine
        .reconcile_aoi(aoi, track)
        .with_context(|| format!("reconciling AOI '{aoi}' track {track}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result));
    }
    Ok(exit_for(result.is_fully_reconciled()))
}

fn ingestion(r: &AcquisitionRecord) -> String {
    r.ingestion_time
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_report(result: &ReconciliationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "catalog_count={}", result.catalog_count);
    let _ = writeln!(out, "index_count={}", result.index_count);

    if result.is_fully_reconciled() {
        let _ = writeln!(out, "There are no missing acquisitions!");
        return out;
    }

    let _ = writeln!(out, "Missing acquisition count: {}", result.outstanding());
    for r in &result.missing {
        let _ = writeln!(out, "MISSING {} ingestion={}", r.title, ingestion(r));
    }
    for r in &result.stale {
        let _ = writeln!(out, "STALE {} ingestion={}", r.title, ingestion(r));
    }
    out
}
