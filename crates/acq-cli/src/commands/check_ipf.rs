use std::path::PathBuf;
use std::process::ExitCode;

use acq_config::CommandKind;
use acq_reconcile::IpfChecker;
use anyhow::{Context, Result};
use serde_json::json;

use super::{exit_for, CommandContext, IndexOverrides};

pub fn run(
    config_paths: &[PathBuf],
    strict: bool,
    aoi: &str,
    track: u32,
    indexes: &IndexOverrides,
    json: bool,
) -> Result<ExitCode> {
    let mut ctx = CommandContext::load(config_paths, CommandKind::CheckIpf, strict)?;
    indexes.apply(&mut ctx.settings);

    let index = &ctx.settings.index;
    let checker = IpfChecker::new(
        ctx.index_client()?,
        index.aoi_index.clone(),
        index.acquisition_index.clone(),
        index.page_size,
    );
    let window = checker
        .load_window(aoi, track)
        .with_context(|| format!("loading AOI '{aoi}'"))?;
    let missing = checker
        .missing_ipf(&window)
        .with_context(|| format!("checking ipf for AOI '{aoi}' track {track}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "missing_ipf": missing }))?);
    } else {
        print!("{}", render_report(&missing));
    }
    Ok(exit_for(missing.is_empty()))
}

pub fn render_report(missing: &[String]) -> String {
    if missing.is_empty() {
        return "There are no missing ipfs!\n".to_string();
    }
    let mut out = format!("Missing ipfs count: {}\nAcquisitions:\n", missing.len());
    for id in missing {
        out.push_str(id);
        out.push('\n');
    }
    out
}
