use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use acq_config::CommandKind;
use acq_index::{count_by_tag, product_query, IndexClient, TagCounts};
use acq_reconcile::{paginate, IndexSource};
use anyhow::{bail, Context, Result};
use chrono::{Days, Months, NaiveDate, Utc};
use tracing::{info, warn};

use super::CommandContext;

/// First Sentinel-1 data; the lookback when none is given.
pub fn mission_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `<N>d` => N days before `today`, `<N>m` => N months before; any other
/// value means [`mission_start`].
pub fn lookback_start(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let raw = raw.trim();
    let (count, unit) = match raw.char_indices().last() {
        Some((idx, unit @ ('d' | 'm'))) => (&raw[..idx], unit),
        _ => return Ok(mission_start()),
    };
    let n: u32 = count
        .parse()
        .with_context(|| format!("invalid --time '{raw}': expected <N>d or <N>m"))?;

    let start = match unit {
        'd' => today.checked_sub_days(Days::new(u64::from(n))),
        _ => today.checked_sub_months(Months::new(n)),
    };
    match start {
        Some(s) => Ok(s),
        None => bail!("--time '{raw}' reaches before the supported date range"),
    }
}

/// Query-side rendering of the start date.
pub fn start_timestamp(date: NaiveDate) -> String {
    format!("{}T00:00:00", date.format("%Y-%m-%d"))
}

/// `all` lists every AOI; otherwise each listed id is checked and unknown
/// ones are skipped with a warning.
fn resolve_aois(
    client: &IndexClient,
    aoi_index: &str,
    raw: &str,
    page_size: usize,
) -> Result<Vec<String>> {
    if raw.trim() == "all" {
        info!(aoi_index, "querying over all AOIs");
        return client
            .list_ids(aoi_index, page_size)
            .context("listing AOI ids");
    }

    let mut aois = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if client
            .exists(aoi_index, id)
            .with_context(|| format!("checking AOI '{id}'"))?
        {
            aois.push(id.to_string());
        } else {
            warn!(aoi = id, "AOI does not exist; skipping");
        }
    }
    Ok(aois)
}

pub fn render_counts(counts: &TagCounts, start: &str, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GUNW products generated for each tag since {start}");
    let _ = writeln!(out);
    for (tag, ids) in &counts.by_tag {
        let _ = writeln!(out, "{tag}: {}", ids.len());
        if verbose {
            for id in ids {
                let _ = writeln!(out, "  {id}");
            }
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total number of GUNW products for combined tags: {}",
        counts.total()
    );
    out
}

pub fn run(
    config_paths: &[PathBuf],
    strict: bool,
    aoi_arg: &str,
    time_arg: &str,
    verbose: bool,
) -> Result<ExitCode> {
    let ctx = CommandContext::load(config_paths, CommandKind::GunwCounts, strict)?;
    let index = &ctx.settings.index;
    let client = ctx.index_client()?;

    let aois = resolve_aois(&client, &index.aoi_index, aoi_arg, index.page_size)?;
    let start = start_timestamp(lookback_start(time_arg, Utc::now().date_naive())?);
    info!(aois = aois.len(), start = %start, "counting products");

    let counts = match product_query(&aois, &start) {
        Some(query) => {
            let hits = paginate(index.page_size, |from, size| {
                client.search_page(&index.product_index, &query, from, size)
            })
            .context("querying product index")?;
            count_by_tag(&hits)
        }
        None => {
            warn!("no AOIs to count products for");
            TagCounts::default()
        }
    };

    print!("{}", render_counts(&counts, &start, verbose));
    Ok(ExitCode::SUCCESS)
}
