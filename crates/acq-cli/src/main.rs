use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{check_acquisitions, check_ipf, deprecate, gunw_counts, IndexOverrides};

#[derive(Parser)]
#[command(name = "acq")]
#[command(about = "Sentinel-1 acquisition completeness tools", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> site -> overrides)
    #[arg(long = "config", global = true)]
    config_paths: Vec<PathBuf>,

    /// Fail instead of warn when the config carries keys the command never reads
    #[arg(long, global = true, default_value_t = false)]
    strict_config: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare catalog and index over an AOI + track; exit 2 when incomplete
    CheckAcquisitions {
        /// AOI id
        #[arg(long)]
        aoi: String,

        /// Relative orbit (track) number
        #[arg(long)]
        track: u32,

        #[command(flatten)]
        indexes: IndexOverrides,

        /// Print the result as JSON instead of report lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List index acquisitions over an AOI + track whose IPF is not filled
    CheckIpf {
        #[arg(long)]
        aoi: String,

        #[arg(long)]
        track: u32,

        #[command(flatten)]
        indexes: IndexOverrides,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Tag the acquisitions listed in a file as deprecated
    Deprecate {
        /// One acquisition id per line
        #[arg(long, default_value = "deprecate_acq.txt")]
        file: PathBuf,

        /// Concrete acquisition index to update (patterns are refused)
        #[arg(long = "acq-index")]
        acq_index: Option<String>,

        /// Print what would be stamped without touching the index
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Count generated interferogram products per AOI tag
    GunwCounts {
        /// `all` or a comma-separated list of AOI ids
        #[arg(long, default_value = "all")]
        aoi: String,

        /// Lookback: `<N>d`, `<N>m`, anything else means since mission start
        #[arg(long, default_value = "1d")]
        time: String,

        /// Also print product ids under each tag
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let config_paths = cli.config_paths;
    let strict = cli.strict_config;

    match cli.cmd {
        Commands::CheckAcquisitions {
            aoi,
            track,
            indexes,
            json,
        } => check_acquisitions::run(&config_paths, strict, &aoi, track, &indexes, json),

        Commands::CheckIpf {
            aoi,
            track,
            indexes,
            json,
        } => check_ipf::run(&config_paths, strict, &aoi, track, &indexes, json),

        Commands::Deprecate {
            file,
            acq_index,
            dry_run,
        } => deprecate::run(&config_paths, strict, &file, acq_index.as_deref(), dry_run),

        Commands::GunwCounts { aoi, time, verbose } => {
            gunw_counts::run(&config_paths, strict, &aoi, &time, verbose)
        }

        Commands::ConfigHash { paths } => {
            let loaded = acq_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr; stdout carries the report.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
