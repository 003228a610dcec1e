//! National Water Model discovery tool.
//!
//! Explores a local NWM mirror or a NOMADS-style listing and writes what it found as JSON:
//! - Days, configurations and files, down to the requested depth
//! - Bounded concurrent listing of days and configurations
//! - Failed subtrees reported without discarding the rest

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use nwm_catalog::{CatalogSnapshot, DiscoveryDepth, Explorer, ExplorerConfig};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "nwm-explorer")]
#[command(about = "Discover National Water Model output and dump the catalog as JSON")]
struct Args {
    /// Where to write the JSON catalog ("-" for stdout)
    #[arg(default_value = "-")]
    target: PathBuf,

    /// Explorer to use: local or remote
    #[arg(short, long)]
    explorer: Option<String>,

    /// Root address (directory for local, URL for remote)
    #[arg(short, long, env = "NOMADS_ADDRESS")]
    address: Option<String>,

    /// YAML explorer configuration; flags given on the command line take precedence
    #[arg(short, long, env = "NWM_EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of listings fetched at once
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Stop at the first listing that fails
    #[arg(long)]
    fail_fast: bool,

    /// How far to explore: days, configurations or files
    #[arg(long)]
    depth: Option<DiscoveryDepth>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Merge the configuration file (if any) with command line overrides.
    fn explorer_config(&self) -> Result<ExplorerConfig> {
        let mut config = match &self.config {
            Some(path) => ExplorerConfig::load(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => ExplorerConfig::default(),
        };

        if let Some(explorer) = &self.explorer {
            config.explorer = explorer.clone();
        }
        if let Some(address) = &self.address {
            config.address = Some(address.clone());
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = max_concurrent;
        }
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        config.fail_fast |= self.fail_fast;

        Ok(config)
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn write_snapshot(snapshot: &CatalogSnapshot, target: &Path) -> Result<()> {
    if target == Path::new("-") {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writeln!(writer)?;
        writer.flush()?;
    } else {
        let file = File::create(target)
            .with_context(|| format!("Failed to create output file: {}", target.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        info!(path = %target.display(), "Wrote catalog");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let config = args.explorer_config()?;
    let explorer = Explorer::from_config(&config).context("Invalid explorer settings")?;

    info!(
        address = %explorer.address(),
        explorer = explorer.backend(),
        depth = %config.depth,
        max_concurrent = config.max_concurrent,
        "Starting NWM discovery"
    );

    let catalog = explorer
        .explore()
        .await
        .with_context(|| format!("Failed to explore {}", explorer.address()))?;

    let report = catalog
        .load_all(&config.discovery_options())
        .await
        .context("Discovery aborted")?;

    for failure in &report.failures {
        warn!(error = %failure, "Part of the catalog could not be listed");
    }

    info!(
        days = report.days,
        configurations = report.configurations,
        files = report.files,
        failures = report.failures.len(),
        "Discovery finished"
    );

    let snapshot = CatalogSnapshot::capture(&catalog).await;
    write_snapshot(&snapshot, &args.target)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["nwm-explorer"]).unwrap();
        assert_eq!(args.target, PathBuf::from("-"));

        let config = args.explorer_config().unwrap();
        assert_eq!(config.explorer, "remote");
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.yaml");
        std::fs::write(&path, "explorer: remote\nmax_concurrent: 2\ndepth: days\n").unwrap();

        let args = Args::try_parse_from([
            "nwm-explorer",
            "--config",
            path.to_str().unwrap(),
            "--explorer",
            "local",
            "--address",
            "/data/nwm",
            "--depth",
            "configurations",
            "--fail-fast",
            "catalog.json",
        ])
        .unwrap();

        let config = args.explorer_config().unwrap();
        assert_eq!(config.explorer, "local");
        assert_eq!(config.address.as_deref(), Some("/data/nwm"));
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.depth, DiscoveryDepth::Configurations);
        assert!(config.fail_fast);
        assert_eq!(args.target, PathBuf::from("catalog.json"));
    }

    #[test]
    fn test_bad_depth_is_rejected() {
        assert!(Args::try_parse_from(["nwm-explorer", "--depth", "years"]).is_err());
    }

    #[tokio::test]
    async fn test_write_snapshot_to_file() {
        let root = tempfile::tempdir().unwrap();
        let configuration = root.path().join("nwm.20200821").join("short_range");
        std::fs::create_dir_all(&configuration).unwrap();
        std::fs::write(configuration.join("nwm.t06z.short_range.channel_rt.f001.conus.nc"), b"").unwrap();

        let address = root.path().to_string_lossy().into_owned();
        let explorer = Explorer::new(Some(address.as_str()), "local").unwrap();
        let catalog = explorer.explore().await.unwrap();
        catalog.load_all(&Default::default()).await.unwrap();

        let target = root.path().join("catalog.json");
        write_snapshot(&CatalogSnapshot::capture(&catalog).await, &target).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(json["days"][0]["name"], "nwm.20200821");
        assert_eq!(json["days"][0]["configurations"][0]["files"][0]["step"], 1);
    }
}
