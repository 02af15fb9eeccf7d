//! slot-timeline CLI
//!
//! Samples storage slots over a block range and reports change points.
//! Exit status: 0 sound, 2 unsound, 1 configuration or fatal-read error.

use anyhow::{Context, Result};
use clap::Parser;
use slot_timeline::config::{load_manifest, parse_slot_flag, RunConfig};
use slot_timeline::reader::{Address, EthRpcReader};
use slot_timeline::report::{print_banner, print_summary, ConsoleProgress, Report};
use slot_timeline::verdict::Verdict;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "slot-timeline")]
#[command(about = "Sample contract storage slots over a block range and report change points")]
struct Cli {
    /// RPC URL (or env RPC_URL)
    #[arg(long, env = "RPC_URL")]
    rpc: String,

    /// Contract address to inspect
    #[arg(long)]
    address: String,

    /// Start block (inclusive)
    #[arg(long)]
    from_block: u64,

    /// End block (inclusive)
    #[arg(long)]
    to_block: u64,

    /// Stride between sampled blocks
    #[arg(long, default_value_t = 500)]
    step: u64,

    /// Storage slot; repeatable. Format: 0xSLOT or label:0xSLOT
    #[arg(long)]
    slot: Vec<String>,

    /// Path to JSON manifest of slots (list or map format)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// RPC timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Emit JSON report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    // .env is optional convenience for RPC_URL; ignore a missing file.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(verdict) => verdict.exit_code(),
        Err(e) => {
            eprintln!("❌ {e:#}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<Verdict> {
    let address = Address::from_hex(&cli.address).map_err(|e| anyhow::anyhow!(e))?;

    // --slot flags win over the manifest, matching the repeatable-flag UX.
    let slots = if !cli.slot.is_empty() {
        cli.slot
            .iter()
            .map(|s| parse_slot_flag(s))
            .collect::<slot_timeline::Result<Vec<_>>>()?
    } else if let Some(ref path) = cli.manifest {
        load_manifest(path)?
    } else {
        Vec::new()
    };

    let config = RunConfig {
        rpc_url: cli.rpc,
        address,
        from_block: cli.from_block,
        to_block: cli.to_block,
        step: cli.step,
        timeout: Duration::from_secs(cli.timeout),
        slots,
    };
    config.validate()?;

    let reader = EthRpcReader::new(&config.rpc_url, config.timeout)
        .context("failed to set up RPC client")?;

    // Connectivity probe before any sampling; also feeds the banner.
    let chain_id = reader
        .chain_id()
        .await
        .context("RPC connection failed")?;
    print_banner(&config, Some(chain_id));

    let started = Instant::now();
    let mut progress = ConsoleProgress::new();
    let timelines = slot_timeline::audit(&reader, &config, &mut progress).await?;
    let elapsed = started.elapsed();

    let verdict = Verdict::from_timelines(&timelines);
    print_summary(&timelines, verdict, elapsed);

    if cli.json {
        let report = Report::new(&config, &timelines, verdict, elapsed);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(verdict)
}
