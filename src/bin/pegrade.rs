use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pegrade::{empty_context, BlockGrader, GradedBlock, GraderConfig, LxrHasher, SharedHasher, Version};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pegrade")]
#[command(about = "Grade price-oracle submissions for a block")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a small hash table. Difficulties will not match the network.
    #[arg(long, global = true)]
    unit_test_hash: bool,

    /// Hash table cache file, read if present and written otherwise
    #[arg(long, global = true)]
    hash_table: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one or more batch files, each on its own thread
    Grade {
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Tournament window (defaults to the configured cutoff)
        #[arg(long)]
        cutoff: Option<usize>,

        #[arg(long)]
        pretty: bool,
    },
    /// Show grading parameters
    Policy {
        /// Version name such as V3 or S1 (all versions when omitted)
        version: Option<String>,
    },
}

/// One block's worth of raw entries. Byte fields are hex.
#[derive(Debug, Deserialize)]
struct Batch {
    version: Version,
    height: i32,
    #[serde(default)]
    previous_winners: Option<Vec<String>>,
    #[serde(default)]
    block_key: Option<String>,
    entries: Vec<BatchEntry>,
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    entry_hash: String,
    ext_ids: Vec<String>,
    content: String,
}

#[derive(Debug, Serialize)]
struct Rejection {
    index: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct WinnerRow {
    position: usize,
    entry_hash: String,
    coinbase: String,
    grade: f64,
    payout: i64,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    input: String,
    version: Version,
    height: i32,
    accepted: usize,
    rejected: Vec<Rejection>,
    cutoff: usize,
    graded: usize,
    winners: Vec<WinnerRow>,
    short_hashes: Vec<String>,
    total_payout: i64,
    graded_at: DateTime<Utc>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Policy { version } => print_policy(version.as_deref()),
        Commands::Grade { inputs, cutoff, pretty } => {
            let config = load_config(cli.config.as_deref(), cli.unit_test_hash, cli.hash_table)?;
            let hasher = LxrHasher::shared(&config.hash)?;
            let reports = grade_batches(&inputs, cutoff, &config, &hasher)?;

            let out = if pretty {
                serde_json::to_string_pretty(&reports)?
            } else {
                serde_json::to_string(&reports)?
            };
            println!("{}", out);
            Ok(())
        }
    }
}

fn load_config(
    path: Option<&Path>,
    unit_test_hash: bool,
    hash_table: Option<PathBuf>,
) -> anyhow::Result<GraderConfig> {
    let mut config = match path {
        Some(path) => GraderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GraderConfig::mainnet(),
    };

    if unit_test_hash {
        log::warn!("Using the unit-test hash table; difficulties will not match the network");
        config.hash = GraderConfig::unit_test().hash;
    } else {
        config.hash.apply_env();
    }
    if hash_table.is_some() {
        config.hash.table_path = hash_table;
    }

    config.validate()?;
    Ok(config)
}

fn print_policy(version: Option<&str>) -> anyhow::Result<()> {
    let versions = match version {
        Some(name) => vec![name.parse::<Version>()?],
        None => Version::ALL.to_vec(),
    };
    let policies: Vec<_> = versions.iter().map(|v| v.policy()).collect();
    println!("{}", serde_json::to_string_pretty(&policies)?);
    Ok(())
}

fn grade_batches(
    inputs: &[PathBuf],
    cutoff: Option<usize>,
    config: &GraderConfig,
    hasher: &SharedHasher,
) -> anyhow::Result<Vec<BatchReport>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|path| scope.spawn(move || grade_file(path, cutoff, config, hasher.clone())))
            .collect();

        handles
            .into_iter()
            .zip(inputs)
            .map(|(handle, path)| match handle.join() {
                Ok(report) => report,
                Err(_) => bail!("grading thread for {} panicked", path.display()),
            })
            .collect()
    })
}

fn decode_hex(field: &str, value: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(value).with_context(|| format!("{} is not hex", field))
}

fn grade_file(
    path: &Path,
    cutoff: Option<usize>,
    config: &GraderConfig,
    hasher: SharedHasher,
) -> anyhow::Result<BatchReport> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let batch: Batch = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let previous = batch
        .previous_winners
        .unwrap_or_else(|| empty_context(batch.version));
    let grader = match &batch.block_key {
        Some(key) => {
            let key: [u8; 32] = decode_hex("block_key", key)?
                .try_into()
                .map_err(|_| anyhow::anyhow!("block_key must be 32 bytes"))?;
            BlockGrader::with_block_key(batch.version, batch.height, previous, key, hasher)?
        }
        None => BlockGrader::new(batch.version, batch.height, previous, hasher)?,
    };
    let mut grader = grader.with_default_cutoff(config.default_cutoff);

    let mut rejected = Vec::new();
    for (index, entry) in batch.entries.iter().enumerate() {
        let entry_hash = decode_hex("entry_hash", &entry.entry_hash)?;
        let ext_ids = entry
            .ext_ids
            .iter()
            .map(|id| decode_hex("ext_id", id))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let content = decode_hex("content", &entry.content)?;

        if let Err(err) = grader.add_submission(&entry_hash, &ext_ids, &content) {
            rejected.push(Rejection {
                index,
                reason: err.to_string(),
            });
        }
    }

    let block = match cutoff {
        Some(cutoff) => grader.grade_custom(cutoff),
        None => grader.grade(),
    };
    log::info!(
        "{}: {} block {} graded, {} accepted, {} rejected, {} winners",
        path.display(),
        batch.version,
        batch.height,
        grader.count(),
        rejected.len(),
        block.winners().len()
    );

    Ok(report(path, &block, rejected))
}

fn report(path: &Path, block: &GradedBlock, rejected: Vec<Rejection>) -> BatchReport {
    BatchReport {
        input: path.display().to_string(),
        version: block.version,
        height: block.height,
        accepted: block.count,
        rejected,
        cutoff: block.cutoff,
        graded: block.graded.len(),
        winners: block
            .winners()
            .iter()
            .enumerate()
            .map(|(position, sub)| WinnerRow {
                position,
                entry_hash: hex::encode(sub.entry_hash),
                coinbase: sub.coinbase.clone(),
                grade: sub.grade,
                payout: sub.payout,
            })
            .collect(),
        short_hashes: block.winners_short_hashes().to_vec(),
        total_payout: block.total_payout(),
        graded_at: Utc::now(),
    }
}
