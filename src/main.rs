use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, info};
use tokio::runtime::Builder;

use ad_router::config::Scenario;
use ad_router::{RouteOutcome, UnresolvedPolicy, route_batch, route_batch_concurrent};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "ad-router", about = "Shortest router paths between IPv4 hosts")]
struct Cli {
    /// JSON document with `routers` and optional `src-dest` pairs
    input: PathBuf,

    /// Route this pair instead of the document's `src-dest` list
    #[arg(long = "pair", num_args = 2, value_names = ["SRC", "DST"], action = clap::ArgAction::Append)]
    pairs: Vec<String>,

    #[arg(long, value_enum, default_value_t = UnresolvedPolicy::Empty)]
    on_unresolved: UnresolvedPolicy,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Worker threads used to evaluate pairs
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn print_text(outcomes: &[RouteOutcome]) {
    for o in outcomes {
        println!("{o}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let scenario = Scenario::load(&cli.input)?;
    let pairs: Vec<(String, String)> = if cli.pairs.is_empty() {
        scenario.src_dest
    } else {
        cli.pairs
            .chunks_exact(2)
            .map(|p| (p[0].clone(), p[1].clone()))
            .collect()
    };
    info!(
        "Loaded {} routers, routing {} pairs",
        scenario.routers.len(),
        pairs.len()
    );

    let outcomes = if cli.jobs > 1 {
        let rt = Builder::new_multi_thread()
            .max_blocking_threads(cli.jobs)
            .enable_all()
            .build()?;
        rt.block_on(route_batch_concurrent(
            Arc::new(scenario.routers),
            pairs,
            cli.on_unresolved,
            cli.jobs,
        ))?
    } else {
        route_batch(&scenario.routers, &pairs, cli.on_unresolved)?
    };

    match cli.format {
        OutputFormat::Text => print_text(&outcomes),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcomes).context("encoding routes")?;
            println!("{json}");
        }
    }
    Ok(())
}
