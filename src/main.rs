/// Memeforge entry point
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memecoin_agent::MemeCoinAgent;
use memecoin_core::config::{AgentConfig, LogConfig};
use memecoin_core::DeploymentRecord;

const DEFAULT_SETTINGS_FILE: &str = "memeforge.toml";

#[derive(Parser)]
#[command(name = "memeforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Theme the coin should be built around
    #[arg(short, long, default_value = "cyber dogs in space")]
    theme: String,

    /// Where to write the deployment record (overrides the settings file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Settings file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not write the deployment record
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings_path = cli
        .config
        .clone()
        .or_else(|| Path::new(DEFAULT_SETTINGS_FILE).exists().then(|| PathBuf::from(DEFAULT_SETTINGS_FILE)));
    let config = AgentConfig::load(settings_path.as_deref()).context("Configuration error")?;

    init_tracing(&config.logging);
    info!(theme = %cli.theme, chain_id = config.chain.expected_chain_id, "Starting memeforge");

    let mut agent = MemeCoinAgent::from_config(&config)?;
    agent.initialize().await?;

    let record = agent.create_meme_coin(Some(&cli.theme)).await?;
    print_summary(&record, &config.chain.explorer_url);

    if cli.no_save {
        info!("Not saving deployment details");
    } else {
        let path = cli
            .output
            .unwrap_or_else(|| PathBuf::from(&config.output.deployment_file));
        agent.save_deployment_details(&record, &path).await;
    }

    Ok(())
}

fn init_tracing(logging: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn print_summary(record: &DeploymentRecord, explorer_url: &str) {
    let token = &record.token_details;
    let deployment = &record.deployment_details;
    let tokenomics = &record.tokenomics;

    println!("Successfully created meme coin!");
    println!("Name: {}", token.name);
    println!("Symbol: {}", token.symbol);
    println!("Description: {}", token.description);
    println!("Contract Address: {}", deployment.contract_address);
    println!("Transaction Hash: {}", deployment.transaction_hash);
    println!("Block Number: {}", deployment.block_number);
    println!("Gas Used: {}", deployment.gas_used);

    println!("\nTokenomics:");
    println!("Total Supply: {}", tokenomics.total_supply);
    println!("Initial Liquidity: {}%", tokenomics.initial_liquidity_percent);
    println!("Transaction Limit: {}%", tokenomics.transaction_limit_percent);
    println!("Max Wallet: {}%", tokenomics.max_wallet_percent);

    println!(
        "\nView on explorer: {}/address/{}",
        explorer_url.trim_end_matches('/'),
        deployment.contract_address
    );
}
