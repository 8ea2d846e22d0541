use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use memecoin_core::config::AgentConfig;
use memecoin_core::{DeploymentRecord, Error, Result, Stage, Tokenomics};
use memecoin_ethereum::{
    ContractCompiler, EthersChainClient, ImportResolver, MemeDeployer, SolcCompiler,
    TEMPLATE_MAX_WALLET_PERCENT, TEMPLATE_TRANSACTION_LIMIT_PERCENT,
};
use memecoin_generator::{CoinGenerator, HttpCompletionClient};
use tracing::{error, info, warn};

/// Creates meme coins end to end and remembers what it deployed
pub struct MemeCoinAgent {
    generator: CoinGenerator,
    deployer: MemeDeployer,
    history: Vec<DeploymentRecord>,
}

impl MemeCoinAgent {
    pub fn new(generator: CoinGenerator, deployer: MemeDeployer) -> Self {
        Self {
            generator,
            deployer,
            history: Vec::new(),
        }
    }

    /// Build an agent wired to the real completion service, solc and chain
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        info!("Initializing MemeCoin agent");

        let completion = HttpCompletionClient::new(&config.completion)?;
        let generator = CoinGenerator::new(Arc::new(completion), config.completion.model.clone());

        let solc = SolcCompiler::new(
            config.compiler.solc_path.clone(),
            Duration::from_secs(config.compiler.timeout_secs),
        );
        let compiler = ContractCompiler::new(
            Arc::new(solc),
            ImportResolver::new(&config.compiler.dependency_dir),
            config.compiler.optimizer_runs,
        );
        let chain = EthersChainClient::connect(&config.chain)?;
        let deployer = MemeDeployer::new(
            Arc::new(chain),
            compiler,
            config.chain.expected_chain_id,
            config.chain.gas_limit,
        )?;

        Ok(Self::new(generator, deployer))
    }

    /// Check the network identity, then the completion service
    pub async fn initialize(&self) -> Result<()> {
        self.deployer.initialize().await?;
        self.generator.verify_connection().await
    }

    /// Generate, deploy and record one coin.
    ///
    /// Any failure aborts the attempt with the failing stage attached and
    /// leaves the history untouched.
    pub async fn create_meme_coin(&mut self, theme: Option<&str>) -> Result<DeploymentRecord> {
        info!(theme = theme.unwrap_or("<none>"), "Generating coin details");
        let identity = self
            .generator
            .generate_name(theme)
            .await
            .map_err(|e| e.in_stage(Stage::Identity))?;

        info!("Generating tokenomics");
        let tokenomics = self
            .generator
            .generate_tokenomics(&identity.name)
            .await
            .map_err(|e| e.in_stage(Stage::Tokenomics))?;
        warn_on_unapplied_limits(&tokenomics);

        info!("Deploying contract");
        let receipt = self
            .deployer
            .deploy(&identity.name, &identity.symbol, tokenomics.total_supply)
            .await
            .map_err(|e| e.in_stage(Stage::Deployment))?;

        let record = DeploymentRecord::new(receipt, identity, tokenomics);
        self.history.push(record.clone());
        Ok(record)
    }

    /// Every record created by this agent, oldest first
    pub fn history(&self) -> &[DeploymentRecord] {
        &self.history
    }

    /// Write one record as pretty JSON. Failures are logged, never returned.
    pub async fn save_deployment_details(&self, record: &DeploymentRecord, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match write_record(record, path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deployment details saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), "Error saving deployment details: {}", e);
                false
            }
        }
    }
}

async fn write_record(record: &DeploymentRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::persistence(e.to_string()))
}

/// The contract enforces fixed caps; say so when the model asked for others
fn warn_on_unapplied_limits(tokenomics: &Tokenomics) {
    if tokenomics.transaction_limit_percent != TEMPLATE_TRANSACTION_LIMIT_PERCENT
        || tokenomics.max_wallet_percent != TEMPLATE_MAX_WALLET_PERCENT
    {
        warn!(
            requested_transaction_limit = tokenomics.transaction_limit_percent,
            requested_max_wallet = tokenomics.max_wallet_percent,
            applied_transaction_limit = TEMPLATE_TRANSACTION_LIMIT_PERCENT,
            applied_max_wallet = TEMPLATE_MAX_WALLET_PERCENT,
            "Generated transfer limits differ from the contract's fixed caps; the fixed caps apply"
        );
    }
}
