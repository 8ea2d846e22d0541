//! Render, compile and deploy the meme coin contract

use std::sync::Arc;

use memecoin_core::{DeploymentReceipt, Error, Result};
use tracing::info;

use crate::compiler::ContractCompiler;
use crate::provider::ChainClient;
use crate::template::ContractTemplate;

/// Deploys meme coin contracts to one fixed network
pub struct MemeDeployer {
    client: Arc<dyn ChainClient>,
    template: ContractTemplate,
    compiler: ContractCompiler,
    expected_chain_id: u64,
    gas_limit: u64,
}

impl MemeDeployer {
    pub fn new(
        client: Arc<dyn ChainClient>,
        compiler: ContractCompiler,
        expected_chain_id: u64,
        gas_limit: u64,
    ) -> Result<Self> {
        Ok(Self {
            client,
            template: ContractTemplate::new()?,
            compiler,
            expected_chain_id,
            gas_limit,
        })
    }

    /// Confirm the node is on the expected network
    pub async fn initialize(&self) -> Result<()> {
        info!(address = %self.client.address(), "Deployer address");
        let actual = self.client.chain_id().await?;
        self.check_network(actual)?;
        info!(chain_id = self.expected_chain_id, "Connected to expected network");
        Ok(())
    }

    fn check_network(&self, actual: u64) -> Result<()> {
        if actual != self.expected_chain_id {
            return Err(Error::NetworkIdentity {
                expected: self.expected_chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Deploy a coin contract and wait for its confirmation.
    ///
    /// The network is checked again first, so nothing is built or signed
    /// against the wrong chain. A mismatch is returned as is; every other
    /// failure is wrapped in `Error::Deployment`.
    pub async fn deploy(&self, name: &str, symbol: &str, total_supply: u64) -> Result<DeploymentReceipt> {
        let actual = self.client.chain_id().await.map_err(Error::deployment)?;
        self.check_network(actual)?;

        self.render_compile_deploy(name, symbol, total_supply)
            .await
            .map_err(Error::deployment)
    }

    async fn render_compile_deploy(&self, name: &str, symbol: &str, total_supply: u64) -> Result<DeploymentReceipt> {
        let source = self.template.render(name, symbol, total_supply)?;
        let artifact = self.compiler.compile(&source).await?;

        info!(contract = %artifact.contract_name, gas_limit = self.gas_limit, "Deploying contract");
        let receipt = self.client.deploy(&artifact, self.gas_limit).await?;
        info!(
            address = %receipt.contract_address,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Contract deployed"
        );

        Ok(DeploymentReceipt {
            contract_address: receipt.contract_address,
            transaction_hash: receipt.transaction_hash,
            abi: artifact.abi,
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
        })
    }
}
