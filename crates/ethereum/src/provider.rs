use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::contract::ContractFactory;
use ethers::middleware::{Middleware, SignerMiddleware};
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Bytes, TransactionReceipt, U256, U64};
use ethers::utils::to_checksum;
use memecoin_core::config::ChainConfig;
use memecoin_core::{CompiledArtifact, Error, Result};
use tracing::{debug, info};

/// Network-confirmed facts about a contract creation transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub contract_address: String,
    pub transaction_hash: String,
    pub gas_used: u64,
    pub block_number: u64,
}

/// Signing connection to an EVM network
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address derived from the signing credential
    fn address(&self) -> String;

    /// Chain id reported by the connected node
    async fn chain_id(&self) -> Result<u64>;

    /// Submit a creation transaction and wait until it is confirmed
    async fn deploy(&self, artifact: &CompiledArtifact, gas_limit: u64) -> Result<ChainReceipt>;
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Chain client backed by an ethers HTTP provider and a local wallet
pub struct EthersChainClient {
    client: Arc<SignerClient>,
    confirmations: usize,
    confirmation_timeout: Duration,
}

impl EthersChainClient {
    /// Create a client for the configured RPC endpoint and signing key
    pub fn connect(config: &ChainConfig) -> Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| Error::chain(format!("Failed to create Ethereum HTTP provider: {}", e)))?;

        let wallet = config
            .private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| Error::config(format!("Invalid private key: {}", e)))?
            .with_chain_id(config.expected_chain_id);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            confirmations: config.confirmations,
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        })
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    fn address(&self) -> String {
        to_checksum(&self.client.address(), None)
    }

    async fn chain_id(&self) -> Result<u64> {
        let id = self
            .client
            .get_chainid()
            .await
            .map_err(|e| Error::chain(format!("Failed to get chain id: {}", e)))?;

        chain_id_from(id)
    }

    async fn deploy(&self, artifact: &CompiledArtifact, gas_limit: u64) -> Result<ChainReceipt> {
        let abi: Abi = serde_json::from_value(artifact.abi.clone())
            .map_err(|e| Error::chain(format!("Invalid contract ABI: {}", e)))?;
        let bytecode = hex::decode(&artifact.bytecode)
            .map(Bytes::from)
            .map_err(|e| Error::chain(format!("Invalid contract bytecode: {}", e)))?;

        let factory = ContractFactory::new(abi, bytecode, self.client.clone());
        let mut deployer = factory
            .deploy(())
            .map_err(|e| Error::chain(format!("Failed to build deployment transaction: {}", e)))?;
        deployer.tx.set_gas(gas_limit);

        let pending = self
            .client
            .send_transaction(deployer.tx, None)
            .await
            .map_err(|e| Error::chain(format!("Failed to submit deployment transaction: {}", e)))?;
        let tx_hash = pending.tx_hash();
        info!(tx_hash = ?tx_hash, "Waiting for deployment confirmation");

        let receipt = tokio::time::timeout(self.confirmation_timeout, pending.confirmations(self.confirmations))
            .await
            .map_err(|_| {
                Error::chain(format!(
                    "Timed out after {:?} waiting for {:?}",
                    self.confirmation_timeout, tx_hash
                ))
            })?
            .map_err(|e| Error::chain(format!("Failed waiting for confirmation: {}", e)))?
            .ok_or_else(|| Error::chain(format!("Transaction {:?} was dropped", tx_hash)))?;

        debug!(?receipt, "Deployment receipt");
        chain_receipt(receipt)
    }
}

/// Narrow a node-reported chain id to `u64`
pub fn chain_id_from(id: U256) -> Result<u64> {
    if id > U256::from(u64::MAX) {
        return Err(Error::chain(format!("Chain id {} does not fit in 64 bits", id)));
    }
    Ok(id.as_u64())
}

/// Convert an ethers receipt, rejecting reverted or incomplete ones
pub fn chain_receipt(receipt: TransactionReceipt) -> Result<ChainReceipt> {
    if receipt.status == Some(U64::zero()) {
        return Err(Error::chain(format!(
            "Deployment transaction {:?} reverted",
            receipt.transaction_hash
        )));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        Error::chain(format!(
            "Receipt for {:?} has no contract address",
            receipt.transaction_hash
        ))
    })?;
    let block_number = receipt
        .block_number
        .ok_or_else(|| Error::chain("Receipt has no block number"))?;
    let gas_used = receipt
        .gas_used
        .ok_or_else(|| Error::chain("Receipt has no gas used"))?;

    Ok(ChainReceipt {
        contract_address: to_checksum(&address, None),
        transaction_hash: format!("{:?}", receipt.transaction_hash),
        gas_used: gas_used.low_u64(),
        block_number: block_number.as_u64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, H256};

    // First default anvil/hardhat account
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config(private_key: &str) -> ChainConfig {
        ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            private_key: private_key.to_string(),
            expected_chain_id: 84532,
            gas_limit: 5_000_000,
            confirmations: 1,
            confirmation_timeout_secs: 30,
            explorer_url: "https://sepolia.basescan.org".to_string(),
        }
    }

    #[test]
    fn test_address_is_derived_from_key() {
        let client = EthersChainClient::connect(&config(TEST_KEY)).unwrap();
        assert_eq!(client.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        assert!(matches!(
            EthersChainClient::connect(&config("not-a-key")),
            Err(Error::Config(_))
        ));
    }

    fn receipt() -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: H256::repeat_byte(0xab),
            contract_address: Some(Address::repeat_byte(0x11)),
            gas_used: Some(U256::from(1_234_567u64)),
            block_number: Some(U64::from(42u64)),
            status: Some(U64::one()),
            ..Default::default()
        }
    }

    #[test]
    fn test_receipt_conversion() {
        let converted = chain_receipt(receipt()).unwrap();

        assert_eq!(converted.contract_address, "0x1111111111111111111111111111111111111111");
        assert_eq!(converted.transaction_hash, format!("0x{}", "ab".repeat(32)));
        assert_eq!(converted.gas_used, 1_234_567);
        assert_eq!(converted.block_number, 42);
    }

    #[test]
    fn test_reverted_or_incomplete_receipts_fail() {
        let mut reverted = receipt();
        reverted.status = Some(U64::zero());
        assert!(chain_receipt(reverted).is_err());

        let mut no_address = receipt();
        no_address.contract_address = None;
        assert!(chain_receipt(no_address).is_err());

        let mut no_gas = receipt();
        no_gas.gas_used = None;
        assert!(matches!(chain_receipt(no_gas), Err(Error::Chain(msg)) if msg.contains("gas used")));
    }

    #[test]
    fn test_chain_id_must_fit_in_u64() {
        assert_eq!(chain_id_from(U256::from(84532u64)).unwrap(), 84532);
        assert_eq!(chain_id_from(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert!(matches!(
            chain_id_from(U256::from(u64::MAX) + U256::one()),
            Err(Error::Chain(_))
        ));
    }
}
