//! Ethereum side of the meme coin pipeline
//!
//! Fills the contract template, compiles it with `solc` and deploys the
//! result through an ethers signing client.

pub mod compiler;
pub mod deployer;
pub mod provider;
pub mod template;

pub use compiler::{ContractCompiler, ImportResolver, SolcCompiler, StandardJsonCompiler};
pub use deployer::MemeDeployer;
pub use provider::{ChainClient, ChainReceipt, EthersChainClient};
pub use template::{ContractTemplate, TEMPLATE_MAX_WALLET_PERCENT, TEMPLATE_TRANSACTION_LIMIT_PERCENT};
