//! Records passed between the pipeline stages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name, ticker symbol and pitch of a generated coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinIdentity {
    /// Alphanumeric CamelCase name, optionally ending in `Token`
    pub name: String,

    /// Three or four upper-case letters
    pub symbol: String,

    /// Short description, under 100 characters
    pub description: String,
}

/// Supply and transfer-limit parameters of a generated coin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenomics {
    /// Whole-token supply, between 100 million and 1 billion
    pub total_supply: u64,

    /// Share of supply seeded as liquidity, 50 to 90
    pub initial_liquidity_percent: u64,

    pub transaction_limit_percent: u64,

    pub max_wallet_percent: u64,
}

/// Output of a successful compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Name of the contract selected from the compiled unit
    pub contract_name: String,

    /// JSON ABI as emitted by the compiler
    pub abi: serde_json::Value,

    /// Hex-encoded creation bytecode, without `0x` prefix
    pub bytecode: String,
}

/// Network-confirmed outcome of a contract deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReceipt {
    pub contract_address: String,
    pub transaction_hash: String,
    pub abi: serde_json::Value,
    pub gas_used: u64,
    pub block_number: u64,
}

/// Everything known about one created coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub timestamp: DateTime<Utc>,
    pub deployment_details: DeploymentReceipt,
    pub token_details: CoinIdentity,
    pub tokenomics: Tokenomics,
}

impl DeploymentRecord {
    /// Assemble a record stamped with the current time
    pub fn new(receipt: DeploymentReceipt, identity: CoinIdentity, tokenomics: Tokenomics) -> Self {
        Self {
            timestamp: Utc::now(),
            deployment_details: receipt,
            token_details: identity,
            tokenomics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> DeploymentRecord {
        DeploymentRecord::new(
            DeploymentReceipt {
                contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
                transaction_hash: format!("0x{}", "ab".repeat(32)),
                abi: json!([]),
                gas_used: 1_234_567,
                block_number: 42,
            },
            CoinIdentity {
                name: "CyberDog".to_string(),
                symbol: "CDOG".to_string(),
                description: "A space-faring meme coin".to_string(),
            },
            Tokenomics {
                total_supply: 500_000_000,
                initial_liquidity_percent: 75,
                transaction_limit_percent: 1,
                max_wallet_percent: 2,
            },
        )
    }

    #[test]
    fn test_record_serializes_with_snake_case_sections() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert!(value["timestamp"].is_string());
        assert_eq!(value["token_details"]["symbol"], "CDOG");
        assert_eq!(value["tokenomics"]["total_supply"], 500_000_000);
        assert_eq!(value["deployment_details"]["block_number"], 42);
        assert_eq!(
            value["deployment_details"]["contract_address"],
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let record = sample_record();
        let value = serde_json::to_value(&record).unwrap();
        let parsed: DateTime<Utc> = value["timestamp"].as_str().unwrap().parse().unwrap();

        assert_eq!(parsed, record.timestamp);
    }
}
