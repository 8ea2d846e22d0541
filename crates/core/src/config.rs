//! Configuration for the meme coin pipeline
//!
//! The four connection settings are secrets and come from the environment
//! only. Everything else has a default and may be tuned from a TOML file.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variables that must be present before anything runs
pub const REQUIRED_VARIABLES: [&str; 4] = ["GAIA_URL", "GAIA_MODEL", "BASE_NODE_URL", "PRIVATE_KEY"];

/// Base Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 84532;

/// Complete configuration handed to every component at startup
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub completion: CompletionConfig,
    pub chain: ChainConfig,
    pub compiler: CompilerConfig,
    pub output: OutputConfig,
    pub logging: LogConfig,
}

/// Completion service connection
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub url: String,
    pub model: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
}

/// Target network and deployment policy
#[derive(Clone)]
pub struct ChainConfig {
    pub rpc_url: String,

    /// Hex-encoded signing key
    pub private_key: String,

    /// Deployment refuses to run against any other chain
    pub expected_chain_id: u64,

    /// Gas ceiling of the deployment transaction
    pub gas_limit: u64,

    pub confirmations: usize,
    pub confirmation_timeout_secs: u64,

    /// Block explorer used for the address link printed after deployment
    pub explorer_url: String,
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("expected_chain_id", &self.expected_chain_id)
            .field("gas_limit", &self.gas_limit)
            .field("confirmations", &self.confirmations)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("explorer_url", &self.explorer_url)
            .finish()
    }
}

/// Solidity compiler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path or name of the `solc` executable
    pub solc_path: String,

    /// Directory `import` statements are resolved against
    pub dependency_dir: String,

    pub optimizer_runs: u32,
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            solc_path: "solc".to_string(),
            dependency_dir: "node_modules".to_string(),
            optimizer_runs: 200,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File the deployment record is written to
    pub deployment_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            deployment_file: "deployment_details.json".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Tunables read from the optional settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub completion: CompletionSettings,
    pub chain: ChainSettings,
    pub compiler: CompilerConfig,
    pub output: OutputConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub api_key: String,
    pub request_timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: "GAIANET".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub expected_chain_id: u64,
    pub gas_limit: u64,
    pub confirmations: usize,
    pub confirmation_timeout_secs: u64,
    pub explorer_url: String,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            expected_chain_id: DEFAULT_CHAIN_ID,
            gas_limit: 5_000_000,
            confirmations: 1,
            confirmation_timeout_secs: 300,
            explorer_url: "https://sepolia.basescan.org".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl AgentConfig {
    /// Build the configuration from the process environment and optional settings file
    pub fn load(settings_path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match settings_path {
            Some(path) => Settings::load_from_file(path)?,
            None => Settings::default(),
        };

        Self::from_lookup(settings, |key| env::var(key).ok())
    }

    /// Build the configuration with variables taken from `lookup`
    pub fn from_lookup<F>(settings: Settings, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARIABLES
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let Settings {
            completion,
            chain,
            mut compiler,
            output,
            logging,
        } = settings;

        let expected_chain_id = match value("EXPECTED_CHAIN_ID") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "EXPECTED_CHAIN_ID".to_string(),
                message: format!("'{}' is not a chain id", raw),
            })?,
            None => chain.expected_chain_id,
        };
        if let Some(solc_path) = value("SOLC_PATH") {
            compiler.solc_path = solc_path;
        }
        if let Some(dependency_dir) = value("CONTRACT_DEPENDENCY_DIR") {
            compiler.dependency_dir = dependency_dir;
        }

        let config = Self {
            completion: CompletionConfig {
                url: value("GAIA_URL").unwrap_or_default(),
                model: value("GAIA_MODEL").unwrap_or_default(),
                api_key: value("GAIA_API_KEY").unwrap_or(completion.api_key),
                request_timeout_secs: completion.request_timeout_secs,
            },
            chain: ChainConfig {
                rpc_url: value("BASE_NODE_URL").unwrap_or_default(),
                private_key: value("PRIVATE_KEY").unwrap_or_default(),
                expected_chain_id,
                gas_limit: chain.gas_limit,
                confirmations: chain.confirmations,
                confirmation_timeout_secs: chain.confirmation_timeout_secs,
                explorer_url: chain.explorer_url,
            },
            compiler,
            output,
            logging,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, url) in [
            ("GAIA_URL", &self.completion.url),
            ("BASE_NODE_URL", &self.chain.rpc_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: url.clone(),
                });
            }
        }

        let non_zero = [
            ("completion.request_timeout_secs", self.completion.request_timeout_secs),
            ("chain.gas_limit", self.chain.gas_limit),
            ("chain.confirmations", self.chain.confirmations as u64),
            ("chain.confirmation_timeout_secs", self.chain.confirmation_timeout_secs),
            ("compiler.optimizer_runs", self.compiler.optimizer_runs as u64),
            ("compiler.timeout_secs", self.compiler.timeout_secs),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
    #[error("Invalid URL for '{field}': '{url}'")]
    InvalidUrl { field: String, url: String },
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err.to_string())
    }
}
