/// Core types, errors and configuration for the meme coin pipeline
pub mod config;
pub mod error;
pub mod types;

pub use error::{CompilationError, Error, Result, Stage, Violation};
pub use types::{
    CoinIdentity, CompiledArtifact, DeploymentReceipt, DeploymentRecord, Tokenomics,
};
