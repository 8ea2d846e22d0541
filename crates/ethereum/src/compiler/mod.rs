//! Solidity compilation through the standard JSON interface

pub mod imports;
pub mod solc;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use memecoin_core::{CompilationError, CompiledArtifact, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use imports::ImportResolver;
pub use solc::SolcCompiler;

/// Unit name the generated contract is submitted under
pub const SOURCE_UNIT: &str = "Token.sol";

/// `solc --standard-json` input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceFile>,
    pub settings: CompilerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub optimizer: Optimizer,
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimizer {
    pub enabled: bool,
    pub runs: u32,
}

impl CompilerInput {
    /// Wrap a single contract source with optimization on and every output selected
    pub fn for_source(source: &str, optimizer_runs: u32) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            SOURCE_UNIT.to_string(),
            SourceFile {
                content: source.to_string(),
            },
        );

        let mut per_contract = BTreeMap::new();
        per_contract.insert("*".to_string(), vec!["*".to_string()]);
        let mut output_selection = BTreeMap::new();
        output_selection.insert("*".to_string(), per_contract);

        Self {
            language: "Solidity".to_string(),
            sources,
            settings: CompilerSettings {
                optimizer: Optimizer {
                    enabled: true,
                    runs: optimizer_runs,
                },
                output_selection,
            },
        }
    }
}

/// `solc --standard-json` output, reduced to what deployment needs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    pub formatted_message: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }

    /// The compiler's formatted message, or `type: message` when absent
    pub fn render(&self) -> String {
        match &self.formatted_message {
            Some(formatted) => formatted.trim_end().to_string(),
            None => format!("{}: {}", self.kind, self.message),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: serde_json::Value,
    pub evm: Option<EvmOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmOutput {
    pub bytecode: Option<BytecodeOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BytecodeOutput {
    #[serde(default)]
    pub object: String,
}

/// Anything that can run a standard JSON compilation
#[async_trait]
pub trait StandardJsonCompiler: Send + Sync {
    async fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput>;
}

/// Compiles rendered contract source into a deployable artifact
pub struct ContractCompiler {
    backend: Arc<dyn StandardJsonCompiler>,
    resolver: ImportResolver,
    optimizer_runs: u32,
}

impl ContractCompiler {
    pub fn new(backend: Arc<dyn StandardJsonCompiler>, resolver: ImportResolver, optimizer_runs: u32) -> Self {
        Self {
            backend,
            resolver,
            optimizer_runs,
        }
    }

    /// Compile `source` and return the ABI and bytecode of its contract
    pub async fn compile(&self, source: &str) -> Result<CompiledArtifact> {
        let mut input = CompilerInput::for_source(source, self.optimizer_runs);
        self.resolver.resolve(&mut input.sources)?;

        info!(units = input.sources.len(), "Compiling contract");
        let output = self.backend.compile(&input).await?;

        extract_artifact(output)
    }
}

/// Reject error diagnostics and pull the single contract out of the submitted unit
pub fn extract_artifact(mut output: CompilerOutput) -> Result<CompiledArtifact> {
    let (errors, warnings): (Vec<Diagnostic>, Vec<Diagnostic>) =
        output.errors.drain(..).partition(Diagnostic::is_error);

    for diagnostic in &warnings {
        warn!(severity = %diagnostic.severity, "{}", diagnostic.render());
    }

    if !errors.is_empty() {
        let messages = errors.iter().map(Diagnostic::render).collect();
        return Err(CompilationError::Diagnostics(messages).into());
    }

    let (contract_name, contract) = output
        .contracts
        .remove(SOURCE_UNIT)
        .and_then(|unit| unit.into_iter().next())
        .ok_or_else(|| CompilationError::MissingContract(SOURCE_UNIT.to_string()))?;

    let bytecode = contract
        .evm
        .and_then(|evm| evm.bytecode)
        .map(|bytecode| bytecode.object)
        .unwrap_or_default();
    let bytecode = bytecode.trim_start_matches("0x").to_string();

    if bytecode.is_empty() || !contract.abi.is_array() {
        return Err(CompilationError::MissingContract(format!("{}:{}", SOURCE_UNIT, contract_name)).into());
    }

    info!(contract = %contract_name, bytecode_len = bytecode.len() / 2, "Compiled contract");
    Ok(CompiledArtifact {
        contract_name,
        abi: contract.abi,
        bytecode,
    })
}
