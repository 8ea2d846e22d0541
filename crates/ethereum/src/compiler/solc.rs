//! `solc` subprocess backend

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use memecoin_core::{CompilationError, Error, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{CompilerInput, CompilerOutput, StandardJsonCompiler};

/// Runs `solc --standard-json` with the input on stdin
#[derive(Debug, Clone)]
pub struct SolcCompiler {
    path: String,
    timeout: Duration,
}

impl SolcCompiler {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }
}

fn failure(msg: String) -> Error {
    CompilationError::Compiler(msg).into()
}

#[async_trait]
impl StandardJsonCompiler for SolcCompiler {
    async fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        let payload = serde_json::to_vec(input)?;

        let mut child = Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failure(format!("failed to launch {}: {}", self.path, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failure("compiler stdin unavailable".to_string()))?;
        stdin
            .write_all(&payload)
            .await
            .map_err(|e| failure(format!("failed to send input: {}", e)))?;
        drop(stdin);

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| failure(format!("{} timed out after {:?}", self.path, self.timeout)))?
            .map_err(|e| failure(format!("failed to read compiler output: {}", e)))?;

        debug!(status = %output.status, stdout_len = output.stdout.len(), "solc finished");

        serde_json::from_slice(&output.stdout).map_err(|e| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            failure(format!("unreadable output ({}, {}): {}", output.status, e, stderr.trim()))
        })
    }
}
