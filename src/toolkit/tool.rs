// SPDX-License-Identifier: MIT

use crate::miner::credential::Credential;
use crate::toolkit::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Per-invocation context handed to a tool.
///
/// The credential is resolved before the call reaches the tool, either from
/// process startup or from the call's own configuration.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub credential: Credential,
}

impl CallContext {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

/// Trait for tools exposed over MCP.
///
/// # Notes
/// - `name()` and `description()` return `&str` to avoid allocation on every call
/// - `schema()` returns `&Value` to avoid cloning the schema on every access
/// - `execute()` returns the rendered text; request-level failures are text
///   too, `Err` is reserved for arguments that cannot be decoded
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within a registry)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input and return the rendered result
    async fn execute(&self, input: Value, ctx: &CallContext) -> Result<String>;
}
