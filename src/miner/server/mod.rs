// SPDX-License-Identifier: MIT

//! MCP front end: exposes the tool registry through rmcp's `ServerHandler`.

use crate::miner::credential::{self, Credential};
use crate::toolkit::error::MinerError;
use crate::toolkit::registry::ToolRegistry;
use crate::toolkit::tool::CallContext;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool as McpTool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::Value;
use std::sync::Arc;

/// Key in a tool call's `_meta` holding per-call configuration.
pub const CALL_CONFIG_META_KEY: &str = "config";

#[derive(Clone)]
pub struct MinerServer {
    registry: ToolRegistry,
    credential: Credential,
}

impl MinerServer {
    pub fn new(registry: ToolRegistry, credential: Credential) -> Self {
        Self {
            registry,
            credential,
        }
    }

    /// Tool descriptors as advertised by `tools/list`.
    pub async fn tool_specs(&self) -> Vec<McpTool> {
        self.registry
            .list()
            .await
            .iter()
            .map(|tool| {
                let schema: JsonObject = tool.schema().as_object().cloned().unwrap_or_default();
                McpTool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    /// Runs one tool and returns its text.
    ///
    /// Only an unknown tool name is a protocol error; everything else,
    /// including undecodable arguments, comes back as text.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        call_config: Option<&JsonObject>,
    ) -> Result<String, McpError> {
        let tool = self
            .registry
            .get(name)
            .await
            .ok_or_else(|| McpError::invalid_params(MinerError::tool_not_found(name).to_string(), None))?;

        let ctx = CallContext::new(credential::for_call(&self.credential, call_config));
        log::info!("Calling tool {} (token {})", name, ctx.credential.describe());

        let input = arguments.map(Value::Object).unwrap_or(Value::Object(JsonObject::new()));
        match tool.execute(input, &ctx).await {
            Ok(text) => Ok(text),
            Err(e) => {
                log::warn!("Tool {} rejected its arguments: {}", name, e);
                Ok(e.to_string())
            }
        }
    }
}

impl ServerHandler for MinerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Marketing Miner keyword research: keyword suggestions, search volume and detailed keyword data for cs, sk, pl, hu, ro, gb and us markets."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "keyminer-rs".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_specs().await))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let call_config = context
            .meta
            .get(CALL_CONFIG_META_KEY)
            .and_then(Value::as_object);
        let text = self
            .dispatch(&request.name, request.arguments, call_config)
            .await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
