// SPDX-License-Identifier: MIT

use crate::miner::gateway::Gateway;
use crate::toolkit::error::Result;
use crate::toolkit::tool::{CallContext, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static DEBUG_STATUS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
});

/// Reports server configuration without revealing the token.
pub struct DebugStatusTool {
    gateway: Gateway,
}

impl DebugStatusTool {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for DebugStatusTool {
    fn name(&self) -> &str {
        "debug_status"
    }

    fn description(&self) -> &str {
        "Reports server version, API base URL and whether an API token is configured (never the token itself)."
    }

    fn schema(&self) -> &Value {
        &DEBUG_STATUS_SCHEMA
    }

    async fn execute(&self, _input: Value, ctx: &CallContext) -> Result<String> {
        let config = self.gateway.config();
        Ok([
            format!("Server: keyminer-rs {}", env!("CARGO_PKG_VERSION")),
            format!("API base: {}", config.base_url),
            format!("Request timeout: {}s", config.timeout.as_secs_f64()),
            format!("API token: {}", ctx.credential.describe()),
        ]
        .join("\n"))
    }
}
