// SPDX-License-Identifier: MIT

use super::{decode_args, first_record, unwrap_envelope, volume_lines, KeywordArgs, NO_DATA_FOR_KEYWORD};
use crate::miner::config::Endpoint;
use crate::miner::gateway::Gateway;
use crate::miner::params::Language;
use crate::toolkit::error::Result;
use crate::toolkit::tool::{CallContext, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static SEARCH_VOLUME_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "lang": {
                "type": "string",
                "description": "Market language code",
                "enum": Language::codes()
            },
            "keyword": {
                "type": "string",
                "description": "Keyword to look up"
            }
        },
        "required": ["lang", "keyword"]
    })
});

pub struct SearchVolumeTool {
    gateway: Gateway,
}

impl SearchVolumeTool {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for SearchVolumeTool {
    fn name(&self) -> &str {
        "get_search_volume_data"
    }

    fn description(&self) -> &str {
        "Gets search volume and CPC for a keyword from the Marketing Miner API."
    }

    fn schema(&self) -> &Value {
        &SEARCH_VOLUME_SCHEMA
    }

    async fn execute(&self, input: Value, ctx: &CallContext) -> Result<String> {
        let args: KeywordArgs = decode_args(input)?;

        let lang = match args.lang.parse::<Language>() {
            Ok(lang) => lang,
            Err(message) => return Ok(message),
        };

        let params = vec![
            ("lang".to_string(), lang.to_string()),
            ("keyword".to_string(), args.keyword),
        ];
        let resp = self
            .gateway
            .call_remote(&ctx.credential, Endpoint::SearchVolume, params)
            .await;

        let data = match unwrap_envelope(resp) {
            Ok(data) => data,
            Err(message) => return Ok(message),
        };

        Ok(match first_record(&data) {
            Ok(Some(record)) => volume_lines(record).join("\n"),
            Ok(None) => NO_DATA_FOR_KEYWORD.to_string(),
            Err(message) => message,
        })
    }
}
