// SPDX-License-Identifier: MIT

use super::{
    decode_args, display, first_record, unwrap_envelope, volume_lines, KeywordArgs,
    NO_DATA_FOR_KEYWORD,
};
use crate::miner::config::Endpoint;
use crate::miner::gateway::Gateway;
use crate::miner::params::Language;
use crate::toolkit::error::Result;
use crate::toolkit::tool::{CallContext, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

static KEYWORD_DATA_SCHEMA: Lazy<Value> = Lazy::new(|| {
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

pub struct KeywordDataTool {
    gateway: Gateway,
}

impl KeywordDataTool {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for KeywordDataTool {
    fn name(&self) -> &str {
        "get_keyword_data"
    }

    fn description(&self) -> &str {
        "Gets detailed keyword data (search volume, CPC, trend, peak month and monthly volumes) from the Marketing Miner API."
    }

    fn schema(&self) -> &Value {
        &KEYWORD_DATA_SCHEMA
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
            .call_remote(&ctx.credential, Endpoint::KeywordData, params)
            .await;

        let data = match unwrap_envelope(resp) {
            Ok(data) => data,
            Err(message) => return Ok(message),
        };

        Ok(match first_record(&data) {
            Ok(Some(record)) => render(record),
            Ok(None) => NO_DATA_FOR_KEYWORD.to_string(),
            Err(message) => message,
        })
    }
}

fn render(record: &Map<String, Value>) -> String {
    let mut lines = volume_lines(record);

    if let Some(change) = record.get("yoy_change").and_then(Value::as_f64) {
        lines.push(format!("Year-over-year change: {:.2}%", change));
    }

    match record.get("peak_month") {
        None | Some(Value::Null) => {}
        peak => lines.push(format!("Peak month: {}", display(peak))),
    }

    if let Some(Value::Object(monthly)) = record.get("monthly_search_volume") {
        if !monthly.is_empty() {
            let mut months: Vec<(&String, &Value)> = monthly.iter().collect();
            months.sort_by(|a, b| a.0.cmp(b.0));

            lines.push("Monthly search volume:".to_string());
            lines.extend(
                months
                    .into_iter()
                    .map(|(month, volume)| format!(" - {}: {}", month, display(Some(volume)))),
            );
        }
    }

    lines.join("\n")
}
