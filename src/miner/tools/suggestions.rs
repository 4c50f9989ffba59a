// SPDX-License-Identifier: MIT

use super::{decode_args, display, unwrap_envelope, NO_DATA_FOR_QUERY, UNEXPECTED_FORMAT};
use crate::miner::config::Endpoint;
use crate::miner::gateway::Gateway;
use crate::miner::params::{Language, SuggestionsType};
use crate::toolkit::error::Result;
use crate::toolkit::tool::{CallContext, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};

// --- Static schema ---

static SUGGESTIONS_SCHEMA: Lazy<Value> = Lazy::new(|| {
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
                "description": "Seed keyword to expand"
            },
            "suggestions_type": {
                "type": "string",
                "description": "Kind of suggestions (optional)",
                "enum": SuggestionsType::codes()
            },
            "with_keyword_data": {
                "type": "boolean",
                "description": "Include search volume for each suggestion (optional)",
                "default": false
            }
        },
        "required": ["lang", "keyword"]
    })
});

#[derive(Debug, Deserialize)]
pub struct SuggestionsArgs {
    pub lang: String,
    pub keyword: String,
    #[serde(default)]
    pub suggestions_type: Option<String>,
    #[serde(default)]
    pub with_keyword_data: Option<bool>,
}

pub struct KeywordSuggestionsTool {
    gateway: Gateway,
}

impl KeywordSuggestionsTool {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for KeywordSuggestionsTool {
    fn name(&self) -> &str {
        "get_keyword_suggestions"
    }

    fn description(&self) -> &str {
        "Gets keyword suggestions for a seed keyword from the Marketing Miner API."
    }

    fn schema(&self) -> &Value {
        &SUGGESTIONS_SCHEMA
    }

    async fn execute(&self, input: Value, ctx: &CallContext) -> Result<String> {
        let args: SuggestionsArgs = decode_args(input)?;

        let lang = match args.lang.parse::<Language>() {
            Ok(lang) => lang,
            Err(message) => return Ok(message),
        };
        // An empty string means "not given"
        let suggestions_type = match args.suggestions_type.as_deref().filter(|t| !t.is_empty()) {
            Some(t) => match t.parse::<SuggestionsType>() {
                Ok(t) => Some(t),
                Err(message) => return Ok(message),
            },
            None => None,
        };

        let mut params = vec![
            ("lang".to_string(), lang.to_string()),
            ("keyword".to_string(), args.keyword),
        ];
        if let Some(t) = suggestions_type {
            params.push(("suggestions_type".to_string(), t.to_string()));
        }
        params.push((
            "with_keyword_data".to_string(),
            args.with_keyword_data.unwrap_or(false).to_string(),
        ));

        let resp = self
            .gateway
            .call_remote(&ctx.credential, Endpoint::Suggestions, params)
            .await;

        Ok(match unwrap_envelope(resp) {
            Ok(data) => render(&data),
            Err(message) => message,
        })
    }
}

/// One `Keyword: .. | Search volume: ..` line per record in `data.keywords`.
fn render(data: &Value) -> String {
    let keywords = match data {
        Value::Null => return NO_DATA_FOR_QUERY.to_string(),
        Value::Object(map) => match map.get("keywords") {
            None | Some(Value::Null) => return NO_DATA_FOR_QUERY.to_string(),
            Some(Value::Array(items)) => items,
            Some(_) => return UNEXPECTED_FORMAT.to_string(),
        },
        _ => return UNEXPECTED_FORMAT.to_string(),
    };

    let lines: Vec<String> = keywords
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            let mut info = vec![format!("Keyword: {}", display(record.get("keyword")))];
            if record.contains_key("search_volume") {
                info.push(format!(
                    "Search volume: {}",
                    display(record.get("search_volume"))
                ));
            }
            info.join(" | ")
        })
        .collect();

    if lines.is_empty() {
        NO_DATA_FOR_QUERY.to_string()
    } else {
        lines.join("\n")
    }
}
