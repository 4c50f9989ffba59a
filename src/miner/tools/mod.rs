// SPDX-License-Identifier: MIT

//! Keyword-research tools and the helpers they share for unwrapping the API
//! envelope and rendering records as text.

pub mod debug;
pub mod keyword_data;
pub mod search_volume;
pub mod suggestions;

use crate::miner::gateway::{ApiResponse, Gateway};
use crate::toolkit::error::{MinerError, Result};
use crate::toolkit::tool::Tool;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const NO_DATA_FOR_QUERY: &str = "No data found for this query.";
pub const NO_DATA_FOR_KEYWORD: &str = "No data found for this keyword.";
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format from API";
pub const UNKNOWN_API_ERROR: &str = "Unknown error from Marketing Miner API";

/// Arguments shared by the single-keyword lookups.
#[derive(Debug, Deserialize)]
pub struct KeywordArgs {
    pub lang: String,
    pub keyword: String,
}

/// Builds every tool served by this process around one gateway.
pub fn create_tools(gateway: Gateway) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(suggestions::KeywordSuggestionsTool::new(gateway.clone())),
        Arc::new(search_volume::SearchVolumeTool::new(gateway.clone())),
        Arc::new(keyword_data::KeywordDataTool::new(gateway.clone())),
        Arc::new(debug::DebugStatusTool::new(gateway)),
    ]
}

pub(crate) fn decode_args<T: DeserializeOwned>(input: Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| MinerError::invalid_arguments(e.to_string()))
}

/// Strips the `{status, data | message}` envelope.
///
/// `Err` holds the text to return to the caller verbatim.
pub(crate) fn unwrap_envelope(resp: ApiResponse) -> std::result::Result<Value, String> {
    let body = match resp {
        ApiResponse::Failure(message) => return Err(message),
        ApiResponse::Body(body) => body,
    };

    match body.get("status").and_then(Value::as_str) {
        Some("error") => Err(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_API_ERROR)
            .to_string()),
        Some("success") => Ok(body.get("data").cloned().unwrap_or(Value::Null)),
        _ => Err(UNEXPECTED_FORMAT.to_string()),
    }
}

/// First record of a `data` array, `Ok(None)` when there is nothing to show.
pub(crate) fn first_record(data: &Value) -> std::result::Result<Option<&Map<String, Value>>, String> {
    match data {
        Value::Null => Ok(None),
        Value::Array(items) => match items.first() {
            None => Ok(None),
            Some(Value::Object(record)) => Ok(Some(record)),
            Some(_) => Err(UNEXPECTED_FORMAT.to_string()),
        },
        _ => Err(UNEXPECTED_FORMAT.to_string()),
    }
}

/// Plain rendering of a JSON scalar; missing/null becomes `N/A`.
pub(crate) fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `Keyword`, `Search volume` and optional `CPC` lines of a volume record.
pub(crate) fn volume_lines(record: &Map<String, Value>) -> Vec<String> {
    let mut lines = vec![
        format!("Keyword: {}", display(record.get("keyword"))),
        format!("Search volume: {}", display(record.get("search_volume"))),
    ];

    if let Some(cpc) = record
        .get("cpc")
        .and_then(Value::as_object)
        .filter(|cpc| !cpc.is_empty())
    {
        let currency = cpc
            .get("currency_code")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let line = format!("CPC: {} {}", display(cpc.get("value")), currency);
        lines.push(line.trim_end().to_string());
    }

    lines
}
