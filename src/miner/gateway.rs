// SPDX-License-Identifier: MIT

//! Outbound calls to the Marketing Miner API.
//!
//! Every failure mode (no token, HTTP error status, network or decode error)
//! is folded into [`ApiResponse::Failure`] so tools can hand the message back
//! to the caller as-is.

use crate::miner::config::{ApiConfig, Endpoint};
use crate::miner::credential::Credential;
use crate::toolkit::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Query parameter the token is sent under.
pub const TOKEN_PARAM: &str = "api_token";

pub const MISSING_TOKEN_MESSAGE: &str = "Error: Marketing Miner API token is not configured. \
     Set MARKETING_MINER_API_TOKEN or pass --api-token.";

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("{0}")]
    Transport(String),
}

/// Normalized result of one remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Human-readable failure message
    Failure(String),
    /// Parsed JSON body of a 2xx response, unmodified
    Body(Value),
}

/// Minimal HTTP seam: one GET returning a JSON body.
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get_json(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> std::result::Result<Value, GatewayError>;
}

/// `reqwest`-backed [`HttpGet`] with a fixed per-request timeout.
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("keyminer-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpGet for ReqwestHttp {
    async fn get_json(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> std::result::Result<Value, GatewayError> {
        // without_url(): the query string carries the token
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                code: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))
    }
}

/// Request gateway shared by all tools.
#[derive(Clone)]
pub struct Gateway {
    config: ApiConfig,
    http: Arc<dyn HttpGet>,
}

impl Gateway {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Arc::new(ReqwestHttp::new(&config)?);
        Ok(Self { config, http })
    }

    pub fn with_http(config: ApiConfig, http: Arc<dyn HttpGet>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Issues exactly one GET to `endpoint`, or none if the token is empty.
    pub async fn call_remote(
        &self,
        credential: &Credential,
        endpoint: Endpoint,
        mut params: Vec<(String, String)>,
    ) -> ApiResponse {
        if credential.is_empty() {
            log::warn!("Refusing {:?} call: no API token configured", endpoint);
            return ApiResponse::Failure(MISSING_TOKEN_MESSAGE.to_string());
        }

        let url = match self.config.endpoint_url(endpoint) {
            Ok(url) => url,
            Err(e) => return ApiResponse::Failure(failure_message(&e.to_string())),
        };

        params.retain(|(k, _)| k != TOKEN_PARAM);
        params.push((TOKEN_PARAM.to_string(), credential.expose().to_string()));

        log::debug!("GET {} ({} params)", url, params.len());

        match self.http.get_json(url, &params).await {
            Ok(body) => ApiResponse::Body(body),
            Err(e) => {
                log::warn!("Marketing Miner {:?} call failed: {}", endpoint, e);
                ApiResponse::Failure(failure_message(&e.to_string()))
            }
        }
    }
}

fn failure_message(detail: &str) -> String {
    format!("Error calling Marketing Miner API: {}", detail)
}
