// SPDX-License-Identifier: MIT

//! Process configuration: CLI flags with environment fallbacks.

use crate::toolkit::error::{MinerError, Result};
use clap::{CommandFactory, Parser};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://profilers-api.marketingminer.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TRANSPORTS: &str = "http,stdio";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "MCP server for Marketing Miner keyword research", long_about = None)]
pub struct Cli {
    /// Marketing Miner API token (environment variables take precedence)
    #[arg(long)]
    pub api_token: Option<String>,

    /// Host to bind network transports to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind network transports to
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// URL path the MCP endpoint is mounted on
    #[arg(long, env = "MCP_HTTP_PATH", default_value = "/mcp")]
    pub path: String,

    /// Transport mechanisms to try, in order
    #[arg(long = "transport", env = "MCP_TRANSPORTS", value_delimiter = ',', default_value = DEFAULT_TRANSPORTS)]
    pub transports: Vec<String>,

    /// Base URL of the Marketing Miner API
    #[arg(long, env = "MARKETING_MINER_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Timeout for each outbound API request, in seconds
    #[arg(long, env = "MARKETING_MINER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Cli {
    /// Parses arguments without ever failing on unrecognised input.
    ///
    /// Unknown flags (and a value directly following one) are dropped and the
    /// rest is parsed normally. Help and version requests still print and
    /// exit. If what remains still does not parse, env/defaults apply and the
    /// token is recovered by scanning the raw arguments.
    pub fn parse_lenient<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match Self::try_parse_from(known_args(&args)) {
            Ok(cli) => cli,
            Err(e) => {
                use clap::error::ErrorKind;
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                    e.exit();
                }
                log::warn!("Ignoring unparseable arguments ({:?})", e.kind());
                let program = args.first().cloned().unwrap_or_else(|| "keyminer".into());
                let mut cli = Self::try_parse_from([program])
                    .unwrap_or_else(|_| Self::fallback());
                cli.api_token = crate::miner::credential::token_from_args(&args);
                cli
            }
        }
    }

    fn fallback() -> Self {
        Self {
            api_token: None,
            host: "0.0.0.0".into(),
            port: 8000,
            path: "/mcp".into(),
            transports: DEFAULT_TRANSPORTS.split(',').map(String::from).collect(),
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn api_config(&self) -> Result<ApiConfig> {
        ApiConfig::new(&self.api_base, Duration::from_secs(self.timeout_secs))
    }

    pub fn serve_config(&self) -> ServeConfig {
        ServeConfig {
            host: self.host.clone(),
            port: self.port,
            path: normalize_path(&self.path),
        }
    }

    /// Transport names, lowercased, with whitespace and empties removed.
    pub fn transport_order(&self) -> Vec<String> {
        self.transports
            .iter()
            .flat_map(|t| t.split(','))
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// `args` with every flag `Cli` does not declare removed.
///
/// An unknown `--flag` swallows the next argument too unless that one looks
/// like a flag itself; stray positionals are dropped.
fn known_args(args: &[String]) -> Vec<String> {
    let command = Cli::command();
    let valued: Vec<&str> = command
        .get_arguments()
        .filter(|arg| arg.get_action().takes_values())
        .filter_map(|arg| arg.get_long())
        .collect();

    let mut kept = Vec::with_capacity(args.len());
    let mut rest = args.iter().peekable();
    if let Some(program) = rest.next() {
        kept.push(program.clone());
    }

    while let Some(arg) = rest.next() {
        let long = arg
            .strip_prefix("--")
            .map(|flag| flag.split_once('=').map_or(flag, |(name, _)| name));

        match long {
            Some(name) if valued.contains(&name) => {
                kept.push(arg.clone());
                if !arg.contains('=') {
                    if let Some(value) = rest.next() {
                        kept.push(value.clone());
                    }
                }
            }
            Some("help") | Some("version") => kept.push(arg.clone()),
            _ if arg == "-h" || arg == "-V" => kept.push(arg.clone()),
            _ => {
                let name = arg.split_once('=').map_or(arg.as_str(), |(name, _)| name);
                log::warn!("Ignoring unrecognised argument '{}'", name);
                if arg.starts_with('-') && !arg.contains('=') {
                    rest.next_if(|next| !next.starts_with('-'));
                }
            }
        }
    }

    kept
}

/// Network transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ServeConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The remote endpoints a tool can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Suggestions,
    SearchVolume,
    KeywordData,
}

/// Remote API location and request policy.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub suggestions_path: String,
    pub search_volume_path: String,
    pub keyword_data_path: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)?;
        if timeout.is_zero() {
            return Err(MinerError::config("request timeout must be non-zero"));
        }
        Ok(Self {
            base_url,
            suggestions_path: "/keywords/suggestions".into(),
            search_volume_path: "/keywords/search-volume-data".into(),
            keyword_data_path: "/keyword-data".into(),
            timeout,
        })
    }

    fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Suggestions => &self.suggestions_path,
            Endpoint::SearchVolume => &self.search_volume_path,
            Endpoint::KeywordData => &self.keyword_data_path,
        }
    }

    /// Full URL for an endpoint; any path prefix on the base is kept.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        let path = normalize_path(self.path(endpoint));
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.into(),
            suggestions_path: "/keywords/suggestions".into(),
            search_volume_path: "/keywords/search-volume-data".into(),
            keyword_data_path: "/keyword-data".into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ApiConfig::default();
        assert_eq!(
            config.endpoint_url(Endpoint::Suggestions).unwrap().as_str(),
            "https://profilers-api.marketingminer.com/keywords/suggestions"
        );
        assert_eq!(
            config.endpoint_url(Endpoint::SearchVolume).unwrap().as_str(),
            "https://profilers-api.marketingminer.com/keywords/search-volume-data"
        );
        assert_eq!(
            config.endpoint_url(Endpoint::KeywordData).unwrap().as_str(),
            "https://profilers-api.marketingminer.com/keyword-data"
        );
    }

    #[test]
    fn test_base_prefix_is_kept() {
        let config = ApiConfig::new("http://127.0.0.1:9000/proxy/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            config.endpoint_url(Endpoint::Suggestions).unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/keywords/suggestions"
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(ApiConfig::new("not a url", Duration::from_secs(5)).is_err());
        assert!(ApiConfig::new("http://localhost", Duration::ZERO).is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "keyminer",
            "--api-token",
            "abc",
            "--port",
            "9100",
            "--path",
            "rpc",
            "--transport",
            "stdio, HTTP",
        ])
        .unwrap();
        assert_eq!(cli.api_token.as_deref(), Some("abc"));
        assert_eq!(cli.serve_config().port, 9100);
        assert_eq!(cli.serve_config().path, "/rpc");
        assert_eq!(cli.transport_order(), vec!["stdio", "http"]);
    }

    #[test]
    fn test_parse_lenient_recovers_token_from_unknown_args() {
        let cli = Cli::parse_lenient(["keyminer", "--no-such-flag", "--api-token=tok"]);
        assert_eq!(cli.api_token.as_deref(), Some("tok"));
        assert!(!cli.transport_order().is_empty());
    }

    #[test]
    fn test_parse_lenient_keeps_known_flags_around_unknown_ones() {
        let cli = Cli::parse_lenient([
            "keyminer",
            "--unknown",
            "--transport",
            "stdio",
            "--port",
            "9100",
        ]);
        assert_eq!(cli.transport_order(), vec!["stdio"]);
        assert_eq!(cli.port, 9100);

        let cli = Cli::parse_lenient([
            "keyminer",
            "--mode",
            "fast",
            "--path=rpc",
            "stray",
            "--verbose=2",
            "--timeout-secs",
            "5",
            "--api-token",
            "tok",
        ]);
        assert_eq!(cli.serve_config().path, "/rpc");
        assert_eq!(cli.timeout_secs, 5);
        assert_eq!(cli.api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_known_args_drops_only_unknown_flags() {
        let args: Vec<String> = ["keyminer", "-x", "--api-base", "http://h", "--flag", "v"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(known_args(&args), vec!["keyminer", "--api-base", "http://h"]);
    }

    #[test]
    fn test_bind_addr() {
        let serve = ServeConfig {
            host: "127.0.0.1".into(),
            port: 8000,
            path: "/mcp".into(),
        };
        assert_eq!(serve.bind_addr(), "127.0.0.1:8000");
    }
}
