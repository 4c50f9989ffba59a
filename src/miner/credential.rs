// SPDX-License-Identifier: MIT

//! API token resolution.
//!
//! The token is looked up once at startup from, in order: the accepted token
//! environment variables, the `--api-token` flag, and JSON session configs
//! injected by MCP hosts. A call may carry its own configuration, which then
//! takes precedence for that call only.

use serde_json::{Map, Value};
use std::fmt;

/// Environment variables that may hold the token directly, highest priority first.
pub const TOKEN_ENV_VARS: &[&str] = &[
    "MARKETING_MINER_API_TOKEN",
    "MARKETING_MINER_API_KEY",
    "MARKETING_MINER_TOKEN",
    "MM_API_TOKEN",
    "MM_API_KEY",
    "API_TOKEN",
    "API_KEY",
];

/// Environment variables that may hold a JSON session configuration.
pub const SESSION_CONFIG_ENV_VARS: &[&str] = &[
    "SMITHERY_SESSION_CONFIG",
    "SMITHERY_CONFIG",
    "MCP_SESSION_CONFIG",
];

/// Command-line flag carrying the token.
pub const API_TOKEN_FLAG: &str = "--api-token";

/// Field read from a per-call configuration mapping.
pub const CALL_CONFIG_TOKEN_FIELD: &str = "api_token";

const MAX_CONFIG_DEPTH: usize = 16;

/// Where a credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Env(&'static str),
    CliFlag,
    SessionConfig(&'static str),
    CallConfig,
    None,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(name) => write!(f, "env:{}", name),
            Self::CliFlag => write!(f, "cli:{}", API_TOKEN_FLAG),
            Self::SessionConfig(name) => write!(f, "session-config:{}", name),
            Self::CallConfig => write!(f, "call-config"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    /// The "nothing configured" credential.
    pub fn none() -> Self {
        Self::new(String::new(), CredentialSource::None)
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }

    pub fn len(&self) -> usize {
        self.token.chars().count()
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Raw token, for attaching to outbound requests only.
    pub fn expose(&self) -> &str {
        &self.token
    }

    /// Presence/length summary safe to log.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            "not configured".to_string()
        } else {
            format!("configured ({} chars, from {})", self.len(), self.source)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("len", &self.len())
            .field("source", &self.source)
            .finish()
    }
}

/// Resolves the process-wide credential.
///
/// `env` looks up an environment variable; `cli_token` is the value of the
/// `--api-token` flag if one was given.
pub fn resolve<F>(env: F, cli_token: Option<&str>) -> Credential
where
    F: Fn(&str) -> Option<String>,
{
    for &name in TOKEN_ENV_VARS {
        if let Some(value) = env(name) {
            let value = value.trim();
            if !value.is_empty() {
                return Credential::new(value, CredentialSource::Env(name));
            }
        }
    }

    if let Some(token) = cli_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Credential::new(token, CredentialSource::CliFlag);
    }

    for &name in SESSION_CONFIG_ENV_VARS {
        let Some(raw) = env(name) else { continue };
        match serde_json::from_str::<Value>(&raw) {
            Ok(config) => {
                if let Some(token) = find_token(&config) {
                    return Credential::new(token, CredentialSource::SessionConfig(name));
                }
            }
            Err(e) => log::debug!("Ignoring malformed JSON in {}: {}", name, e),
        }
    }

    Credential::none()
}

/// Resolves against the real process environment.
pub fn resolve_from_env(cli_token: Option<&str>) -> Credential {
    resolve(|name| std::env::var(name).ok(), cli_token)
}

/// Picks the credential for one call: a non-empty `api_token` in the call's
/// configuration wins over the process-wide one.
pub fn for_call(process: &Credential, call_config: Option<&Map<String, Value>>) -> Credential {
    call_config
        .and_then(|config| config.get(CALL_CONFIG_TOKEN_FIELD))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Credential::new(token, CredentialSource::CallConfig))
        .unwrap_or_else(|| process.clone())
}

/// Tolerant scan of raw process arguments for `--api-token <v>` or
/// `--api-token=<v>`. Everything else is ignored.
pub fn token_from_args<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == API_TOKEN_FLAG {
            return args.next().map(|v| v.as_ref().to_string());
        }
        if let Some(value) = arg
            .strip_prefix(API_TOKEN_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Depth-first search for the first non-empty string stored under a key that
/// mentions "token" or "key".
pub fn find_token(config: &Value) -> Option<String> {
    find_token_at(config, 0)
}

fn find_token_at(value: &Value, depth: usize) -> Option<String> {
    if depth >= MAX_CONFIG_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            match child {
                Value::String(s) if !s.is_empty() && is_token_key(key) => Some(s.clone()),
                _ => find_token_at(child, depth + 1),
            }
        }),
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_token_at(item, depth + 1)),
        _ => None,
    }
}

fn is_token_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("token") || key.contains("key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_env_wins_over_cli_flag() {
        let cred = resolve(env_of(&[("MM_API_KEY", "from-env")]), Some("from-cli"));
        assert_eq!(cred.expose(), "from-env");
        assert_eq!(cred.source(), &CredentialSource::Env("MM_API_KEY"));
    }

    #[test]
    fn test_env_names_respect_priority() {
        let cred = resolve(
            env_of(&[("API_KEY", "last"), ("MARKETING_MINER_API_KEY", "second")]),
            None,
        );
        assert_eq!(cred.expose(), "second");
    }

    #[test]
    fn test_blank_env_value_is_skipped() {
        let cred = resolve(
            env_of(&[("MARKETING_MINER_API_TOKEN", "   "), ("API_TOKEN", " abc ")]),
            None,
        );
        assert_eq!(cred.expose(), "abc");
        assert_eq!(cred.source(), &CredentialSource::Env("API_TOKEN"));
    }

    #[test]
    fn test_cli_flag_used_when_env_empty() {
        let cred = resolve(env_of(&[]), Some("cli-token"));
        assert_eq!(cred.expose(), "cli-token");
        assert_eq!(cred.source(), &CredentialSource::CliFlag);
    }

    #[test]
    fn test_cli_flag_wins_over_session_config() {
        let cred = resolve(
            env_of(&[("SMITHERY_CONFIG", r#"{"apiKey":"from-config"}"#)]),
            Some("cli-token"),
        );
        assert_eq!(cred.expose(), "cli-token");
    }

    #[test]
    fn test_session_config_nested_search() {
        let config = r#"{"server":{"name":"mm","auth":[{"mmApiToken":"nested-secret"}]}}"#;
        let cred = resolve(env_of(&[("MCP_SESSION_CONFIG", config)]), None);
        assert_eq!(cred.expose(), "nested-secret");
        assert_eq!(
            cred.source(),
            &CredentialSource::SessionConfig("MCP_SESSION_CONFIG")
        );
    }

    #[test]
    fn test_malformed_session_config_is_swallowed() {
        let cred = resolve(
            env_of(&[
                ("SMITHERY_SESSION_CONFIG", "{not json"),
                ("SMITHERY_CONFIG", r#"{"TOKEN":"ok"}"#),
            ]),
            None,
        );
        assert_eq!(cred.expose(), "ok");
    }

    #[test]
    fn test_nothing_configured_is_empty() {
        let cred = resolve(env_of(&[]), None);
        assert!(cred.is_empty());
        assert_eq!(cred.source(), &CredentialSource::None);
        assert_eq!(cred.describe(), "not configured");
    }

    #[test]
    fn test_find_token_ignores_non_string_and_empty_values() {
        let config = json!({"api_key": 42, "other": {"token": ""}, "z": {"secret_key": "found"}});
        assert_eq!(find_token(&config).as_deref(), Some("found"));
    }

    #[test]
    fn test_find_token_depth_is_bounded() {
        let mut value = json!({"token": "too-deep"});
        for _ in 0..MAX_CONFIG_DEPTH {
            value = json!({ "wrap": value });
        }
        assert_eq!(find_token(&value), None);

        let shallow = json!({"a": {"b": {"token": "near"}}});
        assert_eq!(find_token(&shallow).as_deref(), Some("near"));
    }

    #[test]
    fn test_debug_never_prints_token() {
        let cred = Credential::new("super-secret-value", CredentialSource::CliFlag);
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("18"));
        assert!(!cred.describe().contains("super-secret-value"));
    }

    #[test]
    fn test_token_from_args_tolerates_unknown_flags() {
        let args = ["keyminer", "--verbose", "--port", "9000", "--api-token", "abc"];
        assert_eq!(token_from_args(args).as_deref(), Some("abc"));

        let args = ["keyminer", "--weird=1", "--api-token=xyz", "positional"];
        assert_eq!(token_from_args(args).as_deref(), Some("xyz"));

        assert_eq!(token_from_args(["keyminer", "--api-token"]), None);
        assert_eq!(token_from_args(["keyminer", "--api-tokens=no"]), None);
    }

    #[test]
    fn test_call_config_overrides_process_credential() {
        let process = Credential::new("process", CredentialSource::Env("API_KEY"));
        let config = json!({"api_token": "per-call"});
        let cred = for_call(&process, config.as_object());
        assert_eq!(cred.expose(), "per-call");
        assert_eq!(cred.source(), &CredentialSource::CallConfig);
    }

    #[test]
    fn test_call_config_without_token_falls_back() {
        let process = Credential::new("process", CredentialSource::Env("API_KEY"));
        let config = json!({"api_token": "  ", "other": "x"});
        assert_eq!(for_call(&process, config.as_object()).expose(), "process");
        assert_eq!(for_call(&process, None).expose(), "process");
    }
}
