// SPDX-License-Identifier: MIT

//! Transport bootstrap.
//!
//! The host environment decides which transport actually works, so startup
//! walks an ordered list of `(name, start)` attempts and stops at the first one
//! that serves to completion.

use crate::miner::config::ServeConfig;
use crate::miner::server::MinerServer;
use crate::toolkit::error::MinerError;
use axum::{routing::get, Json, Router};
use futures::future::BoxFuture;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use std::process::ExitCode;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub type StartFn = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// One named way of accepting MCP connections.
pub struct TransportAttempt {
    pub name: String,
    start: StartFn,
}

impl TransportAttempt {
    pub fn new<F>(name: impl Into<String>, start: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            start: Box::new(start),
        }
    }
}

/// What happened during bootstrap.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    /// Transport that served successfully, if any
    pub served_by: Option<String>,
    /// `(name, error)` for every attempt that failed, in order
    pub failures: Vec<(String, String)>,
}

impl BootstrapReport {
    pub fn succeeded(&self) -> bool {
        self.served_by.is_some()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

#[derive(Default)]
pub struct Bootstrap {
    attempts: Vec<TransportAttempt>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attempt: TransportAttempt) -> Self {
        self.attempts.push(attempt);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.name.as_str()).collect()
    }

    /// Tries each attempt once, in order, until one returns `Ok`.
    pub async fn run(self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for attempt in self.attempts {
            log::info!("Starting transport '{}'", attempt.name);
            match (attempt.start)().await {
                Ok(()) => {
                    log::info!("Transport '{}' finished cleanly", attempt.name);
                    report.served_by = Some(attempt.name);
                    return report;
                }
                Err(e) => {
                    log::error!("Transport '{}' failed: {:#}", attempt.name, e);
                    report.failures.push((attempt.name, format!("{:#}", e)));
                }
            }
        }

        log::error!(
            "All {} transport mechanisms failed",
            report.failures.len()
        );
        report
    }
}

/// Builds the attempt list for `names` from the transports this server knows.
///
/// Unrecognised names stay in the list and fail when tried.
pub fn bootstrap_for(names: &[String], server: MinerServer, serve: ServeConfig) -> Bootstrap {
    names.iter().fold(Bootstrap::new(), |bootstrap, name| {
        let server = server.clone();
        let serve = serve.clone();
        let attempt = match name.as_str() {
            "stdio" => TransportAttempt::new(name.clone(), move || {
                Box::pin(serve_stdio(server.clone()))
            }),
            "http" | "shttp" | "streamable-http" | "streamable_http" => {
                TransportAttempt::new(name.clone(), move || {
                    Box::pin(serve_http(server.clone(), serve.clone()))
                })
            }
            other => {
                let other = other.to_string();
                TransportAttempt::new(name.clone(), move || {
                    let err = MinerError::UnknownTransport(other.clone());
                    Box::pin(async move { Err::<(), anyhow::Error>(err.into()) })
                })
            }
        };
        bootstrap.with(attempt)
    })
}

/// MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: MinerServer) -> anyhow::Result<()> {
    log::info!("Serving MCP over stdio");
    let running = server.serve(stdio()).await?;
    let reason = running.waiting().await?;
    log::info!("stdio session ended: {:?}", reason);
    Ok(())
}

/// MCP streamable HTTP on `serve.path` until Ctrl-C.
pub async fn serve_http(server: MinerServer, serve: ServeConfig) -> anyhow::Result<()> {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let router = Router::new().route("/health", get(health_check));
    let router = if serve.path == "/" {
        router.fallback_service(mcp)
    } else {
        router.nest_service(&serve.path, mcp)
    };
    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(serve.bind_addr()).await?;
    log::info!(
        "Serving MCP over streamable HTTP on http://{}{}",
        listener.local_addr()?,
        serve.path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::credential::Credential;
    use crate::toolkit::registry::ToolRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn recording(
        name: &str,
        log: Arc<Mutex<Vec<String>>>,
        succeed: bool,
    ) -> TransportAttempt {
        let label = name.to_string();
        TransportAttempt::new(name, move || {
            let log = log.clone();
            let label = label.clone();
            Box::pin(async move {
                log.lock().unwrap().push(label.clone());
                if succeed {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("{} unavailable", label))
                }
            })
        })
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let report = Bootstrap::new()
            .with(recording("http", log.clone(), false))
            .with(recording("shttp", log.clone(), true))
            .with(recording("stdio", log.clone(), true))
            .run()
            .await;

        assert_eq!(*log.lock().unwrap(), vec!["http", "shttp"]);
        assert_eq!(report.served_by.as_deref(), Some("shttp"));
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_all_failing_tries_each_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let report = Bootstrap::new()
            .with(recording("a", log.clone(), false))
            .with(recording("b", log.clone(), false))
            .with(recording("c", log.clone(), false))
            .run()
            .await;

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(!report.succeeded());
        let names: Vec<&str> = report.failures.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(report.failures[1].1, "b unavailable");
    }

    #[tokio::test]
    async fn test_empty_list_fails() {
        let report = Bootstrap::new().run().await;
        assert!(!report.succeeded());
    }

    #[tokio::test]
    async fn test_start_fn_invoked_once_per_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let report = Bootstrap::new()
            .with(TransportAttempt::new("only", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Err::<(), _>(anyhow::anyhow!("nope")) })
            }))
            .run()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_transport_fails_and_http_port_conflict_fails() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = MinerServer::new(ToolRegistry::new(), Credential::none());
        let serve = ServeConfig {
            host: "127.0.0.1".into(),
            port,
            path: "/mcp".into(),
        };
        let names = vec!["sse".to_string(), "http".to_string()];
        let bootstrap = bootstrap_for(&names, server, serve);
        assert_eq!(bootstrap.names(), vec!["sse", "http"]);

        let report = bootstrap.run().await;

        assert!(!report.succeeded());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].1, "Unknown transport mechanism: sse");
        assert_eq!(report.failures[1].0, "http");
        drop(taken);
    }
}
