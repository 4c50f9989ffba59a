// SPDX-License-Identifier: MIT

use dotenv::dotenv;
use keyminer_rs::miner::config::Cli;
use keyminer_rs::miner::credential;
use keyminer_rs::miner::gateway::Gateway;
use keyminer_rs::miner::server::MinerServer;
use keyminer_rs::miner::{tools, transport};
use keyminer_rs::toolkit::registry::ToolRegistry;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    // stderr only: stdout belongs to the stdio transport
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_lenient(std::env::args());
    let serve = cli.serve_config();
    let credential = credential::resolve_from_env(cli.api_token.as_deref());

    log::info!(
        "Boot host={} port={} path={} transports={:?}",
        serve.host,
        serve.port,
        serve.path,
        cli.transport_order()
    );
    log::info!("API token {}", credential.describe());

    let gateway = match cli.api_config().and_then(Gateway::new) {
        Ok(gateway) => gateway,
        Err(e) => {
            log::error!("Invalid API configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = ToolRegistry::new();
    for tool in tools::create_tools(gateway) {
        log::info!("Registered tool: {}", tool.name());
        registry.register(tool).await;
    }

    let server = MinerServer::new(registry, credential);
    let report = transport::bootstrap_for(&cli.transport_order(), server, serve)
        .run()
        .await;

    report.exit_code()
}
