// insights-service-rs/src/main.rs
// Repository insights tool server
// Exposes get_repository_health, get_repository_issues_summary and
// get_repository_contributors over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use github_sdk::config::{EnvConfigProvider, GitHubConfig, ServerConfig};
use github_sdk::{GitHubClient, RateBudget};

mod service;
mod tools;

use service::AppState;

/// Default port of this server
const DEFAULT_PORT: u16 = 8001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let provider = EnvConfigProvider::new();
    let github_config = GitHubConfig::from_provider(&provider)?;
    let server_config = ServerConfig::from_provider(&provider, DEFAULT_PORT);

    // One budget for the whole process; every call made by every tool
    // draws from it.
    let budget = Arc::new(RateBudget::new(
        github_config.rate_permits,
        Duration::from_millis(github_config.rate_window_ms),
    ));

    let client = GitHubClient::builder()
        .config(github_config)
        .rate_budget(budget)
        .build()?;

    log::info!("GitHub client initialized with shared rate budget");

    let state = Arc::new(AppState::new(client));
    let app = Router::new()
        .route("/health", get(service::health))
        .route("/tools/:name", post(service::execute_tool))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    log::info!("insights service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
