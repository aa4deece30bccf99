//! Contract Review Server
//!
//! Serves the clause anchoring and escalation core over HTTP. Provides REST
//! API endpoints for:
//!
//! - Anchoring flagged clauses as color-coded comments
//! - Negotiation recommendations from customer history
//! - Approval matrix rendering for analysis prompts
//! - Escalation e-mail text
//!
//! ## Architecture
//!
//! The server owns no document or model access. Callers bring the document
//! text and the violations found by the analysis stage; the server returns
//! comment and highlight requests for them to apply. Customer history and
//! the approval matrix are loaded from JSON files at startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use compliance_engine::{ApprovalMatrix, ComplianceEngine, CustomerHistory, EngineConfig};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
#[cfg(test)]
mod tests;

use api::{
    handle_anchor, handle_approval_matrix, handle_escalation_email, handle_health,
    handle_list_customers, handle_recommend,
};

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "review-server")]
#[command(about = "Contract review server for clause anchoring and escalation")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Customer contract history (JSON object keyed by customer name)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Approval matrix (JSON array of rules)
    #[arg(long)]
    matrix_file: Option<PathBuf>,

    /// Override the excerpt prefix length used when the full excerpt is not found
    #[arg(long)]
    fallback_prefix_chars: Option<usize>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ComplianceEngine>,
    pub history: Arc<CustomerHistory>,
    pub matrix: Arc<ApprovalMatrix>,
}

/// Routes without transport middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/anchor", post(handle_anchor))
        .route("/api/recommend", post(handle_recommend))
        .route("/api/customers", get(handle_list_customers))
        .route("/api/approval-matrix", get(handle_approval_matrix))
        .route("/api/escalation-email", post(handle_escalation_email))
        .with_state(state)
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting review server on {}:{}", args.host, args.port);

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&read_file(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(chars) = args.fallback_prefix_chars {
        config.fallback_prefix_chars = chars;
    }

    let history = match &args.history_file {
        Some(path) => CustomerHistory::from_json(&read_file(path)?)?,
        None => CustomerHistory::new(),
    };
    let matrix = match &args.matrix_file {
        Some(path) => ApprovalMatrix::from_json(&read_file(path)?)?,
        None => ApprovalMatrix::default(),
    };
    info!(
        "Loaded {} customer(s) and {} approval rule(s)",
        history.len(),
        matrix.rules.len()
    );

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("Failed to create rate limiter config")?,
    );

    // Create shared state
    let state = AppState {
        engine: Arc::new(ComplianceEngine::new(config)),
        history: Arc::new(history),
        matrix: Arc::new(matrix),
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
