use crate::config::ServerConfig;
use crate::models::Site;
use crate::scraper::ContestScraper;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tracing::{info, warn};

type AppState = Arc<ContestScraper>;

pub fn create_router(scraper: AppState) -> Router {
    Router::new()
        .route("/api/contests/codeforces", get(codeforces))
        .route("/api/contests/atcoder", get(atcoder))
        .route("/api/contests/codechef", get(codechef))
        .route("/api/liveness", get(liveness))
        .with_state(scraper)
}

pub async fn serve(scraper: AppState, config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server start at {}", addr);
    axum::serve(listener, create_router(scraper))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn codeforces(State(scraper): State<AppState>) -> Response {
    contests(&scraper, Site::Codeforces).await
}

async fn atcoder(State(scraper): State<AppState>) -> Response {
    contests(&scraper, Site::AtCoder).await
}

async fn codechef(State(scraper): State<AppState>) -> Response {
    contests(&scraper, Site::CodeChef).await
}

async fn liveness() -> StatusCode {
    StatusCode::OK
}

async fn contests(scraper: &ContestScraper, site: Site) -> Response {
    match scraper.upcoming(site).await {
        Ok(contests) => Json(contests).into_response(),
        Err(e) => {
            warn!("{}: request failed: {}", site, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("SIGINT signal received, starting graceful shutdown.");
}
