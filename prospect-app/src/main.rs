use anyhow::{Context, Result};
use clap::Parser;
use prospect_common::observability::{LogConfig, init_logging};
use prospect_config::{ProspectConfig, ProspectConfigLoader};
use prospect_extract::ExtractionPipeline;
use prospect_web::FantocciniRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod server;

#[derive(Parser, Debug)]
#[command(name = "prospect", about = "Contact and content extraction service")]
struct Args {
    /// YAML configuration file; a missing file falls back to built-in
    /// defaults plus `PROSPECT__` environment overrides.
    #[arg(long, default_value = "prospect.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1) Load config (env wins)
    let cfg: ProspectConfig = ProspectConfigLoader::new()
        .with_optional_file(&args.config)
        .load()
        .context("failed to load configuration")?;

    let log_path = init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;
    tracing::info!(log_file = %log_path.display(), "logging initialised");

    // 2) Establish the browser session before the listener binds, so a
    // serving process always has a ready rendering engine.
    let renderer = Arc::new(
        FantocciniRenderer::connect(&cfg.browser)
            .await
            .context("failed to connect to the WebDriver endpoint")?,
    );
    tracing::info!(webdriver = %cfg.browser.webdriver_url, "browser session ready");

    let pipeline = ExtractionPipeline::new(
        renderer.clone(),
        &cfg.heuristics,
        Duration::from_millis(cfg.throttle.cooldown_ms),
    )?;

    let state = Arc::new(server::AppState { pipeline });
    let app = server::build_router(state);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "scrape service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!(error = %e, "browser session did not close cleanly");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
