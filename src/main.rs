use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod collector;
mod config;
mod error;
mod formatter;
mod handlers;
mod metrics;
mod providers;
mod routes;
mod snmp;

use collector::SnmpCollector;
use formatter::JsonFormatter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("snmp_telemetry=info".parse()?))
        .init();

    let config = config::AppConfig::load(config::AppConfig::default_path())?;
    config.log_summary();
    let collector = SnmpCollector::from_config(&config)?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("serve") => serve(collector, &config.settings.server.listen).await,
        None => run_once(collector).await,
        Some(other) => anyhow::bail!("unknown command '{}', expected 'serve' or no argument", other),
    }
}

/// One pass; the report goes to stdout.
async fn run_once(collector: SnmpCollector) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling collection pass");
            on_signal.cancel();
        }
    });

    let report = collector.collect_all(cancel).await.context("collection pass aborted")?;
    println!("{}", JsonFormatter::to_json_string(&report)?);
    Ok(())
}

async fn serve(collector: SnmpCollector, listen: &str) -> Result<()> {
    let shutdown = CancellationToken::new();
    let app = routes::create_router(collector, shutdown.clone());

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context(format!("cannot bind {}", listen))?;
    tracing::info!(listen, "collector HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
            shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
