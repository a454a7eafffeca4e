use anyhow::Result;
use chrono::Utc;
use fleetwatch_alert::{MetricRegistry, TickOutcome};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use fleetwatch_server::app;
use fleetwatch_server::config::ServerConfig;
use fleetwatch_server::runtime;
use fleetwatch_server::seed;
use fleetwatch_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  fleetwatch-server [config.toml]                           Start the server");
    eprintln!("  fleetwatch-server run-once <config.toml>                  Run a single reconciliation pass");
    eprintln!("  fleetwatch-server init-catalog <config.toml> <seed.json>  Seed configurations and definitions");
}

#[tokio::main]
async fn main() -> Result<()> {
    fleetwatch_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fleetwatch=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("init-catalog") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-catalog requires <config.toml> and <seed.json> arguments")
            })?;
            let seed_path = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-catalog requires <seed.json> argument")
            })?;
            run_init_catalog(config_path, seed_path).await
        }
        Some("run-once") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("run-once requires <config.toml> argument")
            })?;
            run_once(config_path).await
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

async fn run_init_catalog(config_path: &str, seed_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let store = runtime::open_store(&config).await?;
    let seed_file = seed::read_seed_file(seed_path)?;

    let summary = seed::init_catalog(&store, &seed_file).await?;
    tracing::info!(
        configurations = summary.configurations_created,
        definitions = summary.definitions_created,
        skipped = summary.skipped,
        "Catalog initialization complete"
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn run_once(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let store = Arc::new(runtime::open_store(&config).await?);
    let metrics = Arc::new(MetricRegistry::new());
    let scheduler = runtime::build_scheduler(&config, store, metrics.clone())?;

    match scheduler.run_once().await {
        TickOutcome::Completed(report) => {
            println!("{report}");
            print!("{}", metrics.render_prometheus());
            Ok(())
        }
        TickOutcome::Failed(e) => Err(anyhow::anyhow!("Reconciliation pass failed: {e}")),
        TickOutcome::Follower => {
            println!("follower instance, pass skipped");
            Ok(())
        }
        TickOutcome::Skipped => {
            println!("previous pass still running, pass skipped");
            Ok(())
        }
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.redacted_url(),
        role = ?config.high_availability.role,
        "fleetwatch-server starting"
    );

    let store = Arc::new(runtime::open_store(&config).await?);
    let metrics = Arc::new(MetricRegistry::new());

    let scheduler_handle = if config.alert_query.enabled {
        let scheduler = runtime::build_scheduler(&config, store.clone(), metrics.clone())?;
        tracing::info!(
            interval_secs = config.alert_query.interval_secs,
            initial_delay_secs = config.alert_query.initial_delay_secs,
            batch_size = config.alert_query.batch_size,
            "Alert query scheduler enabled"
        );
        Some(tokio::spawn(async move {
            scheduler.run().await;
        }))
    } else {
        tracing::info!("Alert query scheduler disabled");
        None
    };

    let state = AppState {
        store,
        metrics,
        start_time: Utc::now(),
    };

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    let http_server = axum::serve(http_listener, app::build_http_app(state));

    tracing::info!(http = %http_addr, "Server started");

    tokio::select! {
        result = http_server.with_graceful_shutdown(async { signal::ctrl_c().await.ok(); }) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    if let Some(h) = scheduler_handle {
        h.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}
