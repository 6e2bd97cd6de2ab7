// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use account_monitor::{
    app, discovery,
    logging::{self, LoggingConfig},
    metrics, reconcile, scheduler,
    state::AppState,
};
use anyhow::Context;
use config::{Args, MonitorConfig};
use std::future::IntoFuture;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let env_loaded = config::load_env_file(&args.env_file)?;
    let config = MonitorConfig::from_env()?;

    let _log_guard = logging::init_with_config(LoggingConfig::from(&config.log))?;
    if env_loaded {
        tracing::info!(path = %args.env_file, "Loaded environment file");
    }

    if config.metrics.enabled {
        metrics::init(&config.metrics.prometheus_prefix);
    }

    let state = AppState::new(config).await?;

    if args.once {
        discovery::run_discovery_cycle(&state).await;
        let summary = reconcile::run_balance_cycle(&state).await;
        tracing::info!(
            changes = summary.changes,
            alerts = summary.alerts,
            failed_networks = ?summary.failed_networks,
            "Single cycle finished"
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Discovery first so the first balance cycle sees discovered assets.
    discovery::run_discovery_cycle(&state).await;

    let discovery_state = state.clone();
    let discovery_task = scheduler::spawn_cycle_after(
        "discovery",
        state.config.schedule.discovery_interval,
        state.config.schedule.discovery_interval,
        shutdown_rx.clone(),
        move || {
            let state = discovery_state.clone();
            async move { discovery::run_discovery_cycle(&state).await }
        },
    );

    let balance_state = state.clone();
    let balance_task = scheduler::spawn_cycle(
        "balance",
        state.config.schedule.balance_interval,
        shutdown_rx.clone(),
        move || {
            let state = balance_state.clone();
            async move {
                reconcile::run_balance_cycle(&state).await;
            }
        },
    );

    let host = state.config.http.host.clone();
    let port = state.config.http.port;
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!(
        networks = state.registry.active_networks().count(),
        accounts = state.registry.monitored_accounts().count(),
        "Account monitor started"
    );
    tracing::info!("Starting server on {}", listener.local_addr()?);

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(
        axum::serve(listener, app::create_app(state))
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .into_future(),
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    let (discovery, balance, server) = tokio::join!(discovery_task, balance_task, server);
    discovery?;
    balance?;
    server??;
    tracing::info!("Account monitor stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
