//! cellwatch telephony bridge
//!
//! Small daemon sitting between the QoE application shell and the
//! platform telephony stack.
//!
//! - Serves the call/response channel on a local WebSocket endpoint
//! - Answers point-in-time queries: carrier, signal, network type, operator
//! - Manages the ask-once phone-state permission flow
//! - In `--simulate` mode, fabricates emulator-like modem data for local dev

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use cellwatch_bridge::permission::PromptMode;
use cellwatch_bridge::{channel, BridgeState};
use cellwatch_common::models::{
    SENTINEL_CARRIER, SENTINEL_NETWORK_TYPE, SENTINEL_OPERATOR, SENTINEL_SIGNAL_DBM,
};

/// cellwatch bridge daemon.
#[derive(Parser, Debug)]
#[command(name = "cellwatch-bridge", about = "cellwatch telephony bridge")]
struct Cli {
    /// Channel listen address.
    #[arg(long, default_value = "127.0.0.1:3200")]
    listen: String,

    /// Run in simulation mode (fake modem, synthetic signal).
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// In simulate mode, resolve the permission prompt as denied.
    #[arg(long, default_value_t = false)]
    simulate_deny: bool,

    /// Simulated permission prompt delay in milliseconds.
    #[arg(long, default_value_t = 400)]
    prompt_delay_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(
        listen = %cli.listen,
        simulate = cli.simulate,
        "cellwatch-bridge starting"
    );

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let prompt = if cli.simulate {
        PromptMode::Simulated {
            grant: !cli.simulate_deny,
            delay: Duration::from_millis(cli.prompt_delay_ms),
        }
    } else {
        PromptMode::Probe
    };

    let state = Arc::new(BridgeState::new(cli.simulate, prompt, shutdown_rx));

    // ── Router ──────────────────────────────────────────────────
    let app = axum::Router::new()
        .route("/channel", axum::routing::get(channel::handler))
        .route("/api/status", axum::routing::get(status))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = cli.listen.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("channel listening on ws://{addr}/channel");

    let serve_handle = tokio::spawn(async move {
        axum::serve(listener, app).await
    });

    // ── Shutdown handling ───────────────────────────────────────
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
            let _ = shutdown_tx.send(true);
        }
        result = serve_handle => {
            match result {
                Ok(Err(e)) => tracing::error!(error = %e, "channel server failed"),
                Err(e) => tracing::error!("channel server task failed: {e}"),
                Ok(Ok(())) => {}
            }
        }
    }

    tracing::info!("cellwatch-bridge stopped");
    Ok(())
}

/// Diagnostic status endpoint — same permission gating as the channel.
async fn status(
    axum::extract::State(state): axum::extract::State<Arc<BridgeState>>,
) -> axum::Json<serde_json::Value> {
    let permission = state.permissions.state();
    let granted = permission.is_granted();

    let (carrier, signal_dbm, network_type, operator) = if granted {
        (
            state.scanner.carrier_name().await,
            state.scanner.signal_dbm().await,
            state.scanner.network_type().await,
            state.scanner.operator_code().await,
        )
    } else {
        (
            SENTINEL_CARRIER.to_string(),
            SENTINEL_SIGNAL_DBM,
            SENTINEL_NETWORK_TYPE.to_string(),
            SENTINEL_OPERATOR.to_string(),
        )
    };

    axum::Json(serde_json::json!({
        "simulate": state.simulate,
        "permission": permission,
        "carrier": carrier,
        "signal_dbm": signal_dbm,
        "network_type": network_type,
        "operator": operator,
        "uptime_s": state.started_at.elapsed().as_secs(),
    }))
}
