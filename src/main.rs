mod calls;
mod config;
mod docs;
mod error;
mod handlers;
mod livekit;
mod livekit_types;
mod types;
mod utils;

use crate::config::Config;
use crate::livekit::LiveKitClient;
use crate::types::AppState;

use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
    pub const ROOM_PREFIX: &str = "outbound";
    /// Rooms nobody joins (e.g. after a failed dial) close themselves after this long.
    pub const ROOM_EMPTY_TIMEOUT_SECS: u32 = 300;
    pub const TOKEN_TTL_SECS: i64 = 600;
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("tower_http", tracing_subscriber::filter::LevelFilter::DEBUG),
            ("outbound_calls", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error=%e, "invalid configuration");
            process::exit(1);
        }
    };
    info!(config=?config, "loaded configuration");

    let livekit_client = LiveKitClient::new(
        reqwest::Client::new(),
        &config.livekit_url,
        config.livekit_api_key.clone(),
        config.livekit_api_secret.clone(),
    );
    let listen_addr = config.listen_addr;
    let app_state = Arc::new(AppState {
        config,
        platform: Arc::new(livekit_client),
    });

    let app = handlers::router(app_state);

    let server = match axum::Server::try_bind(&listen_addr) {
        Ok(builder) => builder.serve(app.into_make_service()),
        Err(e) => {
            error!(error=%e, addr=%listen_addr, "failed to bind");
            process::exit(1);
        }
    };
    info!(addr=%listen_addr, "listening");
    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!(error=%e, "server error");
        process::exit(1);
    }
    info!("shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error=%e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error=%e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
