// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod api;
mod blockchain;
mod config;
mod error;
mod onramp;
mod poller;
mod providers;
mod redirect;
mod relay;
mod session;
mod state;
mod storage;
#[cfg(test)]
mod testing;

#[cfg(not(test))]
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::EnvFilter;

#[cfg(not(test))]
use api::router;
#[cfg(not(test))]
use config::{
    env_or_default, DATA_DIR_ENV, INITIAL_CHAIN_ID_ENV, POLL_INTERVAL_SECS_ENV, STARTUP_URL_ENV,
};
#[cfg(not(test))]
use providers::{
    AuthClientFactory, GelatoRelayClient, MoneriumClient, MoneriumHttpClient,
    ProtocolClientFactory, RelayClient, SafeAuthFactory, SafeProtocolFactory, StripeClient,
    StripeOnrampClient,
};
#[cfg(not(test))]
use session::SessionManager;
#[cfg(not(test))]
use state::AppState;
#[cfg(not(test))]
use storage::LocalStore;

#[cfg(not(test))]
#[tokio::main]
async fn main() {
    init_tracing();

    let data_dir = PathBuf::from(env_or_default(DATA_DIR_ENV, "/data"));
    let store = match LocalStore::open(data_dir.join("session.redb")) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open local store under {}: {e}", data_dir.display());
            std::process::exit(1);
        }
    };

    let auth_factory = match SafeAuthFactory::from_env() {
        Ok(factory) => Arc::new(factory) as Arc<dyn AuthClientFactory>,
        Err(e) => {
            eprintln!("Failed to configure wallet-auth client: {e}");
            std::process::exit(1);
        }
    };
    let protocol_factory = Arc::new(SafeProtocolFactory::new()) as Arc<dyn ProtocolClientFactory>;
    let relay_client = match GelatoRelayClient::from_env() {
        Ok(client) => Arc::new(client) as Arc<dyn RelayClient>,
        Err(e) => {
            eprintln!("Failed to configure relay client: {e}");
            std::process::exit(1);
        }
    };

    // Ramp flows are optional; without config their endpoints report 503.
    let stripe_client = match StripeOnrampClient::from_env() {
        Ok(client) => Some(Arc::new(client) as Arc<dyn StripeClient>),
        Err(e) => {
            warn!(error = %e, "Stripe on-ramp disabled");
            None
        }
    };
    let monerium_client = match MoneriumHttpClient::from_env() {
        Ok(client) => Some(Arc::new(client) as Arc<dyn MoneriumClient>),
        Err(e) => {
            warn!(error = %e, "Monerium ramp disabled");
            None
        }
    };

    let session = SessionManager::new(
        store,
        auth_factory,
        protocol_factory,
        relay_client,
        stripe_client,
        monerium_client,
    );

    if let Ok(secs) = env::var(POLL_INTERVAL_SECS_ENV) {
        match secs.parse::<u64>() {
            Ok(secs) if secs > 0 => {
                session.set_poll_interval(std::time::Duration::from_secs(secs))
            }
            _ => warn!(value = %secs, "Ignoring invalid POLL_INTERVAL_SECS"),
        }
    }

    let startup_url = env::var(STARTUP_URL_ENV).ok();
    match startup_url {
        Some(ref url) => {
            if let Err(e) = session.start(Some(url)).await {
                eprintln!("Failed to start session on startup URL chain: {e}");
                std::process::exit(1);
            }
        }
        None => {
            let chain_id = env_or_default(INITIAL_CHAIN_ID_ENV, blockchain::initial_chain().id);
            if let Err(e) = session.switch_chain(&chain_id).await {
                eprintln!("Failed to start session on chain {chain_id}: {e}");
                std::process::exit(1);
            }
        }
    }

    let app = router(AppState::new(session));

    let host = env_or_default("HOST", "0.0.0.0");
    let port = env_or_default("PORT", "8080");
    let addr: SocketAddr = match format!("{host}:{port}").parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid bind address {host}:{port}: {e}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Safe session server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(test))]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    if env_or_default("LOG_FORMAT", "pretty") == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(not(test))]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
