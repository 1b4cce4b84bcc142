// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use persona_identity::api::router;
use persona_identity::config::{DATA_DIR_ENV, DEFAULT_LOG_FILTER};
use persona_identity::provisioning::ProvisioningClient;
use persona_identity::state::AppState;
use persona_identity::storage::{
    FileSlot, IdentityCache, MemorySlot, StorageSlot, IDENTITY_SLOT_FILE,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

/// Pick the identity slot for this environment: file-backed when a data
/// directory is configured, in-memory otherwise. The cache is transitional
/// either way, so running without durable storage is a supported mode.
fn identity_slot() -> Arc<dyn StorageSlot> {
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => {
            let dir = PathBuf::from(dir);
            if let Err(e) = std::fs::create_dir_all(&dir) {
                warn!(error = %e, dir = %dir.display(), "data dir unusable, falling back to in-memory cache");
                return Arc::new(MemorySlot::new());
            }
            info!(dir = %dir.display(), "identity cache persisting to data dir");
            Arc::new(FileSlot::new(dir.join(IDENTITY_SLOT_FILE)))
        }
        _ => {
            info!("no data dir configured, identity cache is in-memory");
            Arc::new(MemorySlot::new())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cache = Arc::new(IdentityCache::new(identity_slot()));

    let provisioner = if ProvisioningClient::is_configured() {
        match ProvisioningClient::from_env() {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "TOTP provisioning misconfigured, endpoint disabled");
                None
            }
        }
    } else {
        info!("TOTP provisioning not configured, endpoint disabled");
        None
    };

    let state = AppState::new(cache, provisioner);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    info!("Persona Identity server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .expect("HTTP server failed");
}
