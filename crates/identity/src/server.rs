pub mod handler;
pub mod signature_header;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    routing::{MethodRouter, get},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::identity::IdentityRecord;
use crate::signing::KeyProvider;

pub use signature_header::{SIGNATURE_HEADER, SignatureHeader};

/// Largest POST body read before it is treated as unreadable.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<dyn KeyProvider>,
    /// Canonical encoding of the served record; these are the signed bytes.
    pub identity: Bytes,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Encodes the record once up front. A record that cannot be encoded is
    /// a configuration error and never reaches a request.
    pub fn new(keys: Arc<dyn KeyProvider>, identity: &IdentityRecord) -> Result<Self> {
        let identity = identity.encode().context("encoding identity record")?;

        Ok(Self {
            keys,
            identity: Bytes::from(identity),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/healthcheck",
            get(handler::healthcheck).fallback(handler::healthcheck_method_not_allowed),
        )
        .route("/", identity_routes())
        .route("/{*path}", identity_routes())
        .with_state(state)
}

fn identity_routes() -> MethodRouter<AppState> {
    get(handler::sign_identity)
        .post(handler::verify_message)
        .fallback(handler::method_not_allowed)
}

pub async fn run(host: String, port: u16, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;

    serve(listener, state, shutdown).await
}

/// Serves on an already bound listener until `shutdown` is cancelled.
/// In-flight requests are allowed to finish.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let addr = listener.local_addr().context("reading listener address")?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("serving http")?;

    info!("server stopped");
    Ok(())
}
