use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use signed_identity::{
    AppState, IdentityRecord, SigningKey, StaticKey,
    identity::{DEFAULT_EMAIL, DEFAULT_NAME, DEFAULT_PHONE},
    run,
    server::DEFAULT_MAX_BODY_BYTES,
    telemetry,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
struct Args {
    #[clap(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "PORT", default_value = "8181")]
    port: u16,
    #[clap(long, env = "SIGNING_KEY", hide_env_values = true, conflicts_with = "signing_key_file")]
    signing_key: Option<String>,
    #[clap(long, env = "SIGNING_KEY_FILE")]
    signing_key_file: Option<PathBuf>,

    #[clap(long, env = "IDENTITY_NAME", default_value = DEFAULT_NAME)]
    identity_name: String,
    #[clap(long, env = "IDENTITY_EMAIL", default_value = DEFAULT_EMAIL)]
    identity_email: String,
    #[clap(long, env = "IDENTITY_PHONE", default_value = DEFAULT_PHONE)]
    identity_phone: String,

    #[clap(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
    #[clap(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,
}

impl Args {
    fn signing_key(&self) -> Result<SigningKey> {
        match (&self.signing_key, &self.signing_key_file) {
            (Some(key), None) => SigningKey::new(key.as_bytes()).context("reading --signing-key"),
            (None, Some(path)) => SigningKey::from_file(path).context("reading --signing-key-file"),
            (Some(_), Some(_)) => bail!("--signing-key and --signing-key-file are mutually exclusive"),
            (None, None) => bail!("a signing key is required (--signing-key or --signing-key-file)"),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = telemetry::init_tracing(&args.log_filter) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    if let Err(err) = start(args).await {
        error!(error = %format!("{err:#}"), "hmac signature handler failed");
        std::process::exit(1);
    }
}

async fn start(args: Args) -> Result<()> {
    info!("hmac signature handler starting up");

    let key = args.signing_key()?;
    info!(key_len = key.as_bytes().len(), "signing key loaded");

    let identity = IdentityRecord::new(
        args.identity_name,
        args.identity_email,
        args.identity_phone,
    );
    let state = AppState::new(Arc::new(StaticKey::new(key)), &identity)
        .context("building application state")?
        .with_max_body_bytes(args.max_body_bytes);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    run(args.host, args.port, state, shutdown).await
}

/// Cancels `shutdown` on Ctrl-C or SIGTERM.
async fn shutdown_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutting down");
    shutdown.cancel();
}
