//! Server startup and shutdown.

use core::net::{IpAddr, SocketAddr};
use std::path::Path;

use eyre::WrapErr as _;
use tokio::{net, signal};
use tracing::info;

use crate::{
    cli::ListenArgs,
    db,
    http::{AppState, create_app},
};

/// Creates a future that resolves when a shutdown signal is received.
pub(crate) async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler, only Ctrl-C will stop the server: {e}");
                drop(signal::ctrl_c().await);
            }
        }
    }
    #[cfg(not(unix))]
    {
        drop(signal::ctrl_c().await);
    }
}

/// Open the database and serve the waitlist API until a shutdown signal arrives.
///
/// The pool is closed before returning, on success and on server failure.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or initialized, the
/// bind address is invalid, or the listener cannot be bound.
pub async fn start(database: &Path, listen: &ListenArgs) -> eyre::Result<()> {
    let db_pool = db::init(database).await.wrap_err(format!(
        "database setup failed for: {}",
        database.display()
    ))?;

    let result = serve(db_pool.clone(), database, listen).await;
    db_pool.close().await;
    result
}

async fn serve(db_pool: db::Pool, database: &Path, listen: &ListenArgs) -> eyre::Result<()> {
    let listen_ip: IpAddr = listen
        .bind
        .parse()
        .wrap_err(format!("Invalid bind address: {}", listen.bind))?;
    let addr = SocketAddr::from((listen_ip, listen.port));

    let app = create_app(AppState { db_pool }, &listen.index);

    let listener = net::TcpListener::bind(addr)
        .await
        .wrap_err(format!("Failed to bind {addr}"))?;
    info!(database = %database.display(), "Waitlist API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Received shutdown, shutting down");
        })
        .await
        .wrap_err("listen and serve")
}
