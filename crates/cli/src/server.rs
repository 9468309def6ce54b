//! # CLI Server
//!
//! Server startup for `crm serve`: database setup, application state, HTTP or
//! HTTPS listener and graceful shutdown.

use std::{net::SocketAddr, time::Duration};

use anyhow::anyhow;
use error::Result;
use sea_orm::DatabaseConnection;
use server::{create_app_router, refresh_tokens::cleanup_expired_tokens, AppState};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower_service::Service;
use tracing::{error, info, warn};

use crate::{
    commands::{migrate, seed, ServeArgs},
    config::{cors_origins_from_env, parse_socket_addr, DatabaseConfig, TokenConfig},
    tls::server_config,
};

/// How often expired refresh tokens are purged
const TOKEN_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Starts the API server with optional TLS support
///
/// # Arguments
///
/// * `config` - Database configuration
/// * `args` - Serve command arguments
pub async fn serve(config: &DatabaseConfig, args: &ServeArgs) -> Result<()> {
    info!(target: "serve", "Starting API server...");

    let tokens = TokenConfig::from_env().map_err(error::AppError::config)?;
    let db = migrate::connect(config).await?;

    if args.skip_migrations {
        warn!(target: "serve", "Skipping migrations and seeds");
    }
    else {
        info!(target: "serve", "Running database migrations...");
        migrate::apply(&db).await?;
        seed::seed(&db).await?;
    }

    spawn_token_cleanup(db.clone());

    let state = AppState::new(db, tokens.jwt)
        .with_refresh_token_days(tokens.refresh_token_days)
        .with_cors_origins(cors_origins_from_env());
    let app = create_app_router(state);

    let address = parse_socket_addr(&args.host, args.port)
        .map_err(|e| anyhow!("Invalid address {}:{}: {}", args.host, args.port, e))?;

    if args.tls {
        serve_https(&app, &address, args).await
    }
    else {
        serve_http(&app, &address).await
    }
}

/// Purges unusable refresh tokens now and then every hour.
fn spawn_token_cleanup(db: DatabaseConnection) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match cleanup_expired_tokens(&db).await {
                Ok(0) => {},
                Ok(removed) => info!(target: "serve", removed, "Purged expired refresh tokens"),
                Err(e) => warn!(target: "serve", error = %e, "Refresh token cleanup failed"),
            }
        }
    });
}

/// Serves the application over plain HTTP
async fn serve_http(app: &axum::Router, address: &SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {}: {}", address, e))?;

    info!(target: "serve", %address, "Listening for HTTP connections");

    Ok(axum::serve(
        listener,
        app.clone()
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow!("HTTP server error: {}", e))?)
}

/// Serves the application over HTTPS with rustls
async fn serve_https(app: &axum::Router, address: &SocketAddr, args: &ServeArgs) -> Result<()> {
    let tls_cert_path = args
        .tls_cert
        .as_ref()
        .ok_or_else(|| anyhow!("TLS certificate path is required when TLS is enabled"))?;
    let tls_key_path = args
        .tls_key
        .as_ref()
        .ok_or_else(|| anyhow!("TLS key path is required when TLS is enabled"))?;

    info!(target: "serve", cert = %tls_cert_path, key = %tls_key_path, "Loading TLS material");
    let tls_acceptor = TlsAcceptor::from(server_config(tls_cert_path, tls_key_path)?);

    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {}: {}", address, e))?;

    info!(target: "serve", %address, "Listening for HTTPS connections");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!(target: "serve", "Received shutdown signal, stopping HTTPS server");
                break;
            }
            result = listener.accept() => {
                let (tcp_stream, peer_addr) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(target: "serve", error = %e, "Failed to accept connection");
                        continue;
                    },
                };
                let tls_acceptor = tls_acceptor.clone();
                let app = app.clone();

                tokio::spawn(async move {
                    let tls_stream = match tls_acceptor.accept(tcp_stream).await {
                        Ok(stream) => stream,
                        Err(e) => {
                            warn!(target: "serve", %peer_addr, error = %e, "TLS handshake failed");
                            return;
                        },
                    };

                    let hyper_service =
                        hyper::service::service_fn(move |mut request: hyper::Request<hyper::body::Incoming>| {
                            request.extensions_mut().insert(axum::extract::ConnectInfo(peer_addr));
                            let mut app = app.clone();
                            async move { app.call(request).await }
                        });

                    if let Err(e) = hyper_util::server::conn::auto::Builder::new(
                        hyper_util::rt::TokioExecutor::new(),
                    )
                    .serve_connection(hyper_util::rt::TokioIo::new(tls_stream), hyper_service)
                    .await
                    {
                        warn!(target: "serve", %peer_addr, error = %e, "Error serving connection");
                    }
                });
            }
        }
    }

    Ok(())
}

/// Waits for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(target: "serve", error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!(target: "serve", error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
