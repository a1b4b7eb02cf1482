//! Filedrop server binary.
//!
//! This crate wires together HTTP routing, session-backed authentication,
//! upload storage, and embedded form pages. The main entry point builds the
//! Axum router and starts the HTTP listener.

mod atomic;
mod auth;
mod background;
mod config;
mod error;
mod files;
mod frontend;
mod http;
mod logging;
mod pages;
mod session;
mod storage;

use axum::extract::{DefaultBodyLimit, Extension, connect_info::ConnectInfo};
use axum::http::Request;
use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use axum_server::Handle;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, info_span};

use crate::auth::AuthConfig;
use crate::background::spawn_background_tasks;
use crate::config::Args;
use crate::session::SessionStore;
use crate::storage::UploadStore;

/// Starts the filedrop server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    logging::init_logging();

    let args = Args::parse();
    let store = Arc::new(UploadStore::new(
        PathBuf::from(&args.storage_dir),
        args.strict_unique_names,
    ));
    store.ensure_root().await?;
    let auth_config = Arc::new(AuthConfig {
        username: args.auth_user.clone(),
        password: args.auth_pass.clone(),
        protect_downloads: args.protect_downloads,
    });
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(args.session_ttl_secs)));

    let app = Router::new()
        .route("/login", get(frontend::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/upload",
            post(files::upload_file).layer(DefaultBodyLimit::max(args.upload_max_size as usize)),
        )
        .route("/uploads/{name}", get(files::download_upload))
        .route("/list", get(files::list_uploads))
        .route("/delete/{name}", delete(files::delete_upload))
        .fallback(frontend::serve_frontend)
        .layer(middleware::from_fn(auth::auth_gate))
        .layer(middleware::from_fn(http::add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let forwarded_ip = http::extract_forwarded_ip(request.headers());
                    let connect_ip = request
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ConnectInfo(addr)| addr.to_string());
                    let client_ip = forwarded_ip
                        .or(connect_ip)
                        .unwrap_or_else(|| "unknown".to_string());

                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        client_ip,
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(store))
        .layer(Extension(auth_config))
        .layer(Extension(sessions.clone()));

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let addr = SocketAddr::new(host, args.port);
    let handle = Handle::new();

    info!("starting HTTP server at {}", addr);

    spawn_background_tasks(sessions);
    let server = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal(handle) => {}
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("received termination signal, shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
