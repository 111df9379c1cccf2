mod config;
mod email;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::MailerConfig;
use crate::email::Mailer;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aboard_mailer=debug,tower_http=debug".into()),
        )
        .init();

    let config = MailerConfig::from_env()?;

    // Missing relay credentials are logged but never block startup; the
    // server still listens and sends fail until configured.
    match &config.gmail_user {
        Some(user) => info!("Gmail user: {user}"),
        None => warn!("GMAIL_USER not configured"),
    }
    if config.gmail_app_password.is_some() {
        info!("Gmail app password: configured");
    } else {
        warn!("GMAIL_APP_PASSWORD not configured");
    }
    info!("Confirmation emails will be sent to {}", config.destination);

    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .map(|o| o.parse())
        .collect::<Result<_, _>>()?;
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let state = AppState {
        mailer: Arc::new(Mailer::new(&config)),
    };

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/send-confirmation", post(routes::send_confirmation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Wedding email server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
