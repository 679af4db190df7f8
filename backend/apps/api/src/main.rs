//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::crypto::{generate_signing_key, key_id, load_signing_key};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use ticketing::domain::validation::CardExpiryPolicy;
use ticketing::{
    InMemoryTicketingRepository, PgTicketingRepository, TicketIssuer, TicketingConfig,
    ticketing_router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,ticketing=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Ticketing configuration
    let config = load_config()?;
    let issuer = TicketIssuer::new(load_issuer_key()?, config.validity_window);
    tracing::info!(
        key_id = %issuer.key_id(),
        min_card_year = config.card_expiry.min_year(),
        max_card_year = config.card_expiry.max_year(),
        "Ticket issuer ready"
    );

    let api = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            ticketing_router(PgTicketingRepository::new(pool), issuer, config)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, serving the in-memory mock catalog");
            ticketing_router(InMemoryTicketingRepository::with_mock_gigs(), issuer, config)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    // Build router
    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_config() -> anyhow::Result<TicketingConfig> {
    let config = if cfg!(debug_assertions) {
        TicketingConfig::development()
    } else {
        TicketingConfig::default()
    };

    let min_year = env_year("CARD_EXPIRY_YEAR_MIN")?.unwrap_or(config.card_expiry.min_year());
    let max_year = env_year("CARD_EXPIRY_YEAR_MAX")?.unwrap_or(config.card_expiry.max_year());
    let card_expiry = CardExpiryPolicy::new(min_year, max_year).with_context(|| {
        format!("card expiry range [{min_year},{max_year}] is empty")
    })?;

    Ok(config.with_card_expiry(card_expiry))
}

fn env_year(name: &str) -> anyhow::Result<Option<i32>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a year")),
        Err(_) => Ok(None),
    }
}

/// In production the key must come from the environment
fn load_issuer_key() -> anyhow::Result<platform::crypto::SigningKey> {
    match env::var("TICKET_SIGNING_KEY") {
        Ok(material) => {
            load_signing_key(&material).context("TICKET_SIGNING_KEY could not be loaded")
        }
        Err(_) if cfg!(debug_assertions) => {
            let key = generate_signing_key();
            tracing::warn!(
                key_id = %key_id(&key.verifying_key()),
                "TICKET_SIGNING_KEY not set, using an ephemeral development key"
            );
            Ok(key)
        }
        Err(_) => anyhow::bail!("TICKET_SIGNING_KEY must be set in production"),
    }
}
