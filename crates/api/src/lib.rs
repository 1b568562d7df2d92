//! # ParkSlot API
//!
//! The API crate provides the web server for the ParkSlot reservation service.
//! It exposes the slot registry, the slot-request ledger and the admin overview
//! as JSON endpoints under `/api/v1`.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into core operations
//! - **Middleware**: Bearer-token identity and error mapping
//! - **Config**: Handle environment and application configuration
//!
//! Handlers never touch SQL. They reach storage through the
//! [`ParkingStore`] held in [`ApiState`], so the same router runs against
//! Postgres in production and the in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, HeaderValue, Method, StatusCode},
    BoxError, Router,
};
use eyre::{Result, WrapErr};
use parkslot_core::{
    billing::SessionBilling,
    receipt::{PlainTextTicket, TicketRenderer},
    store::ParkingStore,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::JwtVerifier;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Persistence for slots, requests and users
    pub store: Arc<dyn ParkingStore>,
    /// Rate used to bill ended sessions
    pub billing: SessionBilling,
    /// Renders the printable part of a receipt
    pub ticket: Arc<dyn TicketRenderer>,
    /// Verifies bearer tokens
    pub jwt: JwtVerifier,
}

impl ApiState {
    /// State with the plain-text ticket renderer.
    pub fn new(store: Arc<dyn ParkingStore>, billing: SessionBilling, jwt_secret: &str) -> Self {
        Self {
            store,
            billing,
            ticket: Arc::new(PlainTextTicket),
            jwt: JwtVerifier::new(jwt_secret),
        }
    }
}

/// Builds the application router with every route and request tracing.
///
/// CORS and the request timeout are deployment concerns and are added by
/// [`start_server`].
pub fn app(state: Arc<ApiState>) -> Router {
    let api = Router::new()
        .merge(routes::slots::routes())
        .merge(routes::slot_requests::routes())
        .merge(routes::admin::routes());

    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and store
///
/// Initializes logging, builds the router and serves until the listener
/// fails.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use parkslot_api::{config::ApiConfig, start_server};
/// use parkslot_db::{create_pool, PgStore};
///
/// let config = ApiConfig::from_env()?;
/// let pool = create_pool(&config.database_url).await?;
/// start_server(config, Arc::new(PgStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn ParkingStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let billing = SessionBilling::new(config.rate_per_minute)?;
    let state = Arc::new(ApiState::new(store, billing, &config.jwt_secret));

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        rate_per_minute = config.rate_per_minute,
        "Server listening on http://{}", addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
