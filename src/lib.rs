//! # Boulevard: multi-tenant store management
//!
//! Boulevard is a backend for running shared storefronts: users register and
//! authenticate, create stores, and manage each store's worker roster under
//! a four-role hierarchy (Owner, Manager, Salesperson, Delivery).
//!
//! ## Overview
//!
//! The hard core of the system is membership and authorization. Every store
//! has a roster of (user, role) grants, with at most one grant per user per
//! store, and every mutating operation — updating or deleting a store,
//! adding or removing a worker — is decided by a single pure rule table over
//! the actor's role. Owners hold full control; Managers run day-to-day
//! operations and staff the operational tier; Salespersons and Delivery
//! workers hold no management rights at all. A non-Owner can never grant or
//! revoke Owner or Manager rights, so privilege cannot escalate through the
//! roster.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer with PostgreSQL for persistence (an in-memory backend
//! stands in for development and tests).
//!
//! ### Request Flow
//!
//! A request carrying a bearer token passes through the [`auth`] extractor,
//! which verifies the token's signature, issuer, audience, and expiry and
//! yields the acting user. The handler resolves the target store, resolves
//! the actor's membership role in it, and consults [`authz::decide`]; only
//! on Allow does it mutate through the [`db::Backend`]. Existence is always
//! resolved before authorization, so probing a missing store returns 404
//! regardless of the caller's role, and 403 always means "the store exists
//! and you lack the role".
//!
//! ### Core Components
//!
//! - The **API layer** ([`api`]) exposes registration/login, the store
//!   lifecycle, and roster management, all documented with OpenAPI
//!   annotations and served at `/docs`.
//! - The **authentication layer** ([`auth`]) covers Argon2 password hashing
//!   and JWT session tokens. Login failures are uniform, so accounts cannot
//!   be enumerated.
//! - The **authorization engine** ([`authz`]) is one pure function over
//!   (actor role, action); it never touches storage.
//! - The **database layer** ([`db`]) hides persistence behind an
//!   object-safe trait with PostgreSQL and in-memory implementations. The
//!   membership uniqueness invariant lives here, enforced atomically by the
//!   storage engine.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use boulevard::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = boulevard::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     boulevard::telemetry::init_telemetry();
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod uploads;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
};
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::openapi::ApiDoc;
pub use config::Config;
pub use types::{StoreId, UserId};

/// Application state shared across all request handlers.
///
/// Holds the storage backend and the configuration (signing key, token
/// parameters, upload settings), both constructed once at startup and
/// injected here — never read from ambient globals — so tests can swap in
/// the in-memory backend and their own config.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: Arc<dyn db::Backend>,
    pub config: Config,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors_allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    }

    let mut origins = Vec::new();
    for origin in &config.cors_allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any))
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Allow some slack over the logo limit for the other form fields; the
    // handler enforces the exact logo bound.
    let body_limit = (state.config.uploads.max_logo_size as usize).saturating_add(64 * 1024);

    let auth_routes = Router::new()
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login));

    let store_routes = Router::new()
        .route(
            "/stores",
            post(api::handlers::stores::create_store).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/stores/{id}",
            get(api::handlers::stores::get_store)
                .put(api::handlers::stores::update_store)
                .delete(api::handlers::stores::delete_store),
        )
        .route("/stores/{id}/workers", post(api::handlers::workers::add_worker))
        .route("/stores/{id}/workers/{user_id}", delete(api::handlers::workers::remove_worker));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(store_routes)
        .with_state(state.clone())
        // Stored logos are served as static assets
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.directory))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let router = router.layer(create_cors_layer(&state.config)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the configured backend and
///    builds the router (running migrations when the backend is PostgreSQL)
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn db::Backend> = match &config.database {
            config::DatabaseConfig::Memory => {
                info!("Using in-memory database backend; state will not survive restarts");
                Arc::new(db::MemoryBackend::new())
            }
            config::DatabaseConfig::External { url, pool } => {
                info!("Connecting to external PostgreSQL database");
                Arc::new(db::PostgresBackend::connect(url, pool).await?)
            }
        };

        let state = AppState::builder().db(backend).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Start serving the application until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Boulevard listening on http://{}", bind_addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
