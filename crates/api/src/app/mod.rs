//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services/`: repositories behind per-resource services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and their validation rules
//! - `extract.rs`: validated JSON body extractor
//! - `errors.rs`: consistent error responses
//! - `seed.rs`: default users, departments and norms

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderName, Method},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use verdicomply_auth::{Hs256JwtValidator, PasswordHasher};
use verdicomply_infra::{PostgresStore, Repositories};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod seed;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Connects to Postgres when `database_url` is set and falls back to the
/// in-memory store otherwise.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let repos = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.database_max_connections)
                .await
                .context("connecting to the database")?;
            tracing::info!("using postgres store");
            Repositories::from_store(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Repositories::in_memory()
        }
    };

    build_app_with(config, repos).await
}

/// Same as [`build_app`] over caller-supplied repositories.
pub async fn build_app_with(config: &AppConfig, repos: Repositories) -> anyhow::Result<Router> {
    let hasher = PasswordHasher::with_params(config.argon2_memory_kib, config.argon2_iterations, 1)?;
    let services = Arc::new(services::build_services(
        repos,
        &config.jwt_secret,
        config.jwt_expiration_seconds,
        hasher,
    ));

    if config.seed_defaults {
        seed::seed_defaults(&services).await?;
    }

    let auth_state = middleware::AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes())),
        header: HeaderName::from_bytes(config.jwt_header.as_bytes())
            .with_context(|| format!("invalid JWT_HEADER {:?}", config.jwt_header))?,
        prefix: config.jwt_prefix.clone(),
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(errors::stamp_error_path))
                .layer(cors_layer()),
        ))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers([header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}
