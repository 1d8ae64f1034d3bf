use axum::{routing::post, Router};

pub mod audits;
pub mod auth;
pub mod compliance;
pub mod departments;
pub mod logs;
pub mod norms;
pub mod pending_items;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/departamentos", departments::router())
        .nest("/api/auditorias", audits::router())
        .nest("/api/conformidades", compliance::router())
        .nest("/api/pendencias", pending_items::router())
        .nest("/api/logs", logs::router())
        .nest("/api/normas", norms::router())
}

/// Login and registration; no token required.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/public/auth/login", post(auth::login))
        .route("/api/public/registro", post(auth::register))
}
