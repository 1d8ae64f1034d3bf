//! HTTP API: configuration, routing, authentication and request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;

pub use app::{build_app, build_app_with};
pub use config::AppConfig;
