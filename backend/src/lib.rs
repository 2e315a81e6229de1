pub mod auth;
pub mod axum_http;
pub mod config;
pub mod i18n;
pub mod wiring;
