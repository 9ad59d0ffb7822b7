//! Hospital records core.
//!
//! Domain model and repository layer for patients (in/out variants),
//! doctors, departments, appointments and medical records over SQLite.
//! Frontends open a connection with [`db::open_database`] and call the
//! repository functions in [`db::repository`]. Every operation is atomic
//! and surfaces a typed [`db::DatabaseError`] for the frontend to render.

pub mod config;
pub mod db;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding frontend. Honors RUST_LOG, falling
/// back to the crate's default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
