//! # notehub-api
//!
//! HTTP API for NoteHub, built on axum.
//!
//! The router is assembled by [`build_router`] from an [`AppState`]. All
//! routes live under `/api`; uploaded files are served from `/uploads`.
//! Errors render as `{"error": "<message>"}` with the status taken from the
//! domain error (see [`ApiError`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

pub use auth::AuthUser;
pub use config::ServerConfig;
pub use error::{set_expose_internal_errors, ApiError};
pub use routes::{build_router, parse_allowed_origins, ApiDoc};
pub use state::AppState;
