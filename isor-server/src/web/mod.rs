//! JSON API for the locomotive tracker.
//!
//! Exposes the rate-limited locomotive, train and fleet queries over HTTP.
//! Every route except `/health` requires HTTP basic authentication.

mod auth;
mod dto;
mod routes;
mod state;

pub use auth::BasicAuth;
pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
