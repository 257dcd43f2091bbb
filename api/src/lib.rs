// api/src/lib.rs

//! HTTP surface of the planillas / tasas administration API (actix-web).

pub mod config;
pub mod errors;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
