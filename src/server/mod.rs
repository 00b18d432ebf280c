//! HTTP service.
//!
//! This module provides:
//! - The axum router and handlers (`routes`)
//! - Response bodies and error mapping (`response`)
//! - Configuration loading for the `hausd` daemon (`config`)

pub mod config;
pub mod response;
pub mod routes;

pub use config::Config;
pub use routes::{AppState, router};
