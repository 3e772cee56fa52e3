//! HTTP API for formula evaluation
//!
//! Run with `calc-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
