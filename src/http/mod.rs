//! HTTP server module.
//!
//! This module provides the axum-based HTTP server that exposes the task
//! CRUD and list-query endpoints.

mod server;

pub use server::{AppState, build_router, start_server};
