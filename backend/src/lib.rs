//! Todo backend service

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Caller identity extraction
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Todo business logic
pub mod todos;

/// Configuration, errors and extractors
pub mod types;
