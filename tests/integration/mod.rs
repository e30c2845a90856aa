//! Integration tests for healthcheck_api
//!
//! Each test starts its own server in-process on an ephemeral port, backed
//! by a fixed process snapshot, and talks to it over HTTP.
//!
//! Run with: cargo test --test integration

mod helpers;

mod builtin_routes;
mod health_endpoint;
mod network_probes;
