//! Shared service plumbing: health endpoints, tracing setup, request-id
//! middleware. Domain types live in `passway-domain`.

pub mod health;
pub mod middleware;
pub mod tracing;
