pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod infra;
pub mod registry;
pub mod router;
pub mod signer;
pub mod state;
pub mod usecase;
