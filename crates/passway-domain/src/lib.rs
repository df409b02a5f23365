//! Domain vocabulary shared across Passway services.
//!
//! Pure types only, no framework dependencies. Import in `usecase/` and
//! `domain/` layers; never in `infra/` or `handlers/`.

pub mod provider;
pub mod user;
