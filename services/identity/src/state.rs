use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{DbRelationRepository, DbUserRepository};
use crate::registry::ProviderRegistry;
use crate::signer::TokenSigner;

/// Shared application state passed to every handler via axum `State`.
///
/// Registry and signer are built once in main and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub registry: Arc<ProviderRegistry>,
    pub signer: Arc<TokenSigner>,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn relation_repo(&self) -> DbRelationRepository {
        DbRelationRepository {
            db: self.db.clone(),
        }
    }
}
