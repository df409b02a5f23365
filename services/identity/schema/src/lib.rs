//! sea-orm entities for the identity service.

pub mod identity_relations;
pub mod users;
