pub mod account;
pub mod federate;
