pub mod app;
pub mod enum_types;
pub mod idempotency;
pub mod session;
pub mod transaction;
pub mod user;
