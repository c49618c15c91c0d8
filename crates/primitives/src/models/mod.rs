pub mod app_state;
pub mod context;
pub mod dtos;
pub mod entities;

pub use app_state::app_config::AppConfig;
pub use context::{AccessTokenData, RefreshTokenData, RequestMeta};
pub use entities::enum_types::{AuthType, Role, TransactionKind, TransactionStatus};
pub use entities::idempotency::IdempotencyRecord;
pub use entities::session::RefreshSession;
pub use entities::transaction::{minor_to_major, NewTransaction, Transaction};
pub use entities::user::{Credentials, NewUser, User, UserRow};
