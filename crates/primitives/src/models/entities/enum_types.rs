use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, EnumString, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::AuthType"]
#[strum(serialize_all = "snake_case")]
pub enum AuthType {
    Email,
    Telegram,
}

/// Per-(user, app) role. Wire representation is the numeric discriminant;
/// internal code only ever sees the enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, EnumString, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::UserRole"]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    User,
    Moderator,
    Admin,
    Service,
}

impl Role {
    pub fn from_wire(value: i32) -> Result<Self, ApiError> {
        match value {
            0 => Ok(Role::User),
            1 => Ok(Role::Moderator),
            2 => Ok(Role::Admin),
            3 => Ok(Role::Service),
            other => Err(ApiError::InvalidInput(format!("unknown role: {}", other))),
        }
    }

    pub fn as_wire(self) -> i32 {
        match self {
            Role::User => 0,
            Role::Moderator => 1,
            Role::Admin => 2,
            Role::Service => 3,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, EnumString, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::TransactionKind"]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Reserve,
    Commit,
    Cancel,
    Refund,
    Withdrawal,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, EnumString, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::TransactionStatus"]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Committed,
    Cancelled,
    Expired,
    Failed,
    Success,
}

impl TransactionStatus {
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        TransactionStatus::from_str(input)
            .map_err(|_| ApiError::Cache(format!("unknown transaction status: {}", input)))
    }
}

impl TransactionKind {
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        TransactionKind::from_str(input)
            .map_err(|_| ApiError::Cache(format!("unknown transaction kind: {}", input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_mapping_round_trips() {
        for role in [Role::User, Role::Moderator, Role::Admin, Role::Service] {
            assert_eq!(Role::from_wire(role.as_wire()).unwrap(), role);
        }
        assert!(Role::from_wire(42).is_err());
    }

    #[test]
    fn status_string_round_trips() {
        let status = TransactionStatus::Committed;
        assert_eq!(TransactionStatus::parse(&status.to_string()).unwrap(), status);
        assert_eq!(TransactionKind::Reserve.to_string(), "reserve");
    }
}
