use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::entities::enum_types::{AuthType, Role};

/// How the account authenticates. Exactly one arm is ever populated; the
/// conversion from the storage row fails on anything else, so the rest of the
/// code never re-checks the email/telegram combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Email { email: String, pass_hash: String },
    Telegram { telegram_id: i64 },
}

/// Domain user, scoped to the tenant that issued the request: `app_id` and
/// `role` come from the request context, not the users table alone.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
    pub balance: i64,
    pub reserved_balance: i64,
    pub app_id: i32,
    pub role: Role,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn available_balance(&self) -> i64 {
        self.balance - self.reserved_balance
    }

    pub fn email(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Email { email, .. } => Some(email),
            Credentials::Telegram { .. } => None,
        }
    }

    pub fn pass_hash(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Email { pass_hash, .. } => Some(pass_hash),
            Credentials::Telegram { .. } => None,
        }
    }
}

/// Raw storage row. Collapsed into [`User`] via [`UserRow::into_user`], which
/// is where the email-xor-telegram invariant is enforced.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::users)]
pub struct UserRow {
    pub id: i64,
    pub email: Option<String>,
    pub username: String,
    pub pass_hash: Option<String>,
    pub telegram_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
    pub balance: i64,
    pub reserved_balance: i64,
    pub auth_type: AuthType,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self, app_id: i32, role: Role) -> Result<User, ApiError> {
        let credentials = match (self.auth_type, self.email, self.pass_hash, self.telegram_id) {
            (AuthType::Email, Some(email), Some(pass_hash), None) => {
                Credentials::Email { email, pass_hash }
            }
            (AuthType::Telegram, None, None, Some(telegram_id)) => {
                Credentials::Telegram { telegram_id }
            }
            _ => {
                return Err(ApiError::Internal(format!(
                    "user {} has inconsistent credentials",
                    self.id
                )))
            }
        };

        Ok(User {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            photo_url: self.photo_url,
            balance: self.balance,
            reserved_balance: self.reserved_balance,
            app_id,
            role,
            credentials,
            created_at: self.created_at,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: Option<&'a str>,
    pub username: &'a str,
    pub pass_hash: Option<&'a str>,
    pub telegram_id: Option<i64>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub auth_type: AuthType,
}

impl<'a> NewUser<'a> {
    pub fn email(email: &'a str, username: &'a str, pass_hash: &'a str) -> Self {
        NewUser {
            email: Some(email),
            username,
            pass_hash: Some(pass_hash),
            telegram_id: None,
            first_name: None,
            last_name: None,
            photo_url: None,
            auth_type: AuthType::Email,
        }
    }

    pub fn telegram(
        telegram_id: i64,
        username: &'a str,
        first_name: Option<&'a str>,
        last_name: Option<&'a str>,
        photo_url: Option<&'a str>,
    ) -> Self {
        NewUser {
            email: None,
            username,
            pass_hash: None,
            telegram_id: Some(telegram_id),
            first_name,
            last_name,
            photo_url,
            auth_type: AuthType::Telegram,
        }
    }
}
