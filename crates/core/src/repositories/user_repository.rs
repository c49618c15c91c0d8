use diesel::prelude::*;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::{NewUser, Role, User, UserRow};
use payvault_primitives::schema::{user_app_roles, users};

use crate::repositories::is_unique_violation;

pub struct UserRepository;

impl UserRepository {
    /// Inserts an email-credentialed user. Username/email collisions surface
    /// as `Conflict`; the unique indexes are the real gate.
    pub fn create_email_user(
        conn: &mut PgConnection,
        email: &str,
        username: &str,
        pass_hash: &str,
    ) -> Result<i64, ApiError> {
        diesel::insert_into(users::table)
            .values(NewUser::email(email, username, pass_hash))
            .returning(users::id)
            .get_result::<i64>(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("user already exists".into())
                } else {
                    ApiError::Database(e)
                }
            })
    }

    pub fn create_telegram_user(
        conn: &mut PgConnection,
        telegram_id: i64,
        username: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<i64, ApiError> {
        diesel::insert_into(users::table)
            .values(NewUser::telegram(
                telegram_id,
                username,
                first_name,
                last_name,
                photo_url,
            ))
            .returning(users::id)
            .get_result::<i64>(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("user already exists".into())
                } else {
                    ApiError::Database(e)
                }
            })
    }

    /// Refreshes the mutable profile fields of an externally-identified user.
    pub fn update_telegram_profile(
        conn: &mut PgConnection,
        telegram_id: i64,
        username: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), ApiError> {
        diesel::update(users::table.filter(users::telegram_id.eq(telegram_id)))
            .set((
                users::username.eq(username),
                users::first_name.eq(first_name),
                users::last_name.eq(last_name),
                users::photo_url.eq(photo_url),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("username already taken".into())
                } else {
                    ApiError::Database(e)
                }
            })?;
        Ok(())
    }

    pub fn find_by_username(
        conn: &mut PgConnection,
        username: &str,
        app_id: i32,
    ) -> Result<Option<User>, ApiError> {
        let row = users::table
            .filter(users::username.eq(username))
            .first::<UserRow>(conn)
            .optional()?;
        Self::scope_row(conn, row, app_id)
    }

    pub fn find_by_id(
        conn: &mut PgConnection,
        user_id: i64,
        app_id: i32,
    ) -> Result<Option<User>, ApiError> {
        let row = users::table.find(user_id).first::<UserRow>(conn).optional()?;
        Self::scope_row(conn, row, app_id)
    }

    pub fn find_by_telegram_id(
        conn: &mut PgConnection,
        telegram_id: i64,
        app_id: i32,
    ) -> Result<Option<User>, ApiError> {
        let row = users::table
            .filter(users::telegram_id.eq(telegram_id))
            .first::<UserRow>(conn)
            .optional()?;
        Self::scope_row(conn, row, app_id)
    }

    fn scope_row(
        conn: &mut PgConnection,
        row: Option<UserRow>,
        app_id: i32,
    ) -> Result<Option<User>, ApiError> {
        match row {
            Some(row) => {
                let role = Self::role_for(conn, row.id, app_id)?.unwrap_or(row.role);
                row.into_user(app_id, role).map(Some)
            }
            None => Ok(None),
        }
    }

    /// The per-(user, app) role assignment, if one exists. Callers fall back
    /// to the user's default role column.
    pub fn role_for(
        conn: &mut PgConnection,
        user_id: i64,
        app_id: i32,
    ) -> Result<Option<Role>, ApiError> {
        user_app_roles::table
            .filter(user_app_roles::user_id.eq(user_id))
            .filter(user_app_roles::app_id.eq(app_id))
            .select(user_app_roles::role)
            .first::<Role>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    /// At most one row per (user, app); a second assignment is a conflict.
    pub fn assign_role(
        conn: &mut PgConnection,
        user_id: i64,
        app_id: i32,
        role: Role,
    ) -> Result<(), ApiError> {
        diesel::insert_into(user_app_roles::table)
            .values((
                user_app_roles::user_id.eq(user_id),
                user_app_roles::app_id.eq(app_id),
                user_app_roles::role.eq(role),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return ApiError::Conflict("role already assigned for this app".into());
                }
                if matches!(
                    e,
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                        _,
                    )
                ) {
                    return ApiError::NotFound("user or app not found".into());
                }
                ApiError::Database(e)
            })?;
        Ok(())
    }

    pub fn change_photo(
        conn: &mut PgConnection,
        user_id: i64,
        photo_url: &str,
    ) -> Result<(), ApiError> {
        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::photo_url.eq(photo_url),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::NotFound("user not found".into()));
        }
        Ok(())
    }

    pub fn change_username(
        conn: &mut PgConnection,
        user_id: i64,
        username: &str,
    ) -> Result<(), ApiError> {
        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::username.eq(username),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("username already taken".into())
                } else {
                    ApiError::Database(e)
                }
            })?;
        if updated == 0 {
            return Err(ApiError::NotFound("user not found".into()));
        }
        Ok(())
    }

    pub fn change_email(
        conn: &mut PgConnection,
        user_id: i64,
        email: &str,
    ) -> Result<(), ApiError> {
        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::email.eq(email),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::Conflict("email already taken".into())
                } else {
                    ApiError::Database(e)
                }
            })?;
        if updated == 0 {
            return Err(ApiError::NotFound("user not found".into()));
        }
        Ok(())
    }

    pub fn change_password(
        conn: &mut PgConnection,
        user_id: i64,
        pass_hash: &str,
    ) -> Result<(), ApiError> {
        let updated = diesel::update(users::table.find(user_id))
            .set((
                users::pass_hash.eq(pass_hash),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::NotFound("user not found".into()));
        }
        Ok(())
    }
}
