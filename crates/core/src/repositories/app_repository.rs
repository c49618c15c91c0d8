use diesel::prelude::*;

use payvault_primitives::error::ApiError;
use payvault_primitives::models::entities::app::App;
use payvault_primitives::schema::apps;

pub struct AppRepository;

impl AppRepository {
    pub fn find(conn: &mut PgConnection, app_id: i32) -> Result<Option<App>, ApiError> {
        apps::table
            .find(app_id)
            .first::<App>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    /// Lookups reject unknown tenants with `InvalidApp` semantics.
    pub fn require(conn: &mut PgConnection, app_id: i32) -> Result<App, ApiError> {
        Self::find(conn, app_id)?
            .ok_or_else(|| ApiError::InvalidInput(format!("invalid app id: {}", app_id)))
    }
}
