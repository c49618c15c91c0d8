use axum::extract::{Extension, Json, Path, State};
use std::sync::Arc;

use payvault_core::services::auth_service::devices::DevicesService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::DevicesResponse;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    get,
    path = "/api/auth/devices/{user_id}",
    params(("user_id" = i64, Path, description = "User whose sessions to list")),
    responses(
        (status = 200, description = "Live sessions for the user", body = DevicesResponse),
        (status = 403, description = "Admin role required")
    ),
    tag = "Auth"
)]
pub async fn devices(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Path(user_id): Path<i64>,
) -> Result<Json<DevicesResponse>, ApiError> {
    DevicesService::list_devices(&state, &caller, user_id)
        .await
        .map(Json)
}
