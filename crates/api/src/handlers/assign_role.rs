use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::auth_dto::SuccessResponse;
use payvault_primitives::models::dtos::user_dto::AssignRoleRequest;
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    post,
    path = "/api/user/role",
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = SuccessResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Role already assigned")
    ),
    tag = "User"
)]
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    UserService::assign_role(&state, &caller, payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}
