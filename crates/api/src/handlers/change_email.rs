use axum::extract::{Extension, Json, State};
use std::sync::Arc;

use payvault_core::services::user_service::UserService;
use payvault_core::AppState;
use payvault_primitives::error::ApiError;
use payvault_primitives::models::dtos::user_dto::{ChangeEmailRequest, ChangeEmailResponse};
use payvault_primitives::models::AccessTokenData;

#[utoipa::path(
    put,
    path = "/api/user/email",
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "Email updated", body = ChangeEmailResponse),
        (status = 409, description = "Email already taken")
    ),
    tag = "User"
)]
pub async fn change_email(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AccessTokenData>,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<Json<ChangeEmailResponse>, ApiError> {
    let email = UserService::change_email(&state, &caller, payload).await?;
    Ok(Json(ChangeEmailResponse { email }))
}
