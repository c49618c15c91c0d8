use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateTokenResponse {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub role: i32,
    pub app_id: i32,
    pub balance: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignRoleRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(range(min = 1))]
    pub app_id: i32,
    pub role: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeAvatarRequest {
    #[validate(url)]
    pub photo_url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeUsernameRequest {
    #[validate(length(min = 4, max = 100))]
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeUsernameResponse {
    pub username: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeEmailRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeEmailResponse {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 100))]
    pub current_password: String,
    #[validate(length(min = 8, max = 100))]
    pub new_password: String,
}
