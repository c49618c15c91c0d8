use crate::handlers::{
    assign_role::__path_assign_role, cancel_reserve::__path_cancel_reserve,
    change_avatar::__path_change_avatar, change_email::__path_change_email,
    change_password::__path_change_password, change_username::__path_change_username,
    commit_reserve::__path_commit_reserve, devices::__path_devices,
    get_balance::__path_get_balance, health::__path_health_check,
    list_transactions::__path_list_transactions, login::__path_login, logout::__path_logout,
    refresh_token::__path_refresh_token, register::__path_register, reserve::__path_reserve,
    telegram_login::__path_telegram_login, validate_token::__path_validate_token,
};
use payvault_primitives::models::dtos::auth_dto::{
    DeviceDto, DevicesResponse, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    SuccessResponse, TelegramLoginRequest, TokenPairResponse,
};
use payvault_primitives::models::dtos::user_dto::{
    AssignRoleRequest, ChangeAvatarRequest, ChangeEmailRequest, ChangeEmailResponse,
    ChangePasswordRequest, ChangeUsernameRequest, ChangeUsernameResponse, ValidateTokenResponse,
};
use payvault_primitives::models::dtos::wallet_dto::{
    BalanceResponse, CancelRequest, CancelResponse, CommitRequest, CommitResponse,
    ReserveRequest, ReserveResponse, TransactionDto, TransactionsResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        register, login, refresh_token, logout, telegram_login, devices,
        validate_token, assign_role, change_avatar, change_username,
        change_email, change_password,
        get_balance, reserve, commit_reserve, cancel_reserve,
        list_transactions, health_check
    ),
    components(schemas(
        RegisterRequest, LoginRequest, RefreshRequest, LogoutRequest,
        TelegramLoginRequest, TokenPairResponse, DeviceDto, DevicesResponse,
        SuccessResponse, ValidateTokenResponse, AssignRoleRequest,
        ChangeAvatarRequest, ChangeUsernameRequest, ChangeUsernameResponse,
        ChangeEmailRequest, ChangeEmailResponse, ChangePasswordRequest,
        BalanceResponse, ReserveRequest, ReserveResponse, CommitRequest,
        CommitResponse, CancelRequest, CancelResponse, TransactionDto,
        TransactionsResponse
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and session lifecycle"),
        (name = "User", description = "Profile and role management"),
        (name = "Wallet", description = "Balance and two-phase reservations")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("PASETO")
                        .build(),
                ),
            );
        }
    }
}
