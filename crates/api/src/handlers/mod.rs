pub mod assign_role;
pub mod cancel_reserve;
pub mod change_avatar;
pub mod change_email;
pub mod change_password;
pub mod change_username;
pub mod commit_reserve;
pub mod devices;
pub mod get_balance;
pub mod health;
pub mod list_transactions;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod reserve;
pub mod telegram_login;
pub mod validate_token;
