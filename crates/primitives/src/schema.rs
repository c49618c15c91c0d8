pub mod sql_types {
    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "auth_type"))]
    pub struct AuthType;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "user_role"))]
    pub struct UserRole;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "transaction_kind"))]
    pub struct TransactionKind;

    #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
    #[diesel(postgres_type(name = "transaction_status"))]
    pub struct TransactionStatus;
}

diesel::table! {
    apps (id) {
        id -> Int4,
        name -> Text,
        secret -> Text,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::AuthType;
    use super::sql_types::UserRole;

    users (id) {
        id -> Int8,
        email -> Nullable<Text>,
        username -> Text,
        pass_hash -> Nullable<Text>,
        telegram_id -> Nullable<Int8>,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        balance -> Int8,
        reserved_balance -> Int8,
        auth_type -> AuthType,
        role -> UserRole,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::UserRole;

    user_app_roles (id) {
        id -> Int8,
        user_id -> Int8,
        app_id -> Int4,
        role -> UserRole,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use super::sql_types::TransactionKind;
    use super::sql_types::TransactionStatus;

    transactions (id) {
        id -> Uuid,
        user_id -> Int8,
        app_id -> Int4,
        reservation_id -> Nullable<Uuid>,
        kind -> TransactionKind,
        status -> TransactionStatus,
        amount -> Int8,
        balance_before -> Int8,
        balance_after -> Int8,
        reserved_before -> Int8,
        reserved_after -> Int8,
        description -> Text,
        idempotency_key -> Nullable<Text>,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_app_roles -> users (user_id));
diesel::joinable!(user_app_roles -> apps (app_id));
diesel::joinable!(transactions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(apps, users, user_app_roles, transactions);
