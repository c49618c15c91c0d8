mod common;

use axum_test::TestServer;
use chrono::Utc;
use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use payvault_core::security::telegram_login_hash;
use payvault_primitives::models::dtos::auth_dto::TelegramLoginRequest;

use common::{create_test_app, create_test_state, TEST_APP_ID};

const BOT_TOKEN: &str = "123456:test-bot-token";

fn signed_payload(telegram_id: i64, username: &str, first_name: Option<&str>) -> serde_json::Value {
    let mut request = TelegramLoginRequest {
        telegram_id,
        username: username.to_string(),
        first_name: first_name.map(str::to_string),
        last_name: None,
        photo_url: None,
        auth_date: Utc::now().timestamp(),
        hash: String::new(),
        app_id: TEST_APP_ID,
    };
    request.hash = telegram_login_hash(&request, BOT_TOKEN);

    json!({
        "telegram_id": request.telegram_id,
        "username": request.username,
        "first_name": request.first_name,
        "last_name": request.last_name,
        "photo_url": request.photo_url,
        "auth_date": request.auth_date,
        "hash": request.hash,
        "app_id": request.app_id,
    })
}

#[tokio::test]
#[serial]
async fn telegram_login_registers_then_recognizes() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    // first contact registers
    let response = server
        .post("/api/auth/telegram")
        .json(&signed_payload(777, "tg_user", Some("Tele")))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let access = body["access_token"].as_str().unwrap().to_string();

    let response = server
        .get("/api/user/validate")
        .add_header("Authorization", format!("Bearer {}", access))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "tg_user");
    assert_eq!(body["email"], serde_json::Value::Null);

    // second contact refreshes the profile instead of duplicating the user
    let response = server
        .post("/api/auth/telegram")
        .json(&signed_payload(777, "tg_user_renamed", Some("Tele")))
        .await;
    response.assert_status_ok();

    use diesel::prelude::*;
    use payvault_primitives::schema::users;
    let mut conn = state.db.get().unwrap();
    let (count, username): (i64, String) = (
        users::table.count().get_result(&mut conn).unwrap(),
        users::table
            .filter(users::telegram_id.eq(777i64))
            .select(users::username)
            .first(&mut conn)
            .unwrap(),
    );
    assert_eq!(count, 1);
    assert_eq!(username, "tg_user_renamed");
}

#[tokio::test]
#[serial]
async fn telegram_login_rejects_bad_signatures() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let mut payload = signed_payload(888, "tg_forged", None);
    payload["username"] = json!("tg_other");

    let response = server.post("/api/auth/telegram").json(&payload).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
