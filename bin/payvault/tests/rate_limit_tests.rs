mod common;

use axum_test::TestServer;
use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use common::{create_test_app, create_test_state, register_user, TEST_APP_ID, TEST_PASSWORD};

async fn attempt_login(server: &TestServer, ip: &str, password: &str) -> StatusCode {
    server
        .post("/api/auth/login")
        .add_header("x-forwarded-for", ip)
        .json(&json!({
            "username": "limited_user",
            "password": password,
            "app_id": TEST_APP_ID,
        }))
        .await
        .status_code()
}

#[tokio::test]
#[serial]
async fn repeated_failures_block_the_ip() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    register_user(&server, "limited_user", "lim@example.com").await;

    // attempts 1..=9 fail on credentials, the 10th trips the block
    for _ in 0..9 {
        assert_eq!(
            attempt_login(&server, "1.2.3.4", "WrongPass123!").await,
            StatusCode::UNAUTHORIZED
        );
    }
    assert_eq!(
        attempt_login(&server, "1.2.3.4", "WrongPass123!").await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // blocked means blocked, correct credentials included
    assert_eq!(
        attempt_login(&server, "1.2.3.4", TEST_PASSWORD).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // an unrelated IP is unaffected
    assert_eq!(
        attempt_login(&server, "5.6.7.8", TEST_PASSWORD).await,
        StatusCode::OK
    );
}

#[tokio::test]
#[serial]
async fn successful_login_resets_the_attempt_counter() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    register_user(&server, "limited_user", "lim2@example.com").await;

    for _ in 0..5 {
        assert_eq!(
            attempt_login(&server, "9.9.9.9", "WrongPass123!").await,
            StatusCode::UNAUTHORIZED
        );
    }
    assert_eq!(
        attempt_login(&server, "9.9.9.9", TEST_PASSWORD).await,
        StatusCode::OK
    );

    // the slate is clean again: nine more failures before the block
    for _ in 0..9 {
        assert_eq!(
            attempt_login(&server, "9.9.9.9", "WrongPass123!").await,
            StatusCode::UNAUTHORIZED
        );
    }
    assert_eq!(
        attempt_login(&server, "9.9.9.9", "WrongPass123!").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}
