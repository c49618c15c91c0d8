mod common;

use axum_test::TestServer;
use http::StatusCode;
use serde_json::json;
use serial_test::serial;

use common::{
    create_test_app, create_test_state, fund_user, grant_admin, register_user,
    user_id_by_username, TEST_APP_ID, TEST_PASSWORD,
};

#[tokio::test]
#[serial]
async fn balance_converts_to_presentation_units() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "bal_user", "bal@example.com").await;
    let user_id = user_id_by_username(&state, "bal_user");
    fund_user(&state, user_id, 12_345);

    let response = server
        .get("/api/wallet/balance")
        .add_header("Authorization", format!("Bearer {}", access))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 123.45);
    assert_eq!(body["reserved_balance"], 0.0);
    assert_eq!(body["available_balance"], 123.45);
}

#[tokio::test]
#[serial]
async fn profile_updates_round_trip() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "prof_user", "prof@example.com").await;

    let response = server
        .put("/api/user/username")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "username": "prof_user_renamed" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<serde_json::Value>()["username"],
        "prof_user_renamed"
    );

    let response = server
        .put("/api/user/email")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "email": "prof2@example.com" }))
        .await;
    response.assert_status_ok();

    let response = server
        .put("/api/user/avatar")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "photo_url": "https://cdn.example.com/p.png" }))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/api/user/validate")
        .add_header("Authorization", format!("Bearer {}", access))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], "prof_user_renamed");
    assert_eq!(body["email"], "prof2@example.com");
    assert_eq!(body["photo_url"], "https://cdn.example.com/p.png");
}

#[tokio::test]
#[serial]
async fn username_collisions_conflict() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    register_user(&server, "taken_name", "taken@example.com").await;
    let (access, _) = register_user(&server, "other_name", "other@example.com").await;

    let response = server
        .put("/api/user/username")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "username": "taken_name" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn change_password_requires_the_current_one() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "pw_user", "pw@example.com").await;

    let response = server
        .put("/api/user/password")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "current_password": "NotThePassword1!",
            "new_password": "FreshPass456!",
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .put("/api/user/password")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "current_password": TEST_PASSWORD,
            "new_password": "FreshPass456!",
        }))
        .await;
    response.assert_status_ok();

    // old password no longer logs in, the new one does
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "pw_user",
            "password": TEST_PASSWORD,
            "app_id": TEST_APP_ID,
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "pw_user",
            "password": "FreshPass456!",
            "app_id": TEST_APP_ID,
        }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
#[serial]
async fn role_assignment_is_admin_gated_and_unique() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (user_access, _) = register_user(&server, "plain_user", "plain@example.com").await;
    let target_id = user_id_by_username(&state, "plain_user");

    let payload = json!({
        "user_id": target_id,
        "app_id": TEST_APP_ID,
        "role": 1,
    });

    let response = server
        .post("/api/user/role")
        .add_header("Authorization", format!("Bearer {}", user_access))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let (_, _) = register_user(&server, "root_user", "root@example.com").await;
    let admin_id = user_id_by_username(&state, "root_user");
    grant_admin(&state, admin_id);
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": "root_user",
            "password": TEST_PASSWORD,
            "app_id": TEST_APP_ID,
        }))
        .await;
    response.assert_status_ok();
    let admin_access = response.json::<serde_json::Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .post("/api/user/role")
        .add_header("Authorization", format!("Bearer {}", admin_access))
        .json(&payload)
        .await;
    response.assert_status_ok();

    // one row per (user, app)
    let response = server
        .post("/api/user/role")
        .add_header("Authorization", format!("Bearer {}", admin_access))
        .json(&payload)
        .await;
    response.assert_status(StatusCode::CONFLICT);
}
