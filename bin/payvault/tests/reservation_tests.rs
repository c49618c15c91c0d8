mod common;

use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use payvault_core::reaper::ExpiryReaper;
use payvault_core::repositories::transaction_repository::TransactionRepository;

use common::{balances, create_test_app, create_test_state, fund_user, register_user, user_id_by_username, TEST_APP_ID};

async fn setup_funded_user(
    server: &TestServer,
    state: &payvault_core::AppState,
    username: &str,
    email: &str,
    minor: i64,
) -> (String, i64) {
    let (access, _) = register_user(server, username, email).await;
    let user_id = user_id_by_username(state, username);
    fund_user(state, user_id, minor);
    (access, user_id)
}

async fn reserve(
    server: &TestServer,
    access: &str,
    amount: i64,
    key: &str,
) -> serde_json::Value {
    let response = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": amount,
            "idempotency_key": key,
            "description": "integration hold",
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
#[serial]
async fn reserve_then_commit_debits_once() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, user_id) =
        setup_funded_user(&server, &state, "res_commit", "rc@example.com", 1000).await;

    let body = reserve(&server, &access, 300, "commit-flow-a").await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["reserved_amount"], 300);
    assert_eq!(body["remaining_balance"], 700);
    let reservation_id = body["reservation_id"].as_str().unwrap().to_string();

    assert_eq!(balances(&state, user_id), (1000, 300));

    let response = server
        .post("/api/wallet/commit")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": reservation_id }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["committed_amount"], 300);
    assert_eq!(body["new_balance"], 700);

    assert_eq!(balances(&state, user_id), (700, 0));
}

#[tokio::test]
#[serial]
async fn reserve_then_cancel_releases_the_hold() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, user_id) =
        setup_funded_user(&server, &state, "res_cancel", "rx@example.com", 1000).await;

    let body = reserve(&server, &access, 300, "cancel-flow-a").await;
    let reservation_id = body["reservation_id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/wallet/cancel")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": reservation_id }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["released_amount"], 300);

    // balance untouched, hold released
    assert_eq!(balances(&state, user_id), (1000, 0));
}

#[tokio::test]
#[serial]
async fn cancel_after_commit_is_refused() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, user_id) =
        setup_funded_user(&server, &state, "res_double", "rd@example.com", 1000).await;

    let body = reserve(&server, &access, 300, "double-flow-a").await;
    let reservation_id = body["reservation_id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/wallet/commit")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": reservation_id }))
        .await;
    response.assert_status_ok();

    let response = server
        .post("/api/wallet/cancel")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": reservation_id }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error_message"], "reservation already committed");

    assert_eq!(balances(&state, user_id), (700, 0));
}

#[tokio::test]
#[serial]
async fn insufficient_funds_fail_inside_the_body() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, user_id) =
        setup_funded_user(&server, &state, "res_poor", "rp@example.com", 1000).await;

    // the exact boundary passes
    let body = reserve(&server, &access, 1000, "boundary-full").await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(balances(&state, user_id), (1000, 1000));

    // one unit beyond available fails
    let body = reserve(&server, &access, 1, "boundary-over").await;
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["error_message"], "insufficient funds");

    // non-positive amounts never reach the ledger
    let response = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": 0,
            "idempotency_key": "boundary-zero",
        }))
        .await;
    response.assert_status(http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn expired_reservation_cannot_commit_and_gets_reaped() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, user_id) =
        setup_funded_user(&server, &state, "res_exp", "re@example.com", 1000).await;

    // place the hold directly with a deadline already in the past
    let reservation = {
        let mut conn = state.db.get().unwrap();
        TransactionRepository::reserve(
            &mut conn,
            user_id,
            TEST_APP_ID,
            300,
            "expired-hold",
            "short-lived hold",
            Utc::now() - ChronoDuration::seconds(2),
        )
        .unwrap()
    };
    assert_eq!(balances(&state, user_id), (1000, 300));

    let response = server
        .post("/api/wallet/commit")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": reservation.id }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error_message"], "reservation expired or closed");

    {
        let mut conn = state.db.get().unwrap();
        let expired = TransactionRepository::list_expired(&mut conn, 10).unwrap();
        assert_eq!(expired, vec![reservation.id]);

        TransactionRepository::cancel_expired(&mut conn, reservation.id).unwrap();
    }

    // funds restored, nothing left to reap
    assert_eq!(balances(&state, user_id), (1000, 0));
    {
        let mut conn = state.db.get().unwrap();
        assert!(TransactionRepository::list_expired(&mut conn, 10).unwrap().is_empty());
    }
}

#[tokio::test]
#[serial]
async fn reaper_cancels_expired_holds_on_start() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (_access, user_id) =
        setup_funded_user(&server, &state, "res_reap", "rr@example.com", 1000).await;

    {
        let mut conn = state.db.get().unwrap();
        TransactionRepository::reserve(
            &mut conn,
            user_id,
            TEST_APP_ID,
            400,
            "reaped-hold",
            "",
            Utc::now() - ChronoDuration::seconds(2),
        )
        .unwrap();
    }
    assert_eq!(balances(&state, user_id), (1000, 400));

    let reaper = ExpiryReaper::new(state.db.clone(), std::time::Duration::from_secs(30), 100);
    reaper.start();
    reaper.start(); // double start is a no-op

    // the initial pass runs immediately; give it a moment
    for _ in 0..50 {
        if balances(&state, user_id).1 == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    reaper.stop().await;
    reaper.stop().await; // double stop is a no-op

    assert_eq!(balances(&state, user_id), (1000, 0));
}

#[tokio::test]
#[serial]
async fn transaction_listing_pages_the_ledger() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, _user_id) =
        setup_funded_user(&server, &state, "res_list", "rl@example.com", 10_000).await;

    for i in 0..3 {
        reserve(&server, &access, 100, &format!("list-hold-{}", i)).await;
    }

    let response = server
        .get("/api/wallet/transactions")
        .add_header("Authorization", format!("Bearer {}", access))
        .add_query_param("from", 0)
        .add_query_param("to", 10)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 3);

    // out-of-range window is empty, not an error
    let response = server
        .get("/api/wallet/transactions")
        .add_header("Authorization", format!("Bearer {}", access))
        .add_query_param("from", 9)
        .add_query_param("to", 12)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["transactions"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 3);

    // window wider than 10 or inverted is refused
    for (from, to) in [(0, 11), (5, 5), (7, 3)] {
        let response = server
            .get("/api/wallet/transactions")
            .add_header("Authorization", format!("Bearer {}", access))
            .add_query_param("from", from)
            .add_query_param("to", to)
            .await;
        response.assert_status(http::StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
#[serial]
async fn unknown_reservation_reports_not_found() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();
    let (access, _) =
        setup_funded_user(&server, &state, "res_ghost", "rg@example.com", 1000).await;

    let response = server
        .post("/api/wallet/commit")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({ "reservation_id": Uuid::new_v4() }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error_message"], "reservation not found");
}
