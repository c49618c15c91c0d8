mod common;

use axum_test::TestServer;
use serde_json::json;
use serial_test::serial;

use common::{balances, create_test_app, create_test_state, fund_user, register_user, user_id_by_username, TEST_APP_ID};

#[tokio::test]
#[serial]
async fn reserve_replay_returns_the_original_hold() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "idem_res", "ir@example.com").await;
    let user_id = user_id_by_username(&state, "idem_res");
    fund_user(&state, user_id, 1000);

    let first = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": 300,
            "idempotency_key": "replay-key",
        }))
        .await;
    first.assert_status_ok();
    let first: serde_json::Value = first.json();

    // the replay carries different arguments and still gets the first answer
    let second = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": 500,
            "idempotency_key": "replay-key",
        }))
        .await;
    second.assert_status_ok();
    let second: serde_json::Value = second.json();

    assert_eq!(first["reservation_id"], second["reservation_id"]);
    assert_eq!(second["reserved_amount"], 300);

    // held once, not twice
    assert_eq!(balances(&state, user_id), (1000, 300));
}

#[tokio::test]
#[serial]
async fn commit_and_cancel_replays_return_the_same_rows() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "idem_commit", "ic@example.com").await;
    let user_id = user_id_by_username(&state, "idem_commit");
    fund_user(&state, user_id, 1000);

    for (key, amount) in [("c-hold", 300i64), ("x-hold", 200i64)] {
        let response = server
            .post("/api/wallet/reserve")
            .add_header("Authorization", format!("Bearer {}", access))
            .json(&json!({
                "app_id": TEST_APP_ID,
                "amount": amount,
                "idempotency_key": key,
            }))
            .await;
        response.assert_status_ok();
    }

    let mut conn = state.db.get().unwrap();
    let committed = payvault_core::repositories::transaction_repository::TransactionRepository::find_by_idempotency_key(&mut conn, "c-hold").unwrap().unwrap();
    let cancelled = payvault_core::repositories::transaction_repository::TransactionRepository::find_by_idempotency_key(&mut conn, "x-hold").unwrap().unwrap();
    drop(conn);

    // commit twice: identical answers, debited once
    let mut commit_bodies = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/api/wallet/commit")
            .add_header("Authorization", format!("Bearer {}", access))
            .json(&json!({ "reservation_id": committed.id }))
            .await;
        response.assert_status_ok();
        commit_bodies.push(response.json::<serde_json::Value>());
    }
    assert_eq!(commit_bodies[0], commit_bodies[1]);
    assert_eq!(commit_bodies[0]["success"], true);

    // cancel twice: identical answers, released once
    let mut cancel_bodies = Vec::new();
    for _ in 0..2 {
        let response = server
            .post("/api/wallet/cancel")
            .add_header("Authorization", format!("Bearer {}", access))
            .json(&json!({ "reservation_id": cancelled.id }))
            .await;
        response.assert_status_ok();
        cancel_bodies.push(response.json::<serde_json::Value>());
    }
    assert_eq!(cancel_bodies[0], cancel_bodies[1]);
    assert_eq!(cancel_bodies[0]["success"], true);

    // 1000 - 300 committed; the 200 hold fully released
    assert_eq!(balances(&state, user_id), (700, 0));

    // exactly one COMMIT and one CANCEL child exist
    let mut conn = state.db.get().unwrap();
    use diesel::prelude::*;
    use payvault_primitives::schema::transactions;
    let commits: i64 = transactions::table
        .filter(transactions::kind.eq(payvault_primitives::models::TransactionKind::Commit))
        .count()
        .get_result(&mut conn)
        .unwrap();
    let cancels: i64 = transactions::table
        .filter(transactions::kind.eq(payvault_primitives::models::TransactionKind::Cancel))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!((commits, cancels), (1, 1));
}

#[tokio::test]
#[serial]
async fn failed_attempt_frees_the_key_for_retry() {
    let state = create_test_state().await;
    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let (access, _) = register_user(&server, "idem_retry", "iq@example.com").await;
    let user_id = user_id_by_username(&state, "idem_retry");

    // broke: the attempt fails and the cache records it
    let response = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": 300,
            "idempotency_key": "retry-key",
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "FAILED");

    // funded: the same key may try again
    fund_user(&state, user_id, 1000);
    let response = server
        .post("/api/wallet/reserve")
        .add_header("Authorization", format!("Bearer {}", access))
        .json(&json!({
            "app_id": TEST_APP_ID,
            "amount": 300,
            "idempotency_key": "retry-key",
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(balances(&state, user_id), (1000, 300));
}
