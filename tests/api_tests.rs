use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use booklog::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Bootstrap admin seeded by the initial migration
const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    // Keep password hashing cheap in tests
    config.auth.argon2_memory_cost_kib = 1024;
    config.auth.argon2_time_cost = 1;

    let state = booklog::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    booklog::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await
}

/// Log in expecting success; returns the bearer token.
async fn login_ok(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Create a regular user through the admin API; returns nothing, caller
/// logs in as needed.
async fn create_user(app: &Router, admin_token: &str, username: &str, password: &str) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        Some(admin_token),
        Some(json!({
            "username": username,
            "password": password,
            "display_name": format!("{username} display"),
            "role": "regular",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create_user failed: {body}");
}

#[tokio::test]
async fn login_validation_and_uniform_errors() {
    let app = spawn_app().await;

    // Missing fields are rejected before any lookup.
    let (status, _) = login(&app, "", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = login(&app, "admin", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown user and wrong password share one message.
    let (status, unknown_body) = login(&app, "nobody", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, wrong_body) = login(&app, ADMIN_USER, "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body["error"], wrong_body["error"]);
}

#[tokio::test]
async fn login_returns_profile_and_counts_accesses() {
    let app = spawn_app().await;

    let (status, body) = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["user"]["access_count"], 1);
    assert!(body["data"]["token"].as_str().is_some());

    let (_, body) = login(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    assert_eq!(body["data"]["user"]["access_count"], 2);
}

#[tokio::test]
async fn username_is_trimmed_before_lookup() {
    let app = spawn_app().await;

    let (status, body) = login(&app, "  admin  ", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "admin");
}

#[tokio::test]
async fn three_failed_attempts_block_the_account() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "bob", "bob-password").await;

    // Two plain failures.
    for _ in 0..2 {
        let (status, _) = login(&app, "bob", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Third failure crosses the threshold: 403 with a distinct message.
    let (status, body) = login(&app, "bob", "wrong").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        body["error"].as_str().unwrap().contains("repeated"),
        "expected lockout message, got: {body}"
    );

    // Even the correct password now fails with the blocked message.
    let (status, body) = login(&app, "bob", "bob-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("blocked"));

    // Admin status change is the only unblock path.
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/bob/status",
        Some(&admin_token),
        Some(json!({"status": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "bob", "bob-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn successful_login_resets_failure_counter() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "carol", "carol-password").await;

    // Two failures, then a success, then two more failures: the account
    // must still be usable because the counter was reset in between.
    for _ in 0..2 {
        let (status, _) = login(&app, "carol", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    login_ok(&app, "carol", "carol-password").await;
    for _ in 0..2 {
        let (status, _) = login(&app, "carol", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    login_ok(&app, "carol", "carol-password").await;
}

#[tokio::test]
async fn inactive_account_cannot_login_regardless_of_password() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "dave", "dave-password").await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/dave/status",
        Some(&admin_token),
        Some(json!({"status": "I"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "dave", "dave-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("inactive"));

    let (status, _) = login(&app, "dave", "wrong").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Wrong passwords against an inactive account never accumulate:
    // reactivating restores login on the first try.
    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/dave/status",
        Some(&admin_token),
        Some(json!({"status": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    login_ok(&app, "dave", "dave-password").await;
}

#[tokio::test]
async fn token_is_revoked_when_account_is_blocked() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "erin", "erin-password").await;
    let erin_token = login_ok(&app, "erin", "erin-password").await;

    let (status, body) = send(&app, "GET", "/api/users/me", Some(&erin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "erin");

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/erin/status",
        Some(&admin_token),
        Some(json!({"status": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same token, unexpired signature, rejected anyway.
    let (status, _) = send(&app, "GET", "/api/users/me", Some(&erin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/books", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_are_gated_by_role() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "frank", "frank-password").await;
    create_user(&app, &admin_token, "grace", "grace-password").await;
    let frank_token = login_ok(&app, "frank", "frank-password").await;

    // Non-admin cannot create users, list users, or change a status.
    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&frank_token),
        Some(json!({
            "username": "sneaky",
            "password": "password123",
            "display_name": "Sneaky",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/users", Some(&frank_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/grace/status",
        Some(&frank_token),
        Some(json!({"status": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No state change happened: grace can still log in.
    login_ok(&app, "grace", "grace-password").await;

    // The admin sees all accounts.
    let (status, body) = send(&app, "GET", "/api/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let usernames: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(usernames.contains(&"admin"));
    assert!(usernames.contains(&"frank"));
    assert!(usernames.contains(&"grace"));
}

#[tokio::test]
async fn status_change_validates_code_and_target() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/admin/status",
        Some(&admin_token),
        Some(json!({"status": "Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/users/ghost/status",
        Some(&admin_token),
        Some(json!({"status": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn change_password_reauthenticates() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "heidi", "heidi-password").await;
    let token = login_ok(&app, "heidi", "heidi-password").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/change-password",
        Some(&token),
        Some(json!({"current_password": "wrong", "new_password": "brand-new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/change-password",
        Some(&token),
        Some(json!({"current_password": "heidi-password", "new_password": "brand-new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "heidi", "heidi-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login_ok(&app, "heidi", "brand-new-pw").await;
}

#[tokio::test]
async fn books_crud_is_owner_scoped() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;
    create_user(&app, &admin_token, "alice", "alice-password").await;
    create_user(&app, &admin_token, "bob", "bob-password").await;
    let alice_token = login_ok(&app, "alice", "alice-password").await;
    let bob_token = login_ok(&app, "bob", "bob-password").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&alice_token),
        Some(json!({
            "title": "The Dispossessed",
            "author": "Ursula K. Le Guin",
            "read_on": "2026-02-10",
            "rating": 5,
            "review": "Walls and doors.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let book_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["owner"], "alice");

    // Bob sees neither the book nor Alice's shelf.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/books/{book_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        "/api/books?user=alice",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/books", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    // The admin can read any shelf.
    let (status, body) = send(
        &app,
        "GET",
        "/api/books?user=alice",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["books"][0]["title"], "The Dispossessed");

    // Owner update and delete.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/books/{book_id}"),
        Some(&alice_token),
        Some(json!({
            "title": "The Dispossessed",
            "author": "Ursula K. Le Guin",
            "read_on": "2026-02-11",
            "rating": 4,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 4);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/books/{book_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/books/{book_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/books/{book_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_validation_rejects_bad_input() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/books",
        Some(&admin_token),
        Some(json!({"title": "", "author": "Someone", "read_on": "2026-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/books",
        Some(&admin_token),
        Some(json!({
            "title": "Rated Too High",
            "author": "Someone",
            "read_on": "2026-01-01",
            "rating": 6,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn books_paginate_with_default_limit() {
    let app = spawn_app().await;
    let admin_token = login_ok(&app, ADMIN_USER, ADMIN_PASSWORD).await;

    for day in 1..=9 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/books",
            Some(&admin_token),
            Some(json!({
                "title": format!("Book {day}"),
                "author": "Author",
                "read_on": format!("2026-03-{day:02}"),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/books", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 9);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["current_page"], 1);
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 7);
    // Most recently read first.
    assert_eq!(body["data"]["books"][0]["title"], "Book 9");

    let (_, body) = send(&app, "GET", "/api/books?page=2", Some(&admin_token), None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn logout_is_stateless() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/logout", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}
