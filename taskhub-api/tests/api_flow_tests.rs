/// End-to-end API tests against PostgreSQL
///
/// Skipped when DATABASE_URL is not set.

mod common;

use axum::http::{Method, StatusCode};
use common::{unique, TestContext, PASSWORD};
use serde_json::{json, Value};
use taskhub_shared::auth::jwt::validate_token;

fn ids(list: &Value) -> Vec<i64> {
    list["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|task| task["id"].as_i64().expect("task id"))
        .collect()
}

#[tokio::test]
async fn test_register_returns_token_for_new_user() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = ctx.register().await;
    assert!(user.get("password_hash").is_none());

    let claims = validate_token(&token, common::JWT_SECRET).unwrap();
    assert_eq!(claims.id, user["id"].as_i64().unwrap());
    assert_eq!(claims.username, user["username"].as_str().unwrap());
    assert_eq!(claims.email, user["email"].as_str().unwrap());

    ctx.delete_user(&user).await;
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = ctx.register().await;
    let username = user["username"].as_str().unwrap();
    let email = user["email"].as_str().unwrap();

    for body in [
        json!({ "username": username, "email": "fresh@example.com", "password": "pw" }),
        json!({ "username": unique("other"), "email": email, "password": "pw" }),
    ] {
        let (status, json) = ctx.send(Method::POST, "/api/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "success": false, "message": "User already exists" }));
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2")
        .bind(username)
        .bind(email)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    ctx.delete_user(&user).await;
}

#[tokio::test]
async fn test_login_and_me() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = ctx.register().await;

    let (status, json) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": user["email"], "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let token = json["token"].as_str().unwrap();
    let claims = validate_token(token, common::JWT_SECRET).unwrap();
    assert_eq!(claims.id, user["id"].as_i64().unwrap());

    let (status, me) = ctx.send(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["id"], user["id"]);
    assert_eq!(me["data"]["username"], user["username"]);
    assert!(me["data"].get("password_hash").is_none());

    // A valid token for a deleted account
    ctx.delete_user(&user).await;
    let (status, json) = ctx.send(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, user) = ctx.register().await;

    let (wrong_password_status, wrong_password) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": user["email"], "password": "wrong" })),
        )
        .await;

    let (unknown_email_status, unknown_email) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": format!("{}@example.com", unique("nobody")), "password": "wrong" })),
        )
        .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["message"], "Invalid credentials");

    ctx.delete_user(&user).await;
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, created) = ctx
        .send(
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({ "title": "Buy milk", "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let task = &created["data"];
    let id = task["id"].as_i64().unwrap();
    assert_eq!(task["user_id"], Value::Null);

    let (status, fetched) = ctx.send(Method::GET, &format!("/api/tasks/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["title"], "Buy milk");
    assert_eq!(fetched["data"]["description"], "");
    assert_eq!(fetched["data"]["status"], "pending");
    assert!(fetched["data"]["created_at"].is_string());
    assert!(fetched["data"]["updated_at"].is_string());

    ctx.send(Method::DELETE, &format!("/api/tasks/{}", id), None, None).await;
}

#[tokio::test]
async fn test_update_task() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, created) = ctx
        .send(
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({ "title": "Draft", "description": "first", "status": "in-progress" })),
        )
        .await;
    let uri = format!("/api/tasks/{}", created["data"]["id"]);

    let (status, updated) = ctx
        .send(Method::PUT, &uri, None, Some(json!({ "title": "Final", "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Final");
    assert_eq!(updated["data"]["description"], "");
    assert_eq!(updated["data"]["status"], "completed");

    let (_, kept) = ctx.send(Method::PUT, &uri, None, Some(json!({ "title": "Final again" }))).await;
    assert_eq!(kept["data"]["status"], "completed");

    ctx.send(Method::DELETE, &uri, None, None).await;

    let (status, json) = ctx.send(Method::PUT, &uri, None, Some(json!({ "title": "Gone" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Task not found");
}

#[tokio::test]
async fn test_delete_is_not_repeatable() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, created) = ctx
        .send(Method::POST, "/api/tasks", None, Some(json!({ "title": "Ephemeral" })))
        .await;
    let uri = format!("/api/tasks/{}", created["data"]["id"]);

    let (status, json) = ctx.send(Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": true, "message": "Task deleted successfully" }));

    for _ in 0..2 {
        let (status, json) = ctx.send(Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Task not found");
    }

    let (status, _) = ctx.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_sorting_and_filters() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (token, user) = ctx.register().await;
    let marker = unique("sorting");

    for (title, status) in [("b", "pending"), ("c", "completed"), ("a", "completed")] {
        let (status_code, _) = ctx
            .send(
                Method::POST,
                "/api/tasks",
                Some(&token),
                Some(json!({ "title": format!("{} {}", marker, title), "status": status })),
            )
            .await;
        assert_eq!(status_code, StatusCode::CREATED);
    }

    let (status, list) = ctx
        .send(
            Method::GET,
            &format!("/api/tasks?search={}&sortBy=title&order=ASC", marker),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 3);
    let titles: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);

    let (status, completed) = ctx
        .send(
            Method::GET,
            &format!("/api/tasks?search={}&status=completed", marker),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["count"], 2);

    let (status, fallback) = ctx
        .send(
            Method::GET,
            &format!("/api/tasks?search={}&sortBy=password&order=ASC", marker),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, newest_first) = ctx
        .send(Method::GET, &format!("/api/tasks?search={}", marker), Some(&token), None)
        .await;
    assert_eq!(ids(&fallback), ids(&newest_first));

    let (_, all) = ctx
        .send(Method::GET, &format!("/api/tasks?search={}&status=all", marker), Some(&token), None)
        .await;
    assert_eq!(all["count"], 3);

    ctx.delete_user(&user).await;
}

#[tokio::test]
async fn test_visibility_end_to_end() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (_, alice) = ctx.register().await;
    let (_, bob) = ctx.register().await;
    let alice_token = ctx.login(&alice).await;
    let bob_token = ctx.login(&bob).await;
    let marker = unique("visibility");

    let (status, created) = ctx
        .send(
            Method::POST,
            "/api/tasks",
            Some(&alice_token),
            Some(json!({ "title": format!("{} private", marker) })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["user_id"], alice["id"]);
    let private_id = created["data"]["id"].as_i64().unwrap();

    let (_, anon_task) = ctx
        .send(
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({ "title": format!("{} shared", marker) })),
        )
        .await;
    let shared_id = anon_task["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/tasks?search={}", marker);

    let (_, anonymous) = ctx.send(Method::GET, &uri, None, None).await;
    assert_eq!(ids(&anonymous), vec![shared_id]);

    let (_, invalid_token) = ctx.send(Method::GET, &uri, Some("garbage"), None).await;
    assert_eq!(ids(&invalid_token), vec![shared_id]);

    let (_, as_alice) = ctx.send(Method::GET, &uri, Some(&alice_token), None).await;
    let alice_ids = ids(&as_alice);
    assert!(alice_ids.contains(&private_id));
    assert!(alice_ids.contains(&shared_id));

    let (_, as_bob) = ctx.send(Method::GET, &uri, Some(&bob_token), None).await;
    assert_eq!(ids(&as_bob), vec![shared_id]);

    // Unfiltered list for bob: everything is his or anonymous
    let (_, everything) = ctx.send(Method::GET, "/api/tasks", Some(&bob_token), None).await;
    let bob_id = bob["id"].as_i64().unwrap();
    assert!(everything["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|task| task["user_id"].is_null() || task["user_id"].as_i64() == Some(bob_id)));

    ctx.send(Method::DELETE, &format!("/api/tasks/{}", shared_id), None, None).await;
    ctx.delete_user(&alice).await;
    ctx.delete_user(&bob).await;
}

#[tokio::test]
async fn test_health_with_database() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, json) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
