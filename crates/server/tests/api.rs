use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (username, role) in [("carla", "staff"), ("alice", "tutor"), ("dana", "admin")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, role) VALUES (?, ?, ?)",
            vec![username.into(), "password".into(), role.into()],
        ))
        .await
        .unwrap();
    }
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

fn basic_auth(username: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:password"));
    format!("Basic {encoded}")
}

fn post_json(uri: &str, username: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(username))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_authed(uri: &str, username: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth(username))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_check_in_and_eligibility_flow() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/pets",
            "carla",
            json!({"name": "Fido", "starting_credits": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pet = json_body(response).await;
    assert_eq!(pet["credits"], 5);
    assert_eq!(pet["status"], "active");
    let pet_id = pet["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json("/checkIn", "carla", json!({"pet_id": pet_id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["pet"]["credits"], 4);
    assert_eq!(result["pet"]["status"], "checked_in");
    assert!(result["ledger_entry_id"].is_string());

    // Double submit fails loudly.
    let response = app
        .clone()
        .oneshot(post_json("/checkIn", "carla", json!({"pet_id": pet_id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(get_authed(&format!("/pets/{pet_id}/eligibility"), "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let eligibility = json_body(response).await;
    assert_eq!(eligibility["can_check_in"], false);
    assert_eq!(eligibility["alerts"][0]["kind"], "already_checked_in");

    let response = app
        .clone()
        .oneshot(post_json("/checkOut", "carla", json!({"pet_id": pet_id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["pet"]["status"], "active");

    let response = app
        .clone()
        .oneshot(get_authed(&format!("/pets/{pet_id}/ledger"), "carla"))
        .await
        .unwrap();
    let ledger = json_body(response).await;
    let kinds: Vec<_> = ledger["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["kind"].as_str().unwrap().to_string())
        .collect();
    assert!(kinds.contains(&"checkin".to_string()));
    assert!(kinds.contains(&"bonus".to_string()));
}

#[tokio::test]
async fn depletion_reaches_the_tutor_inbox() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/pets",
            "carla",
            json!({"name": "Fido", "starting_credits": 1}),
        ))
        .await
        .unwrap();
    let pet = json_body(response).await;
    let pet_id = pet["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/pets/{pet_id}/tutors"),
            "carla",
            json!({"username": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json("/checkIn", "carla", json!({"pet_id": pet_id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_authed("/notifications?unread_only=true", "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let inbox = json_body(response).await;
    let notifications = inbox["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["severity"], "error");
    assert_eq!(notifications[0]["action_hint"], "buy_credits");
    assert_eq!(notifications[0]["read"], false);
}

#[tokio::test]
async fn requests_without_credentials_are_unauthorized() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tutors_cannot_mutate_credits_or_bypass() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/pets",
            "carla",
            json!({"name": "Fido", "starting_credits": 0}),
        ))
        .await
        .unwrap();
    let pet = json_body(response).await;
    let pet_id = pet["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/credits/purchase",
            "alice",
            json!({"pet_id": pet_id, "credits": 10}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff can run credit operations but not grant a bypass.
    let response = app
        .clone()
        .oneshot(post_json(
            "/checkIn",
            "carla",
            json!({"pet_id": pet_id, "bypass_reason": "manager override"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json(
            "/checkIn",
            "dana",
            json!({"pet_id": pet_id, "bypass_reason": "manager override"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["pet"]["credits"], 0);
    assert_eq!(result["ledger_entry_id"], Value::Null);
}

#[tokio::test]
async fn adjustment_is_admin_only() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/pets",
            "carla",
            json!({"name": "Fido", "starting_credits": 1}),
        ))
        .await
        .unwrap();
    let pet = json_body(response).await;
    let pet_id = pet["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/credits/adjustment",
            "carla",
            json!({"pet_id": pet_id, "delta": -3, "allow_negative": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(post_json(
            "/credits/adjustment",
            "dana",
            json!({"pet_id": pet_id, "delta": -3, "allow_negative": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["new_balance"], -2);
}

#[tokio::test]
async fn missing_pet_is_not_found() {
    let app = test_app().await;

    let response = app
        .oneshot(get_authed(
            "/pets/00000000-0000-0000-0000-000000000000",
            "carla",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn insufficient_credits_is_unprocessable() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/pets",
            "carla",
            json!({"name": "Fido", "starting_credits": 0}),
        ))
        .await
        .unwrap();
    let pet = json_body(response).await;
    let pet_id = pet["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json("/checkIn", "carla", json!({"pet_id": pet_id})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));
}
