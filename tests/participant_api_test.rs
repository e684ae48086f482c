mod common;

use axum::http::StatusCode;
use common::{app, send};
use serde_json::json;

#[tokio::test]
async fn registration_is_idempotent_per_email() {
    let app = app();
    let (status, first) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "name": "Bo", "email": "bo@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["created"], true);

    let (status, second) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "name": "Bo Again", "email": "BO@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["name"], "Bo");
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "name": "", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn new_participant_starts_as_beginner() {
    let app = app();
    let (_, participant) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "name": "Cy", "email": "cy@example.com" })),
    )
    .await;

    let uri = format!(
        "/api/participants/{}/profile",
        participant["id"].as_str().unwrap()
    );
    let (status, profile) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["level"], "Beginner");
    assert_eq!(profile["total_points"], 0);
    assert_eq!(profile["xp_to_next_level"], 100);

    let unknown = format!("/api/participants/{}/profile", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "GET", &unknown, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Profile not found");
}
