#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use quiz_backend::{
    routes::build_router, services::session_service::SessionSettings, store::InMemoryQuizStore,
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub fn app_with(store: InMemoryQuizStore, public_rps: u32) -> Router {
    let state = AppState::new(Arc::new(store), SessionSettings::default());
    build_router(state, public_rps, None)
}

pub fn app() -> Router {
    app_with(InMemoryQuizStore::seeded(), 1_000)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

pub async fn quiz_id_by_title(app: &Router, title: &str) -> String {
    let (_, quizzes) = send(app, "GET", "/api/quizzes", None).await;
    quizzes
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["title"] == title)
        .map(|q| q["id"].as_str().unwrap().to_string())
        .unwrap()
}
