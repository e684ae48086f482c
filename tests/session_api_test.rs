mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{app, app_with, quiz_id_by_title, send};
use futures::StreamExt;
use quiz_backend::store::InMemoryQuizStore;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn catalogue_lists_easiest_first() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/quizzes", None).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Addition Basics", "Times Tables", "Fractions"]);
    assert_eq!(body[0]["difficulty"], "easy");
}

#[tokio::test]
async fn unknown_quiz_cannot_be_started() {
    let app = app();
    let uri = format!("/api/quizzes/{}/sessions", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Quiz not found");

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["active_sessions"], 0);
}

#[tokio::test]
async fn full_session_scores_and_credits_the_profile() {
    let app = app();
    let (status, participant) = send(
        &app,
        "POST",
        "/api/participants",
        Some(json!({ "name": "Ana", "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let participant_id = participant["id"].as_str().unwrap().to_string();

    let quiz_id = quiz_id_by_title(&app, "Addition Basics").await;
    let (status, session) = send(
        &app,
        "POST",
        &format!("/api/quizzes/{}/sessions", quiz_id),
        Some(json!({ "participant_id": participant_id, "time_limit_seconds": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["state"], "in_progress");
    assert_eq!(session["current_index"], 0);
    assert_eq!(session["question_count"], 3);
    assert!(session["time_remaining"].is_null());
    assert_eq!(session["question"]["options"][0]["label"], "A");
    assert!(session["correct_option"].is_null());

    let token = session["token"].as_str().unwrap().to_string();
    let answer_uri = format!("/api/sessions/{}/answer", token);
    let next_uri = format!("/api/sessions/{}/next", token);

    let (_, early) = send(&app, "POST", &next_uri, None).await;
    assert_eq!(early["accepted"], false);
    assert_eq!(early["session"]["current_index"], 0);

    let (status, first) = send(&app, "POST", &answer_uri, Some(json!({ "label": "B" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["accepted"], true);
    assert_eq!(first["notification"], "Correct! 🎉");
    assert_eq!(first["session"]["is_correct"], true);
    assert_eq!(first["session"]["correct_option"], "B");

    let (_, repeat) = send(&app, "POST", &answer_uri, Some(json!({ "label": "C" }))).await;
    assert_eq!(repeat["accepted"], false);
    assert_eq!(repeat["session"]["selected_answer"], "B");
    assert_eq!(repeat["session"]["score"], 1);

    send(&app, "POST", &next_uri, None).await;
    let (_, wrong) = send(&app, "POST", &answer_uri, Some(json!({ "label": "C" }))).await;
    assert_eq!(wrong["notification"], "Wrong answer. Try the next one!");
    assert_eq!(wrong["session"]["score"], 1);

    send(&app, "POST", &next_uri, None).await;
    let (_, last) = send(&app, "POST", &answer_uri, Some(json!({ "label": "D" }))).await;
    assert_eq!(last["session"]["is_last_question"], true);

    let (_, done) = send(&app, "POST", &next_uri, None).await;
    assert_eq!(done["accepted"], true);
    assert_eq!(done["session"]["state"], "complete");
    assert_eq!(done["session"]["score"], 2);
    assert_eq!(done["session"]["result"]["points"], 20);
    assert_eq!(done["session"]["result"]["total_questions"], 3);
    assert_eq!(done["session"]["result"]["perfect"], false);
    assert!(done["session"]["result"]["celebration"].is_null());

    let (_, again) = send(&app, "POST", &next_uri, None).await;
    assert_eq!(again["accepted"], false);

    let profile_uri = format!("/api/participants/{}/profile", participant_id);
    let mut profile = json!(null);
    for _ in 0..50 {
        let (_, body) = send(&app, "GET", &profile_uri, None).await;
        if body["total_points"] == 20 {
            profile = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(profile["total_points"], 20);
    assert_eq!(profile["current_streak"], 1);
    assert_eq!(profile["best_streak"], 1);
    assert_eq!(profile["xp_to_next_level"], 80);
}

#[tokio::test]
async fn perfect_run_is_celebrated() {
    let app = app();
    let quiz_id = quiz_id_by_title(&app, "Fractions").await;
    let (_, session) = send(
        &app,
        "POST",
        &format!("/api/quizzes/{}/sessions", quiz_id),
        None,
    )
    .await;
    let token = session["token"].as_str().unwrap().to_string();

    let mut finished = json!(null);
    for label in ["B", "D"] {
        let (_, answered) = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/answer", token),
            Some(json!({ "label": label })),
        )
        .await;
        assert_eq!(answered["session"]["is_correct"], true);
        let (_, next) = send(&app, "POST", &format!("/api/sessions/{}/next", token), None).await;
        finished = next;
    }

    assert_eq!(finished["session"]["result"]["perfect"], true);
    assert_eq!(finished["session"]["result"]["celebration"], "grand");
}

#[tokio::test(start_paused = true)]
async fn unanswered_question_times_out() {
    let app = app();
    let quiz_id = quiz_id_by_title(&app, "Times Tables").await;
    let (_, session) = send(
        &app,
        "POST",
        &format!("/api/quizzes/{}/sessions", quiz_id),
        Some(json!({ "time_limit_seconds": 2 })),
    )
    .await;
    assert_eq!(session["time_remaining"], 2);
    let token = session["token"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let (status, view) = send(&app, "GET", &format!("/api/sessions/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["current_index"], 1);
    assert_eq!(view["time_remaining"], 2);
    assert_eq!(view["score"], 0);
    assert!(view["selected_answer"].is_null());
}

#[tokio::test]
async fn discarded_sessions_are_gone() {
    let app = app();
    let quiz_id = quiz_id_by_title(&app, "Addition Basics").await;
    let (_, session) = send(
        &app,
        "POST",
        &format!("/api/quizzes/{}/sessions", quiz_id),
        None,
    )
    .await;
    let uri = format!("/api/sessions/{}", session["token"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
}

#[tokio::test]
async fn event_stream_opens_with_a_snapshot() {
    let app = app();
    let quiz_id = quiz_id_by_title(&app, "Addition Basics").await;
    let (_, session) = send(
        &app,
        "POST",
        &format!("/api/quizzes/{}/sessions", quiz_id),
        None,
    )
    .await;
    let token = session["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{}/events", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8(first.to_vec()).unwrap();
    assert!(text.contains("event: snapshot"));
    assert!(text.contains(token));

    let (status, _) = send(&app, "GET", "/api/sessions/nope/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_over_budget_are_rejected() {
    let app = app_with(InMemoryQuizStore::seeded(), 2);
    let mut statuses = Vec::new();
    for _ in 0..3 {
        let (status, body) = send(&app, "GET", "/api/quizzes", None).await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            assert_eq!(body["error"], "rate_limit_exceeded");
        }
        statuses.push(status);
    }
    assert_eq!(
        statuses,
        [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_lists_session_routes() {
    let app = app();
    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/sessions/{token}/answer"].is_object());
    assert!(doc["paths"]["/api/quizzes/{id}/sessions"].is_object());
}
