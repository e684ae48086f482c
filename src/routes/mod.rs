pub mod docs;
pub mod health;
pub mod participants;
pub mod quizzes;
pub mod sessions;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors::cors_layer, rate_limit};
use crate::AppState;

pub fn build_router(state: AppState, public_rps: u32, cors_allowed_origin: Option<&str>) -> Router {
    let api = Router::new()
        .route("/api/quizzes", get(quizzes::list_quizzes))
        .route("/api/quizzes/:id", get(quizzes::get_quiz))
        .route("/api/quizzes/:id/sessions", post(sessions::start_session))
        .route(
            "/api/sessions/:token",
            get(sessions::get_session).delete(sessions::discard_session),
        )
        .route("/api/sessions/:token/answer", post(sessions::submit_answer))
        .route("/api/sessions/:token/next", post(sessions::next_question))
        .route("/api/sessions/:token/events", get(sessions::session_events))
        .route("/api/participants", post(participants::register_participant))
        .route("/api/participants/:id/profile", get(participants::get_profile))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(public_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(api)
        .layer(cors_layer(cors_allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
