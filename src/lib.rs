pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::services::{
    attempt_service::AttemptService,
    participant_service::ParticipantService,
    quiz_service::QuizService,
    session_service::{SessionService, SessionSettings},
};
use crate::store::QuizStore;

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: QuizService,
    pub session_service: SessionService,
    pub participant_service: ParticipantService,
}

impl AppState {
    pub fn new(store: Arc<dyn QuizStore>, settings: SessionSettings) -> Self {
        let attempt_service = AttemptService::new(store.clone());
        let session_service = SessionService::new(store.clone(), attempt_service, settings);
        let quiz_service = QuizService::new(store.clone());
        let participant_service = ParticipantService::new(store);

        Self {
            quiz_service,
            session_service,
            participant_service,
        }
    }
}
