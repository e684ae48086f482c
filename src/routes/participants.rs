use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::participant_dto::{ParticipantResponse, ProfileResponse, RegisterParticipantRequest};
use crate::error::Result;
use crate::models::participant::NewParticipant;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/participants",
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = ParticipantResponse),
        (status = 200, description = "Email already registered, existing participant returned", body = ParticipantResponse),
        (status = 400, description = "Invalid name or email"),
    ),
)]
pub async fn register_participant(
    State(state): State<AppState>,
    Json(payload): Json<RegisterParticipantRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (participant, created) = state
        .participant_service
        .register(NewParticipant {
            name: payload.name,
            email: payload.email,
        })
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ParticipantResponse::new(participant, created))))
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}/profile",
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Points, streaks and level", body = ProfileResponse),
        (status = 404, description = "Profile not found"),
    ),
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let profile = state.participant_service.profile(id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}
