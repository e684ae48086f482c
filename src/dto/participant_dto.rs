use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::participant::Participant;
use crate::models::profile::Profile;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterParticipantRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// False when the email was already registered.
    pub created: bool,
}

impl ParticipantResponse {
    pub fn new(participant: Participant, created: bool) -> Self {
        Self {
            id: participant.id,
            name: participant.name,
            email: participant.email,
            created,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub total_points: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub level: String,
    pub xp_to_next_level: i32,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            xp_to_next_level: profile.xp_to_next_level(),
            id: profile.id,
            username: profile.username,
            display_name: profile.display_name,
            total_points: profile.total_points,
            current_streak: profile.current_streak,
            best_streak: profile.best_streak,
            level: profile.level,
        }
    }
}
