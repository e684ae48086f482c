use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::profile::Profile;
use crate::store::QuizStore;

#[derive(Clone)]
pub struct ParticipantService {
    store: Arc<dyn QuizStore>,
}

impl ParticipantService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Registers a participant. Returns the participant and whether it is new;
    /// an already registered email resolves to the existing record.
    pub async fn register(&self, new: NewParticipant) -> Result<(Participant, bool)> {
        let new = NewParticipant {
            name: new.name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
        };

        match self.store.insert_participant(&new).await {
            Ok(participant) => {
                let profile = Profile::new(participant.id, participant.name.clone());
                if let Err(e) = self.store.insert_profile(&profile).await {
                    tracing::warn!(error = ?e, participant_id = %participant.id, "failed to create profile");
                }
                tracing::info!(participant_id = %participant.id, "participant registered");
                Ok((participant, true))
            }
            Err(Error::Conflict(_)) => {
                let existing = self
                    .store
                    .find_participant_by_email(&new.email)
                    .await?
                    .ok_or_else(|| Error::Internal("Registered participant could not be found".to_string()))?;
                tracing::debug!(participant_id = %existing.id, "participant already registered");
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn profile(&self, id: Uuid) -> Result<Profile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| Error::NotFound("Profile not found".to_string()))
    }
}
