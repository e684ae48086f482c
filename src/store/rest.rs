use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::error::{is_unique_violation_code, Error, Result};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::profile::Profile;
use crate::models::question::{Question, QuestionRow};
use crate::models::quiz::{Quiz, QuizRow};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::store::QuizStore;

/// Client for the hosted data REST API (`/rest/v1/<table>`).
#[derive(Clone)]
pub struct RestQuizStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl RestQuizStore {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid DATA_API_URL: {}", e)))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn table(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(&format!("rest/v1/{}", name))
            .map_err(|e| Error::Internal(format!("Invalid data API path: {}", e)))
    }

    fn rpc(&self, function: &str) -> Result<Url> {
        self.base_url
            .join(&format!("rest/v1/rpc/{}", function))
            .map_err(|e| Error::Internal(format!("Invalid data API path: {}", e)))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = self.authorize(req).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(map_error_body(status, &body));
        }
        Ok(res.json::<T>().await?)
    }

    async fn insert_one<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self
            .client
            .post(self.table(table)?)
            .header("Prefer", "return=representation")
            .json(body);
        let mut rows: Vec<T> = self.fetch(req).await?;
        if rows.is_empty() {
            return Err(Error::Upstream(format!("insert into {} returned no rows", table)));
        }
        Ok(rows.swap_remove(0))
    }
}

fn map_error_body(status: StatusCode, body: &str) -> Error {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.as_deref());
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::CONFLICT || is_unique_violation_code(code) {
        return Error::Conflict(message);
    }
    tracing::warn!(%status, %message, "data API request failed");
    Error::Upstream(format!("{}: {}", status, message))
}

#[async_trait]
impl QuizStore for RestQuizStore {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let req = self.client.get(self.table("quizzes")?).query(&[("select", "*")]);
        let rows: Vec<QuizRow> = self.fetch(req).await?;
        Ok(rows.into_iter().map(Quiz::from).collect())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        let req = self
            .client
            .get(self.table("quizzes")?)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let rows: Vec<QuizRow> = self.fetch(req).await?;
        Ok(rows.into_iter().next().map(Quiz::from))
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let req = self.client.get(self.table("questions")?).query(&[
            ("select", "*".to_string()),
            ("quiz_id", format!("eq.{}", quiz_id)),
            ("order", "order_num.asc".to_string()),
        ]);
        let rows: Vec<QuestionRow> = self.fetch(req).await?;
        rows.into_iter().map(Question::try_from).collect()
    }

    async fn insert_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt> {
        self.insert_one("quiz_attempts", attempt).await
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let req = self
            .client
            .get(self.table("profiles")?)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let rows: Vec<Profile> = self.fetch(req).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
        self.insert_one("profiles", profile).await
    }

    /// Calls the `award_profile` database function. It returns the updated
    /// row as a set, empty when the profile is missing.
    async fn award_profile(&self, id: Uuid, points: i32) -> Result<Option<Profile>> {
        let req = self
            .client
            .post(self.rpc("award_profile")?)
            .json(&json!({
                "profile_id": id,
                "points": points,
            }));
        let rows: Vec<Profile> = self.fetch(req).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_participant(&self, participant: &NewParticipant) -> Result<Participant> {
        self.insert_one("form_users", participant).await
    }

    async fn find_participant_by_email(&self, email: &str) -> Result<Option<Participant>> {
        let req = self
            .client
            .get(self.table("form_users")?)
            .query(&[("select", "*".to_string()), ("email", format!("eq.{}", email))]);
        let rows: Vec<Participant> = self.fetch(req).await?;
        Ok(rows.into_iter().next())
    }
}
