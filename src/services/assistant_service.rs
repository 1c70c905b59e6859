use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::assistant::{ChatRequest, ChatResponse};
use crate::models::stats::TimeRange;
use crate::recurrence::should_occur_on_date;
use crate::repositories::RepositoryError;
use crate::repositories::achievement_repository::AchievementRepository;
use crate::repositories::habit_repository::HabitRepository;
use crate::stats::{completion_rate, current_streak};

/// Assistant service errors
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("timeout")]
    Timeout,

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid api key")]
    InvalidApiKey,

    #[error("rate limited")]
    RateLimited,

    #[error("json error: {0}")]
    Serde(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for AssistantError {
    fn from(error: RepositoryError) -> Self {
        AssistantError::DatabaseError(error.to_string())
    }
}

/// A message in the conversation sent to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the text-generation gateway
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

/// Response from the text-generation gateway
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    text: String,
}

/// Trait over the generative-text collaborator, the seam that keeps the
/// coaching service testable without a network
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn complete(&self, system: &str, message: &str) -> Result<String, AssistantError>;
}

/// reqwest-backed gateway client. Provider-agnostic JSON with a bearer
/// key; exactly one attempt per invocation, the caller decides whether
/// to retry.
pub struct HttpAssistantClient {
    http: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpAssistantClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn complete(&self, system: &str, message: &str) -> Result<String, AssistantError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(system.to_string()),
            messages: vec![Message::user(message)],
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout
                } else {
                    AssistantError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AssistantError::InvalidApiKey);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AssistantError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Serde(e.to_string()))?;
        Ok(completion.text)
    }
}

/// Trait defining assistant service operations
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Answer a coaching question with the user's current habit state
    /// as context
    async fn chat(
        &self,
        user_id: Uuid,
        request: ChatRequest,
    ) -> Result<ChatResponse, AssistantError>;
}

/// Implementation of AssistantService
pub struct AssistantServiceImpl {
    client: Arc<dyn AssistantClient>,
    habit_repository: Arc<dyn HabitRepository>,
    achievement_repository: Arc<dyn AchievementRepository>,
}

impl AssistantServiceImpl {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        habit_repository: Arc<dyn HabitRepository>,
        achievement_repository: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            client,
            habit_repository,
            achievement_repository,
        }
    }

    /// Assemble the context bundle: today's schedule with completion
    /// marks, the 7-day completion rate, the global streak, and
    /// unlocked-achievement totals
    async fn build_context(&self, user_id: Uuid) -> Result<String, AssistantError> {
        let habits = self.habit_repository.find_by_user(user_id).await?;
        let achievements = self.achievement_repository.find_by_user(user_id).await?;
        let today = Utc::now().date_naive();

        let mut lines = vec![
            "You are a supportive habit coach. Answer briefly and concretely,".to_string(),
            "using the user's data below.".to_string(),
            String::new(),
            format!("Today ({}):", today),
        ];
        let mut scheduled_today = false;
        for habit in &habits {
            if should_occur_on_date(habit, today) {
                scheduled_today = true;
                let mark = if habit.completed_dates.contains(&today) {
                    "done"
                } else {
                    "pending"
                };
                lines.push(format!("- {} [{}], streak {}", habit.title, mark, habit.current_streak));
            }
        }
        if !scheduled_today {
            lines.push("- no habits scheduled".to_string());
        }

        let rate = completion_rate(&habits, TimeRange::Last7Days, today);
        let streak = current_streak(&habits, today);
        let unlocked: Vec<_> = achievements.iter().filter(|a| a.unlocked).collect();
        let xp: i32 = unlocked.iter().map(|a| a.xp).sum();

        lines.push(String::new());
        lines.push(format!("7-day completion rate: {}%", rate));
        lines.push(format!("Current streak: {} days", streak));
        lines.push(format!(
            "Achievements unlocked: {} of {} ({} XP)",
            unlocked.len(),
            achievements.len(),
            xp
        ));

        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl AssistantService for AssistantServiceImpl {
    async fn chat(
        &self,
        user_id: Uuid,
        request: ChatRequest,
    ) -> Result<ChatResponse, AssistantError> {
        let context = self.build_context(user_id).await?;
        let reply = self.client.complete(&context, &request.message).await?;
        Ok(ChatResponse { reply })
    }
}
