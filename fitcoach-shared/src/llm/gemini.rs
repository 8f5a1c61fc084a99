/// Gemini `generateContent` client
///
/// Maps chat roles onto Gemini's `user` / `model` roles and returns the
/// first candidate's concatenated text parts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChatModel, LlmError};
use crate::models::chat::{ChatMessage, MessageRole};

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Coaching persona prepended to every conversation
const SYSTEM_INSTRUCTION: &str = "You are FitCoach, a knowledgeable and encouraging strength and \
conditioning coach. Give practical, safe training and nutrition advice. When a question needs \
a medical professional, say so.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn send(&self, conversation: &[ChatMessage], user_id: Option<Uuid>) -> Result<String, LlmError> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION }],
            },
            contents: conversation
                .iter()
                .map(|message| Content {
                    role: Some(gemini_role(message.role)),
                    parts: vec![Part { text: &message.content }],
                })
                .collect(),
        };

        tracing::debug!(
            model = %self.model,
            messages = conversation.len(),
            user_id = ?user_id,
            "Sending conversation to Gemini"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Invalid response body: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }
}
