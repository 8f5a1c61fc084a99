/// Language model seam
///
/// Chat handlers talk to the model through [`ChatModel`]. Retrieval and
/// prompt assembly belong to the model side of this boundary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::chat::ChatMessage;

pub mod gemini;

pub use gemini::GeminiClient;

/// LLM errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Model endpoint could not be reached
    #[error("LLM request failed: {0}")]
    Transport(String),

    /// Model endpoint answered with an error status
    #[error("LLM returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response contained no usable text (e.g. blocked by safety filters)
    #[error("LLM returned no content")]
    EmptyResponse,
}

/// Conversational model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends the whole conversation and returns the assistant's reply
    ///
    /// `user_id` lets the model side scope retrieval to the caller.
    async fn send(&self, conversation: &[ChatMessage], user_id: Option<Uuid>) -> Result<String, LlmError>;
}
