use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod ollama;

pub use ollama::OllamaClient;

use crate::SummarizeError;

const PROMPT_TEMPLATE: &str = include_str!("./prompts/meeting_summary.txt");

/// Build the summarization prompt with the transcript embedded verbatim
pub fn build_prompt(transcript: &str) -> String {
    PROMPT_TEMPLATE.replacen("{transcript}", transcript, 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Single-turn, non-streaming chat request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
}

/// Errors reported by a chat service
#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("{message} (HTTP {status})")]
    Response { status: u16, message: String },

    #[error("{0}")]
    Unreachable(String),

    #[error("Invalid response from chat service: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ChatError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Http(err)
        }
    }
}

impl From<ChatError> for SummarizeError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Response {
                status: 404,
                message,
            } => SummarizeError::ModelUnavailable(message),
            ChatError::Unreachable(detail) => SummarizeError::ServiceUnreachable(detail),
            other => SummarizeError::Unexpected(other.to_string()),
        }
    }
}

/// Single request/response chat completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError>;
}

/// Turns transcript text into a structured summary using a chat model
pub struct Summarizer<C> {
    client: C,
}

impl<C: ChatClient> Summarizer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn summarize(&self, transcript: &str, model: &str) -> Result<String, SummarizeError> {
        if transcript.trim().is_empty() {
            return Err(SummarizeError::MissingTranscript);
        }
        if model.trim().is_empty() {
            return Err(SummarizeError::MissingModel);
        }

        tracing::info!(
            model = %model,
            transcript_chars = transcript.len(),
            "Requesting summary"
        );

        let request = ChatRequest::new(model, vec![ChatMessage::user(build_prompt(transcript))]);
        let response = self.client.chat(request).await.map_err(|e| {
            tracing::debug!(model = %model, error = %e, "Summarization failed");
            SummarizeError::from(e)
        })?;

        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn reply(content: &str) -> ChatResponse {
        ChatResponse {
            model: Some("llama2".to_string()),
            message: ChatMessage {
                role: Role::Assistant,
                content: content.to_string(),
            },
            done: true,
        }
    }

    #[test]
    fn test_prompt_embeds_transcript() {
        let prompt = build_prompt("first line\nsecond line");

        assert!(prompt.starts_with("Summarize the following meeting transcript"));
        assert!(prompt.contains("--- MEETING TRANSCRIPT ---\nfirst line\nsecond line\n--- END OF TRANSCRIPT ---"));
        assert!(prompt.contains("**Key Takeaways:**"));
        assert!(!prompt.contains("{transcript}"));
    }

    #[test]
    fn test_prompt_placeholder_in_transcript_is_kept() {
        let prompt = build_prompt("someone said {transcript}");
        assert!(prompt.contains("someone said {transcript}"));
    }

    #[tokio::test]
    async fn test_summary_is_returned_unmodified() {
        let mut client = MockChatClient::new();
        client
            .expect_chat()
            .withf(|req| {
                req.model == "mistral"
                    && !req.stream
                    && req.messages.len() == 1
                    && req.messages[0].role == Role::User
                    && req.messages[0].content.contains("hello world")
            })
            .times(1)
            .returning(|_| Ok(reply("  **Topic Name:** X\n")));

        let summarizer = Summarizer::new(client);
        let summary = assert_ok!(summarizer.summarize("hello world", "mistral").await);

        assert_eq!(summary, "  **Topic Name:** X\n");
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected_before_call() {
        let mut client = MockChatClient::new();
        client.expect_chat().never();

        let summarizer = Summarizer::new(client);

        assert_eq!(
            assert_err!(summarizer.summarize("", "llama2").await),
            SummarizeError::MissingTranscript
        );
        assert_eq!(
            assert_err!(summarizer.summarize(" \n ", "llama2").await),
            SummarizeError::MissingTranscript
        );
    }

    #[tokio::test]
    async fn test_empty_model_rejected_before_call() {
        let mut client = MockChatClient::new();
        client.expect_chat().never();

        let summarizer = Summarizer::new(client);
        let err = assert_err!(summarizer.summarize("text", "").await);

        assert_eq!(err, SummarizeError::MissingModel);
    }

    #[tokio::test]
    async fn test_missing_model_error() {
        let mut client = MockChatClient::new();
        client.expect_chat().returning(|_| {
            Err(ChatError::Response {
                status: 404,
                message: "model \"nope\" not found, try pulling it first".to_string(),
            })
        });

        let summarizer = Summarizer::new(client);
        let err = assert_err!(summarizer.summarize("text", "nope").await);

        assert_eq!(
            err,
            SummarizeError::ModelUnavailable(
                "model \"nope\" not found, try pulling it first".to_string()
            )
        );
        assert!(err.to_string().starts_with("Error from Ollama: model \"nope\" not found"));
    }

    #[tokio::test]
    async fn test_unreachable_and_unexpected_errors() {
        let mut client = MockChatClient::new();
        client
            .expect_chat()
            .times(1)
            .returning(|_| Err(ChatError::Unreachable("connection refused".to_string())));
        let summarizer = Summarizer::new(client);
        assert_eq!(
            assert_err!(summarizer.summarize("text", "llama2").await),
            SummarizeError::ServiceUnreachable("connection refused".to_string())
        );

        let mut client = MockChatClient::new();
        client.expect_chat().times(1).returning(|_| {
            Err(ChatError::Response {
                status: 500,
                message: "out of memory".to_string(),
            })
        });
        let summarizer = Summarizer::new(client);
        assert_eq!(
            assert_err!(summarizer.summarize("text", "llama2").await),
            SummarizeError::Unexpected("out of memory (HTTP 500)".to_string())
        );
    }

    #[tokio::test]
    async fn test_identical_requests_are_not_cached() {
        let mut client = MockChatClient::new();
        client.expect_chat().times(2).returning(|_| Ok(reply("summary")));

        let summarizer = Summarizer::new(client);
        assert_ok!(summarizer.summarize("text", "llama2").await);
        assert_ok!(summarizer.summarize("text", "llama2").await);
    }
}
