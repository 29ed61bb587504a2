//! Interactive session: URL submission, model selection and summarization.
//!
//! [`Shell`] owns the collaborators and the [`Session`] state. Every handler
//! recovers from its own failures; the caller only decides how to render the
//! returned `Result`.

use crate::summarize::{ChatClient, Summarizer};
use crate::transcript::{Transcript, TranscriptFetcher, TranscriptSource};
use crate::video::parse_video_id;
use crate::{FetchError, SummarizeError};

pub mod repl;

pub use repl::Repl;

/// State held for the lifetime of one interactive session
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_url: Option<String>,
    transcript: Option<Transcript>,
    selected_model: String,
}

impl Session {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            selected_model: model.into(),
            ..Default::default()
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }
}

/// Outcome of a successful URL submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// A new transcript was fetched
    Fetched,
    /// Same URL as before; the held transcript was kept
    Unchanged,
}

pub struct Shell<S, C> {
    fetcher: TranscriptFetcher<S>,
    summarizer: Summarizer<C>,
    session: Session,
}

impl<S: TranscriptSource, C: ChatClient> Shell<S, C> {
    pub fn new(source: S, client: C, session: Session) -> Self {
        Self {
            fetcher: TranscriptFetcher::new(source),
            summarizer: Summarizer::new(client),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle a submitted URL.
    ///
    /// An unchanged URL with a transcript already held is a no-op. Any failure
    /// clears the held transcript.
    pub async fn submit_url(&mut self, url: &str) -> Result<FetchStatus, FetchError> {
        let url = url.trim();

        let Some(video_id) = parse_video_id(url) else {
            self.session.transcript = None;
            return Err(FetchError::UnrecognizedUrl(url.to_string()));
        };

        if self.session.current_url.as_deref() == Some(url) && self.session.transcript.is_some() {
            tracing::debug!("URL unchanged, keeping transcript for {}", video_id);
            return Ok(FetchStatus::Unchanged);
        }

        let result = self.fetcher.fetch_transcript(&video_id).await;
        self.session.current_url = Some(url.to_string());

        match result {
            Ok(transcript) => {
                self.session.transcript = Some(transcript);
                Ok(FetchStatus::Fetched)
            }
            Err(e) => {
                self.session.transcript = None;
                Err(e)
            }
        }
    }

    /// Change the model used for the next summary
    pub fn select_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        if model != self.session.selected_model {
            tracing::debug!("Selected model: {}", model);
            self.session.selected_model = model;
        }
    }

    /// Summarize the held transcript with the selected model
    pub async fn summarize(&self) -> Result<String, SummarizeError> {
        let transcript = self
            .session
            .transcript
            .as_ref()
            .ok_or(SummarizeError::MissingTranscript)?;

        self.summarizer
            .summarize(transcript.text(), &self.session.selected_model)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize::{ChatMessage, ChatResponse, MockChatClient, Role};
    use crate::transcript::{CaptionError, MockTranscriptSource, TranscriptFragment};
    use crate::video::VideoId;
    use tokio_test::{assert_err, assert_ok};

    const URL: &str = "https://www.youtube.com/watch?v=abc123";

    fn fragments(texts: &[&str]) -> Vec<TranscriptFragment> {
        texts
            .iter()
            .map(|t| TranscriptFragment::new(*t, 0.0, 1.0))
            .collect()
    }

    fn reply(content: &str) -> ChatResponse {
        ChatResponse {
            model: None,
            message: ChatMessage {
                role: Role::Assistant,
                content: content.to_string(),
            },
            done: true,
        }
    }

    fn shell(source: MockTranscriptSource, client: MockChatClient) -> Shell<MockTranscriptSource, MockChatClient> {
        Shell::new(source, client, Session::new("llama2"))
    }

    #[tokio::test]
    async fn test_same_url_is_not_refetched() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .withf(|id| id == &VideoId::new("abc123"))
            .times(1)
            .returning(|_| Ok(fragments(&["a", "b"])));

        let mut shell = shell(source, MockChatClient::new());

        assert_eq!(assert_ok!(shell.submit_url(URL).await), FetchStatus::Fetched);
        assert_eq!(assert_ok!(shell.submit_url(URL).await), FetchStatus::Unchanged);
        assert_eq!(shell.session().transcript().unwrap().text(), "a\nb");
        assert_eq!(shell.session().current_url(), Some(URL));
    }

    #[tokio::test]
    async fn test_new_url_replaces_transcript() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|id| Ok(fragments(&[id.as_str()])));

        let mut shell = shell(source, MockChatClient::new());

        assert_ok!(shell.submit_url(URL).await);
        assert_ok!(shell.submit_url("https://youtu.be/xyz789").await);
        assert_eq!(shell.session().transcript().unwrap().text(), "xyz789");
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_transcript() {
        let mut source = MockTranscriptSource::new();
        let mut calls = 0;
        source.expect_fetch().times(2).returning(move |id| {
            calls += 1;
            if calls == 1 {
                Ok(fragments(&["old"]))
            } else {
                Err(CaptionError::TranscriptsDisabled(id.clone()))
            }
        });

        let mut shell = shell(source, MockChatClient::new());

        assert_ok!(shell.submit_url(URL).await);
        let err = assert_err!(shell.submit_url("https://youtu.be/other").await);

        assert!(matches!(err, FetchError::Unavailable(ref detail) if detail.contains("disabled")));
        assert!(shell.session().transcript().is_none());
    }

    #[tokio::test]
    async fn test_failed_url_is_retried_on_resubmit() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|_| Err(CaptionError::Command("network down".to_string())));

        let mut shell = shell(source, MockChatClient::new());

        assert_err!(shell.submit_url(URL).await);
        assert_err!(shell.submit_url(URL).await);
    }

    #[tokio::test]
    async fn test_unrecognized_url_clears_transcript() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().times(1).returning(|_| Ok(fragments(&["a"])));

        let mut shell = shell(source, MockChatClient::new());
        assert_ok!(shell.submit_url(URL).await);

        let err = assert_err!(shell.submit_url("https://vimeo.com/1").await);

        assert_eq!(err, FetchError::UnrecognizedUrl("https://vimeo.com/1".to_string()));
        assert!(shell.session().transcript().is_none());
    }

    #[tokio::test]
    async fn test_summarize_requires_transcript() {
        let mut client = MockChatClient::new();
        client.expect_chat().never();

        let shell = shell(MockTranscriptSource::new(), client);

        assert_eq!(
            assert_err!(shell.summarize().await),
            SummarizeError::MissingTranscript
        );
    }

    #[tokio::test]
    async fn test_summarize_uses_selected_model() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().returning(|_| Ok(fragments(&["hello"])));

        let mut client = MockChatClient::new();
        client
            .expect_chat()
            .withf(|req| req.model == "qwen3:8b" && req.messages[0].content.contains("hello"))
            .times(2)
            .returning(|_| Ok(reply("X")));

        let mut shell = shell(source, client);
        assert_ok!(shell.submit_url(URL).await);

        shell.select_model("qwen3:8b");
        assert_eq!(shell.session().selected_model(), "qwen3:8b");

        // Summaries are not cached
        assert_eq!(assert_ok!(shell.summarize().await), "X");
        assert_eq!(assert_ok!(shell.summarize().await), "X");
    }

    #[tokio::test]
    async fn test_summarize_rejects_empty_model() {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().returning(|_| Ok(fragments(&["hello"])));

        let mut client = MockChatClient::new();
        client.expect_chat().never();

        let mut shell = shell(source, client);
        assert_ok!(shell.submit_url(URL).await);
        shell.select_model("");

        assert_eq!(
            assert_err!(shell.summarize().await),
            SummarizeError::MissingModel
        );
    }
}
