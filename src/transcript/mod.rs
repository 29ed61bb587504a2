use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod captions;
pub mod ytdlp;

pub use ytdlp::YtDlpSource;

use crate::video::VideoId;
use crate::FetchError;

/// One caption unit as returned by the transcript source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Caption text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A caption track available for a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    /// Human readable language name
    pub language: String,

    /// Language code, e.g. `en` or `de-DE`
    pub language_code: String,

    /// Whether the track was generated by speech recognition
    pub is_generated: bool,
}

/// Errors reported by a transcript source
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(VideoId),

    #[error("No transcript found for video {video_id} in languages [{requested}]; available: [{available}]")]
    NoTranscriptFound {
        video_id: VideoId,
        requested: String,
        available: String,
    },

    #[error("Video {0} is unavailable: {1}")]
    VideoUnavailable(VideoId, String),

    #[error("yt-dlp is not available ({0}). Please install it: https://github.com/yt-dlp/yt-dlp")]
    ToolMissing(String),

    #[error("yt-dlp failed: {0}")]
    Command(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse caption data: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<CaptionError> for FetchError {
    fn from(err: CaptionError) -> Self {
        match err {
            CaptionError::TranscriptsDisabled(_)
            | CaptionError::NoTranscriptFound { .. }
            | CaptionError::VideoUnavailable(..) => FetchError::Unavailable(err.to_string()),
            other => FetchError::Retrieval(other.to_string()),
        }
    }
}

/// Retrieves caption data for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the ordered caption fragments of the default transcript
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<TranscriptFragment>, CaptionError>;

    /// List the caption tracks the video offers
    async fn list(&self, video_id: &VideoId) -> Result<Vec<TranscriptTrack>, CaptionError>;
}

/// A fetched transcript with its flattened text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    pub fragments: Vec<TranscriptFragment>,
    text: String,
}

impl Transcript {
    pub fn new(video_id: VideoId, fragments: Vec<TranscriptFragment>) -> Self {
        let text = fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            video_id,
            fragments,
            text,
        }
    }

    /// Fragment texts joined by newlines, in source order
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// End of the last fragment in seconds
    pub fn duration(&self) -> f64 {
        self.fragments.last().map(|f| f.end()).unwrap_or(0.0)
    }
}

/// Flattens a source's caption fragments into transcript text
pub struct TranscriptFetcher<S> {
    source: S,
}

impl<S: TranscriptSource> TranscriptFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript, FetchError> {
        tracing::info!("Fetching transcript for video: {}", video_id);

        let fragments = self.source.fetch(video_id).await.map_err(|e| {
            tracing::debug!(video_id = %video_id, error = %e, "Transcript fetch failed");
            FetchError::from(e)
        })?;

        tracing::debug!("Received {} caption fragments", fragments.len());
        Ok(Transcript::new(video_id.clone(), fragments))
    }

    pub async fn list_tracks(&self, video_id: &VideoId) -> Result<Vec<TranscriptTrack>, FetchError> {
        Ok(self.source.list(video_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn fragments(texts: &[&str]) -> Vec<TranscriptFragment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| TranscriptFragment::new(*text, i as f64 * 2.0, 2.0))
            .collect()
    }

    #[tokio::test]
    async fn test_fragments_are_newline_joined() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(fragments(&["a", "b", "c"])));

        let fetcher = TranscriptFetcher::new(source);
        let transcript = assert_ok!(fetcher.fetch_transcript(&VideoId::new("xyz")).await);

        assert_eq!(transcript.text(), "a\nb\nc");
        assert_eq!(transcript.video_id, VideoId::new("xyz"));
        assert_eq!(transcript.duration(), 6.0);
    }

    #[tokio::test]
    async fn test_order_and_duplicates_are_kept() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(fragments(&["again", "again", "once"])));

        let fetcher = TranscriptFetcher::new(source);
        let transcript = assert_ok!(fetcher.fetch_transcript(&VideoId::new("xyz")).await);

        assert_eq!(transcript.text(), "again\nagain\nonce");
    }

    #[tokio::test]
    async fn test_disabled_maps_to_unavailable() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .returning(|id| Err(CaptionError::TranscriptsDisabled(id.clone())));

        let fetcher = TranscriptFetcher::new(source);
        let err = assert_err!(fetcher.fetch_transcript(&VideoId::new("xyz")).await);

        match err {
            FetchError::Unavailable(detail) => assert!(detail.contains("disabled")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_failure_maps_to_retrieval() {
        let mut source = MockTranscriptSource::new();
        source
            .expect_fetch()
            .returning(|_| Err(CaptionError::Command("HTTP Error 429".to_string())));

        let fetcher = TranscriptFetcher::new(source);
        let err = assert_err!(fetcher.fetch_transcript(&VideoId::new("xyz")).await);

        assert_eq!(err, FetchError::Retrieval("yt-dlp failed: HTTP Error 429".to_string()));
    }

    #[tokio::test]
    async fn test_list_tracks_passes_through() {
        let mut source = MockTranscriptSource::new();
        source.expect_list().returning(|_| {
            Ok(vec![TranscriptTrack {
                language: "English".to_string(),
                language_code: "en".to_string(),
                is_generated: false,
            }])
        });

        let fetcher = TranscriptFetcher::new(source);
        let tracks = assert_ok!(fetcher.list_tracks(&VideoId::new("xyz")).await);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
    }

    #[test]
    fn test_empty_transcript() {
        assert!(Transcript::new(VideoId::new("x"), Vec::new()).is_empty());
        assert!(Transcript::new(VideoId::new("x"), fragments(&[" ", ""])).is_empty());
        assert!(!Transcript::new(VideoId::new("x"), fragments(&["hi"])).is_empty());
    }
}
