//! yt-summarizer - fetch YouTube transcripts and summarize them with a local Ollama model
//!
//! The pipeline is small: a YouTube URL is reduced to a video id, the video's
//! captions are flattened into one block of text, and that text can be handed
//! to a chat model for a structured meeting-style summary.

pub mod cli;
pub mod config;
pub mod output;
pub mod shell;
pub mod summarize;
pub mod transcript;
pub mod utils;
pub mod video;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use shell::{FetchStatus, Session, Shell};
pub use summarize::{ChatClient, OllamaClient, Summarizer};
pub use transcript::{Transcript, TranscriptFetcher, TranscriptSource, YtDlpSource};
pub use video::{parse_video_id, VideoId};

/// Result type used throughout the application layer
pub type Result<T> = anyhow::Result<T>;

/// Failure to turn a URL into transcript text
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid or unrecognized YouTube URL: {0}")]
    UnrecognizedUrl(String),

    #[error("Transcript unavailable: {0}")]
    Unavailable(String),

    #[error("Error retrieving transcript: {0}")]
    Retrieval(String),
}

/// Failure to produce a summary for a transcript
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("No transcript available to summarize. Please fetch a transcript first.")]
    MissingTranscript,

    #[error("No model selected. Please choose an Ollama model.")]
    MissingModel,

    #[error("Error from Ollama: {0}. Please ensure the specified model is downloaded.")]
    ModelUnavailable(String),

    #[error("Could not reach Ollama: {0}. Please ensure Ollama is running.")]
    ServiceUnreachable(String),

    #[error("An unexpected error occurred with Ollama: {0}. Double-check your Ollama setup and model name.")]
    Unexpected(String),
}
