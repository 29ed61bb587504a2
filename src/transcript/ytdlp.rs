use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::captions::{self, CaptionTrack, TrackPreference, VideoCaptions};
use super::{CaptionError, TranscriptFragment, TranscriptSource, TranscriptTrack};
use crate::video::VideoId;

/// yt-dlp messages that mean the video itself cannot be read
const UNAVAILABLE_MARKERS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video has been removed",
    "Sign in to confirm your age",
    "Incomplete YouTube ID",
];

/// Transcript source backed by yt-dlp metadata and YouTube's timedtext captions
pub struct YtDlpSource {
    yt_dlp_path: String,
    http: reqwest::Client,
    preference: TrackPreference,
}

impl YtDlpSource {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            http: reqwest::Client::new(),
            preference: TrackPreference::default(),
        }
    }

    pub fn with_binary(mut self, path: impl Into<String>) -> Self {
        self.yt_dlp_path = path.into();
        self
    }

    pub fn with_preference(mut self, preference: TrackPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Get caption metadata using yt-dlp
    async fn get_captions(&self, video_id: &VideoId) -> Result<VideoCaptions, CaptionError> {
        let url = video_id.watch_url();
        tracing::debug!("Reading caption metadata for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                url.as_str(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CaptionError::ToolMissing(e.to_string()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if UNAVAILABLE_MARKERS.iter().any(|marker| error.contains(marker)) {
                return Err(CaptionError::VideoUnavailable(video_id.clone(), error));
            }
            return Err(CaptionError::Command(error));
        }

        let info: VideoCaptions = serde_json::from_slice(&output.stdout)?;
        if let Some(title) = &info.title {
            tracing::info!("Found video: {}", title);
        }

        Ok(info)
    }

    fn choose<'a>(
        &self,
        video_id: &VideoId,
        tracks: &'a [CaptionTrack],
    ) -> Result<&'a CaptionTrack, CaptionError> {
        if tracks.is_empty() {
            return Err(CaptionError::TranscriptsDisabled(video_id.clone()));
        }

        self.preference
            .select(tracks)
            .ok_or_else(|| CaptionError::NoTranscriptFound {
                video_id: video_id.clone(),
                requested: self.preference.languages.join(", "),
                available: tracks
                    .iter()
                    .map(|t| t.track.language_code.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    async fn download_captions(&self, track: &CaptionTrack) -> Result<String, CaptionError> {
        let url = with_caption_format(&track.url);
        tracing::debug!(
            language = %track.track.language_code,
            generated = track.track.is_generated,
            "Downloading captions"
        );

        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch(&self, video_id: &VideoId) -> Result<Vec<TranscriptFragment>, CaptionError> {
        let info = self.get_captions(video_id).await?;
        let tracks = info.tracks();
        let track = self.choose(video_id, &tracks)?;

        tracing::info!(
            "Using {} transcript: {} ({})",
            if track.track.is_generated { "generated" } else { "manual" },
            track.track.language,
            track.track.language_code
        );

        let body = self.download_captions(track).await?;
        Ok(captions::parse_json3(&body)?)
    }

    async fn list(&self, video_id: &VideoId) -> Result<Vec<TranscriptTrack>, CaptionError> {
        let info = self.get_captions(video_id).await?;
        Ok(info.tracks().into_iter().map(|t| t.track).collect())
    }
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Force the `fmt` query parameter to json3
fn with_caption_format(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .filter(|(key, _)| key != "fmt")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(pairs)
                .append_pair("fmt", captions::CAPTION_FORMAT);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
