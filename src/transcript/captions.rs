use serde::Deserialize;
use std::collections::BTreeMap;

use super::{TranscriptFragment, TranscriptTrack};

/// Caption format requested from YouTube's timedtext endpoint
pub const CAPTION_FORMAT: &str = "json3";

/// Subset of `yt-dlp --dump-json` output describing captions
#[derive(Debug, Default, Deserialize)]
pub struct VideoCaptions {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<CaptionFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

#[derive(Debug, Deserialize)]
struct CaptionFormat {
    ext: String,
    url: String,
    #[serde(default)]
    name: Option<String>,
}

/// A track together with the URL its json3 captions can be downloaded from
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub track: TranscriptTrack,
    pub url: String,
}

impl VideoCaptions {
    /// All downloadable tracks, manual ones first.
    ///
    /// Machine translations of the generated track are skipped.
    pub fn tracks(&self) -> Vec<CaptionTrack> {
        let manual = collect_tracks(&self.subtitles, false);
        let generated = collect_tracks(&self.automatic_captions, true)
            .into_iter()
            .filter(|t| !t.url.contains("tlang="));

        manual.into_iter().chain(generated).collect()
    }
}

fn collect_tracks(
    tracks: &BTreeMap<String, Vec<CaptionFormat>>,
    is_generated: bool,
) -> Vec<CaptionTrack> {
    tracks
        .iter()
        // yt-dlp exposes live chat replay as a subtitle track
        .filter(|(code, _)| code.as_str() != "live_chat")
        .filter_map(|(code, formats)| {
            let format = formats.iter().find(|f| f.ext == CAPTION_FORMAT)?;
            let language = formats
                .iter()
                .find_map(|f| f.name.clone())
                .unwrap_or_else(|| code.clone());

            Some(CaptionTrack {
                track: TranscriptTrack {
                    language,
                    language_code: code.clone(),
                    is_generated,
                },
                url: format.url.clone(),
            })
        })
        .collect()
}

/// Which track to pick when several are available
#[derive(Debug, Clone)]
pub struct TrackPreference {
    /// Language codes in order of preference
    pub languages: Vec<String>,

    /// Fall back to the first available track if no language matches
    pub allow_fallback: bool,
}

impl Default for TrackPreference {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            allow_fallback: true,
        }
    }
}

impl TrackPreference {
    /// Pick a track: per language, manual before generated.
    pub fn select<'a>(&self, tracks: &'a [CaptionTrack]) -> Option<&'a CaptionTrack> {
        for language in &self.languages {
            let matching = |generated: bool| {
                tracks.iter().find(|t| {
                    t.track.is_generated == generated
                        && matches_language(&t.track.language_code, language)
                })
            };

            if let Some(track) = matching(false).or_else(|| matching(true)) {
                return Some(track);
            }
        }

        if !self.allow_fallback {
            return None;
        }

        tracks
            .iter()
            .find(|t| !t.track.is_generated)
            .or_else(|| tracks.first())
    }
}

/// `en` also matches yt-dlp's `en-orig` key for the original generated track
fn matches_language(code: &str, wanted: &str) -> bool {
    code.eq_ignore_ascii_case(wanted)
        || code
            .strip_suffix("-orig")
            .is_some_and(|base| base.eq_ignore_ascii_case(wanted))
}

/// json3 timedtext document
#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 caption document into fragments.
///
/// Events without text (styling, window setup, line-break appends) are dropped.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptFragment>, serde_json::Error> {
    let document: Json3Document = serde_json::from_str(body)?;

    let fragments = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            if text.trim().is_empty() {
                return None;
            }

            Some(TranscriptFragment {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(fragments)
}
