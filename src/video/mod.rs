use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Opaque YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page for this video
    pub fn watch_url(&self) -> String {
        Url::parse_with_params("https://www.youtube.com/watch", &[("v", self.as_str())])
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("https://www.youtube.com/watch?v={}", self.0))
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video id from a YouTube URL.
///
/// Recognized shapes:
/// - `https://www.youtube.com/watch?v=ID` and `https://youtube.com/watch?v=ID`
/// - `https://youtu.be/ID`
///
/// Anything else (other hosts, unparsable input, missing id) yields `None`.
/// The id itself is not validated.
pub fn parse_video_id(input: &str) -> Option<VideoId> {
    let parsed = Url::parse(input.trim()).ok()?;

    let id = match parsed.host_str()? {
        "www.youtube.com" | "youtube.com" => parsed
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned())?,
        "youtu.be" => parsed.path().trim_start_matches('/').to_string(),
        _ => return None,
    };

    if id.is_empty() {
        tracing::debug!("No video id found in URL: {}", input);
        return None;
    }

    Some(VideoId(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_urls() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some(VideoId::new("dQw4w9WgXcQ"))
        );
        assert_eq!(
            parse_video_id("https://youtube.com/watch?v=dQw4w9WgXcQ"),
            Some(VideoId::new("dQw4w9WgXcQ"))
        );
        // Extra parameters are ignored
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?list=PL123&v=abc123&t=42s"),
            Some(VideoId::new("abc123"))
        );
    }

    #[test]
    fn test_parse_short_urls() {
        assert_eq!(
            parse_video_id("https://youtu.be/ASFPzWtDb-M"),
            Some(VideoId::new("ASFPzWtDb-M"))
        );
        assert_eq!(
            parse_video_id("https://youtu.be/btPdx63uPIM?t=10"),
            Some(VideoId::new("btPdx63uPIM"))
        );
    }

    #[test]
    fn test_id_is_returned_verbatim() {
        // No syntax validation beyond URL parsing
        assert_eq!(
            parse_video_id("https://youtube.com/watch?v=not-a-real-id!"),
            Some(VideoId::new("not-a-real-id!"))
        );
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(parse_video_id("https://vimeo.com/123456"), None);
        assert_eq!(parse_video_id("https://m.youtube.com/watch?v=abc"), None);
        assert_eq!(parse_video_id("https://notyoutube.com/watch?v=abc"), None);
        assert_eq!(parse_video_id("not a url"), None);
        assert_eq!(parse_video_id(""), None);
    }

    #[test]
    fn test_missing_id() {
        assert_eq!(parse_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(parse_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(parse_video_id("https://youtu.be/"), None);
        assert_eq!(parse_video_id("https://youtu.be"), None);
    }

    #[test]
    fn test_blank_v_is_skipped() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=&v=abc"),
            Some(VideoId::new("abc"))
        );
        assert_eq!(parse_video_id("https://www.youtube.com/watch?v=&v="), None);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            VideoId::new("abc123").watch_url(),
            "https://www.youtube.com/watch?v=abc123"
        );
    }
}
