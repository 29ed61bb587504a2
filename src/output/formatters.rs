use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::transcript::{Transcript, TranscriptFragment};
use crate::utils::format_timestamp;

#[derive(Serialize)]
struct TranscriptDocument<'a> {
    video_id: &'a str,
    generated_at: DateTime<Utc>,
    duration: f64,
    fragments: &'a [TranscriptFragment],
    text: &'a str,
}

/// Plain newline-joined transcript text
pub fn format_as_text(transcript: &Transcript) -> String {
    transcript.text().to_string()
}

pub fn format_as_json(transcript: &Transcript, generated_at: DateTime<Utc>) -> Result<String> {
    let document = TranscriptDocument {
        video_id: transcript.video_id.as_str(),
        generated_at,
        duration: transcript.duration(),
        fragments: &transcript.fragments,
        text: transcript.text(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn format_as_srt(transcript: &Transcript) -> String {
    transcript
        .fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_timestamp(fragment.start, ','),
                format_timestamp(fragment.end(), ','),
                fragment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_as_vtt(transcript: &Transcript) -> String {
    let mut out = String::from("WEBVTT\n");

    for fragment in &transcript.fragments {
        out.push('\n');
        out.push_str(&format!(
            "{} --> {}\n{}\n",
            format_timestamp(fragment.start, '.'),
            format_timestamp(fragment.end(), '.'),
            fragment.text
        ));
    }

    out
}

/// Markdown document for a summary
pub fn format_summary(summary: &str, model: &str, video_url: &str) -> String {
    format!(
        "# Summary from Ollama Model: {}\n\nSource: {}\n\n{}\n",
        model,
        video_url,
        summary.trim_end()
    )
}
